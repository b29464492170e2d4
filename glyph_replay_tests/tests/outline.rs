// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for decomposing glyph outlines.

use glyph_replay::kurbo::{BezPath, PathEl, Shape};
use glyph_replay::{decompose_outline, GlyphId, OutlineCommand};

use crate::util::{PenCommand, TestFont};

fn two_boxes() -> TestFont<'static> {
    TestFont::new(1000).outline(
        1,
        &[
            PenCommand::Move(0.0, 0.0),
            PenCommand::Line(100.0, 0.0),
            PenCommand::Line(100.0, 100.0),
            PenCommand::Close,
            PenCommand::Move(200.0, 0.0),
            PenCommand::Quad(250.0, 100.0, 300.0, 0.0),
            PenCommand::Close,
        ],
    )
}

#[test]
fn outline_one_close_per_closed_subpath() {
    let font = two_boxes();
    let mut commands = Vec::new();
    assert!(decompose_outline(&font, GlyphId::new(1), &mut commands));

    let closes = commands
        .iter()
        .filter(|c| matches!(c, OutlineCommand::Close))
        .count();
    let moves = commands
        .iter()
        .filter(|c| matches!(c, OutlineCommand::MoveTo(..)))
        .count();
    assert_eq!(closes, 2, "one close per subpath in {commands:?}");
    assert_eq!(moves, 2, "one move per subpath in {commands:?}");
}

#[test]
fn outline_quadratics_become_cubics() {
    let font = two_boxes();
    let mut commands = Vec::new();
    decompose_outline(&font, GlyphId::new(1), &mut commands);

    assert!(
        commands.contains(&OutlineCommand::CubicTo(
            200.0 + 2.0 / 3.0 * 50.0,
            2.0 / 3.0 * 100.0,
            300.0 - 2.0 / 3.0 * 50.0,
            2.0 / 3.0 * 100.0,
            300.0,
            0.0,
        )),
        "quadratic segment was not elevated: {commands:?}"
    );
}

#[test]
fn outline_decomposition_is_deterministic() {
    let font = two_boxes();
    let mut first = Vec::new();
    let mut second = Vec::new();
    decompose_outline(&font, GlyphId::new(1), &mut first);
    decompose_outline(&font, GlyphId::new(1), &mut second);
    assert_eq!(first, second, "decomposing twice gave different commands");
}

#[test]
fn outline_missing_glyph_leaves_builder_untouched() {
    let font = two_boxes();
    let mut path = BezPath::new();
    path.move_to((1.0, 1.0));
    assert!(!decompose_outline(&font, GlyphId::new(7), &mut path));
    assert_eq!(path.elements(), [PathEl::MoveTo((1.0, 1.0).into())]);
}

#[test]
fn outline_into_bez_path_keeps_area() {
    let font = TestFont::new(1000).rect(3, 0.0, 0.0, 10.0, 20.0);
    let mut path = BezPath::new();
    assert!(decompose_outline(&font, GlyphId::new(3), &mut path));
    assert_eq!(path.area().abs(), 200.0, "unexpected area for {path:?}");
}

#[test]
fn outline_open_subpath_is_not_closed() {
    let font = TestFont::new(1000).outline(
        1,
        &[
            PenCommand::Move(0.0, 0.0),
            PenCommand::Line(100.0, 0.0),
            PenCommand::Line(100.0, 100.0),
        ],
    );
    let mut commands = Vec::new();
    assert!(decompose_outline(&font, GlyphId::new(1), &mut commands));

    assert_eq!(
        commands,
        [
            OutlineCommand::MoveTo(0.0, 0.0),
            OutlineCommand::LineTo(100.0, 0.0),
            OutlineCommand::LineTo(100.0, 100.0),
        ],
        "an open contour must stay open"
    );
}
