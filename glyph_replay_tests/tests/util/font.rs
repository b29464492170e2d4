// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font built in memory, glyph by glyph.

use glyph_replay::{ColorFont, GlyphId, OutlinePen, PaintError, PaintOp};

/// A pen call making up a test outline.
#[derive(Copy, Clone, Debug)]
pub(crate) enum PenCommand {
    Move(f32, f32),
    Line(f32, f32),
    Quad(f32, f32, f32, f32),
    Close,
}

/// A font whose outlines and paint sequences are given directly.
///
/// The font reports color glyph data as soon as one paint sequence is added.
#[derive(Debug, Default)]
pub(crate) struct TestFont<'a> {
    units_per_em: u16,
    outlines: Vec<(u32, Vec<PenCommand>)>,
    paints: Vec<(u32, Vec<PaintOp<'a>>)>,
}

impl<'a> TestFont<'a> {
    pub(crate) fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            ..Self::default()
        }
    }

    pub(crate) fn outline(mut self, glyph_id: u32, commands: &[PenCommand]) -> Self {
        self.outlines.push((glyph_id, commands.to_vec()));
        self
    }

    /// Adds a closed axis-aligned rectangle outline, wound counter-clockwise in y-up space.
    pub(crate) fn rect(self, glyph_id: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.outline(
            glyph_id,
            &[
                PenCommand::Move(x0, y0),
                PenCommand::Line(x1, y0),
                PenCommand::Line(x1, y1),
                PenCommand::Line(x0, y1),
                PenCommand::Close,
            ],
        )
    }

    pub(crate) fn paint(mut self, glyph_id: u32, ops: &[PaintOp<'a>]) -> Self {
        self.paints.push((glyph_id, ops.to_vec()));
        self
    }
}

impl ColorFont for TestFont<'_> {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn draw_outline(&self, glyph_id: GlyphId, pen: &mut dyn OutlinePen) -> bool {
        let Some((_, commands)) = self
            .outlines
            .iter()
            .find(|(id, _)| *id == glyph_id.to_u32())
        else {
            return false;
        };
        for command in commands {
            match *command {
                PenCommand::Move(x, y) => pen.move_to(x, y),
                PenCommand::Line(x, y) => pen.line_to(x, y),
                PenCommand::Quad(cx, cy, x, y) => pen.quad_to(cx, cy, x, y),
                PenCommand::Close => pen.close(),
            }
        }
        true
    }

    fn paint_glyph(
        &self,
        glyph_id: GlyphId,
        sink: &mut dyn FnMut(PaintOp<'_>),
    ) -> Result<bool, PaintError> {
        let Some((_, ops)) = self.paints.iter().find(|(id, _)| *id == glyph_id.to_u32()) else {
            return Ok(false);
        };
        for op in ops {
            sink(*op);
        }
        Ok(true)
    }

    fn has_color_glyphs(&self) -> bool {
        !self.paints.is_empty()
    }
}
