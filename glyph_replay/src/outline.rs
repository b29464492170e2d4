// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decomposing glyph outlines into path commands.

use crate::font::ColorFont;
use crate::kurbo::BezPath;
use skrifa::outline::OutlinePen;
use skrifa::GlyphId;

/// A single path construction command, in font units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OutlineCommand {
    /// Begin a new subpath at the given point.
    MoveTo(f32, f32),
    /// Straight line to the given point.
    LineTo(f32, f32),
    /// Cubic Bézier curve with two control points and an end point.
    CubicTo(f32, f32, f32, f32, f32, f32),
    /// Close the current subpath.
    Close,
}

impl OutlineCommand {
    /// Replays a sequence of commands into a path builder.
    pub fn replay(commands: &[Self], builder: &mut (impl PathBuilder + ?Sized)) {
        for command in commands {
            match *command {
                Self::MoveTo(x, y) => builder.move_to(x, y),
                Self::LineTo(x, y) => builder.line_to(x, y),
                Self::CubicTo(cx0, cy0, cx1, cy1, x, y) => {
                    builder.cubic_to(cx0, cy0, cx1, cy1, x, y);
                }
                Self::Close => builder.close_path(),
            }
        }
    }
}

/// A receiver of path construction commands.
///
/// Only cubic curves are emitted; quadratic segments coming from the font are
/// degree-elevated before they reach the builder.
pub trait PathBuilder {
    /// Begin a new subpath at `(x, y)`.
    fn move_to(&mut self, x: f32, y: f32);
    /// Add a line to `(x, y)`.
    fn line_to(&mut self, x: f32, y: f32);
    /// Add a cubic curve ending at `(x, y)`.
    fn cubic_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32);
    /// Close the current subpath.
    fn close_path(&mut self);
}

impl PathBuilder for BezPath {
    #[inline]
    fn move_to(&mut self, x: f32, y: f32) {
        Self::move_to(self, (x, y));
    }

    #[inline]
    fn line_to(&mut self, x: f32, y: f32) {
        Self::line_to(self, (x, y));
    }

    #[inline]
    fn cubic_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.curve_to((cx0, cy0), (cx1, cy1), (x, y));
    }

    #[inline]
    fn close_path(&mut self) {
        Self::close_path(self);
    }
}

impl PathBuilder for Vec<OutlineCommand> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(OutlineCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(OutlineCommand::LineTo(x, y));
    }

    fn cubic_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.push(OutlineCommand::CubicTo(cx0, cy0, cx1, cy1, x, y));
    }

    fn close_path(&mut self) {
        self.push(OutlineCommand::Close);
    }
}

/// Decomposes the outline of `glyph_id` into `builder`, in font units.
///
/// Returns `false` and leaves `builder` untouched if the glyph has no outline, the
/// outline is empty, or it could not be loaded.
pub fn decompose_outline<F, B>(font: &F, glyph_id: GlyphId, builder: &mut B) -> bool
where
    F: ColorFont + ?Sized,
    B: PathBuilder + ?Sized,
{
    // Collect first so that a failure halfway through the outline never leaves a partial
    // path behind.
    let mut commands = Vec::new();
    let mut pen = CubicPen::new(&mut commands);
    if !font.draw_outline(glyph_id, &mut pen) || commands.is_empty() {
        return false;
    }
    OutlineCommand::replay(&commands, builder);
    true
}

/// Adapts a [`PathBuilder`] to skrifa's [`OutlinePen`], elevating quadratic curves.
pub(crate) struct CubicPen<'a, B: PathBuilder + ?Sized> {
    builder: &'a mut B,
    start: (f32, f32),
    current: (f32, f32),
}

impl<'a, B: PathBuilder + ?Sized> CubicPen<'a, B> {
    pub(crate) fn new(builder: &'a mut B) -> Self {
        Self {
            builder,
            start: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }
}

impl<B: PathBuilder + ?Sized> OutlinePen for CubicPen<'_, B> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
        self.start = (x, y);
        self.current = (x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
        self.current = (x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (x0, y0) = self.current;
        const TWO_THIRDS: f32 = 2.0 / 3.0;
        self.builder.cubic_to(
            x0 + TWO_THIRDS * (cx0 - x0),
            y0 + TWO_THIRDS * (cy0 - y0),
            x + TWO_THIRDS * (cx0 - x),
            y + TWO_THIRDS * (cy0 - y),
            x,
            y,
        );
        self.current = (x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.builder.cubic_to(cx0, cy0, cx1, cy1, x, y);
        self.current = (x, y);
    }

    fn close(&mut self) {
        self.builder.close_path();
        self.current = self.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kurbo::PathEl;

    #[test]
    fn quads_are_elevated_to_cubics() {
        let mut commands = Vec::new();
        let mut pen = CubicPen::new(&mut commands);
        pen.move_to(0.0, 0.0);
        pen.quad_to(3.0, 3.0, 6.0, 0.0);
        pen.close();

        assert_eq!(
            commands,
            [
                OutlineCommand::MoveTo(0.0, 0.0),
                OutlineCommand::CubicTo(2.0, 2.0, 4.0, 2.0, 6.0, 0.0),
                OutlineCommand::Close,
            ]
        );
    }

    #[test]
    fn close_resets_current_point_to_subpath_start() {
        let mut commands = Vec::new();
        let mut pen = CubicPen::new(&mut commands);
        pen.move_to(0.0, 0.0);
        pen.line_to(9.0, 0.0);
        pen.close();
        // A quad without a preceding move starts from the previous subpath's start.
        pen.quad_to(0.0, 3.0, 0.0, 6.0);

        assert_eq!(
            commands[3],
            OutlineCommand::CubicTo(0.0, 2.0, 0.0, 4.0, 0.0, 6.0)
        );
    }

    #[test]
    fn replay_into_bez_path() {
        let commands = [
            OutlineCommand::MoveTo(1.0, 2.0),
            OutlineCommand::LineTo(3.0, 4.0),
            OutlineCommand::CubicTo(5.0, 6.0, 7.0, 8.0, 9.0, 10.0),
            OutlineCommand::Close,
        ];
        let mut path = BezPath::new();
        OutlineCommand::replay(&commands, &mut path);

        let elements = path.elements();
        assert_eq!(elements.len(), 4);
        assert!(matches!(elements[0], PathEl::MoveTo(p) if p.x == 1.0 && p.y == 2.0));
        assert!(matches!(elements[2], PathEl::CurveTo(_, _, p) if p.x == 9.0));
        assert_eq!(elements[3], PathEl::ClosePath);
    }
}
