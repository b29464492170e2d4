// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replaying paint operations onto a canvas.

use core::ops::AddAssign;

use crate::canvas::Canvas;
use crate::color::Srgb;
use crate::color_line::{ColorResolver, ResolvedColorLine};
use crate::dispatch::PaintDispatch;
use crate::font::ColorFont;
use crate::image::decode_image;
use crate::kurbo::{Affine, BezPath, PathEl, Point};
use crate::outline::decompose_outline;
use crate::paint::{ColorLine, CompositeMode, Extend, ImagePaint, PaintOp};
use crate::peniko::{
    Gradient, LinearGradientPosition, RadialGradientPosition, SweepGradientPosition,
};
use skrifa::GlyphId;
use smallvec::SmallVec;

/// Added to the end angle of a padded sweep gradient whose angles coincide.
const SWEEP_EPSILON: f32 = 1.0e-4;

/// Counters describing what happened during a replay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Operations consumed.
    pub ops: usize,
    /// Pops that didn't match the innermost open scope and were ignored.
    pub unbalanced_pops: usize,
    /// Scopes still open at the end of the sequence, closed by the interpreter.
    pub unclosed_scopes: usize,
    /// Image paints that were skipped.
    pub skipped_images: usize,
    /// Glyphs whose paint traversal reported an error.
    pub paint_errors: usize,
}

impl ReplayStats {
    /// Whether the sequence was well formed and fully drawn.
    pub fn is_clean(&self) -> bool {
        self.unbalanced_pops == 0
            && self.unclosed_scopes == 0
            && self.skipped_images == 0
            && self.paint_errors == 0
    }
}

impl AddAssign for ReplayStats {
    fn add_assign(&mut self, rhs: Self) {
        self.ops += rhs.ops;
        self.unbalanced_pops += rhs.unbalanced_pops;
        self.unclosed_scopes += rhs.unclosed_scopes;
        self.skipped_images += rhs.skipped_images;
        self.paint_errors += rhs.paint_errors;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Scope {
    Transform,
    Clip,
    Group,
}

/// Drives a [`Canvas`] from a sequence of [`PaintOp`]s.
///
/// Every push opens a scope that is mirrored onto the canvas' save stack, and every pop
/// closes it again, so a well-formed sequence leaves the canvas as it found it. Pops that
/// don't match the innermost scope are ignored, and scopes left open are closed by
/// [`PaintInterpreter::finish`] (or when the interpreter is dropped).
pub struct PaintInterpreter<'a, F, R, C>
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    font: &'a F,
    resolver: &'a R,
    canvas: &'a mut C,
    dispatch: &'a PaintDispatch,
    scopes: SmallVec<[Scope; 8]>,
    /// Saves issued to the canvas and not yet restored.
    saves: usize,
    /// Groups issued to the canvas and not yet popped.
    groups: usize,
    stats: ReplayStats,
}

impl<F, R, C> core::fmt::Debug for PaintInterpreter<'_, F, R, C>
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaintInterpreter")
            .field("scopes", &self.scopes)
            .field("saves", &self.saves)
            .field("groups", &self.groups)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'a, F, R, C> PaintInterpreter<'a, F, R, C>
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    /// Creates an interpreter for one glyph.
    ///
    /// `font` provides outlines for glyph clips and `resolver` turns palette indices
    /// into colors.
    pub fn new(
        font: &'a F,
        resolver: &'a R,
        canvas: &'a mut C,
        dispatch: &'a PaintDispatch,
    ) -> Self {
        Self {
            font,
            resolver,
            canvas,
            dispatch,
            scopes: SmallVec::new(),
            saves: 0,
            groups: 0,
            stats: ReplayStats::default(),
        }
    }

    /// The number of scopes currently open.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The counters so far.
    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Applies a single operation.
    pub fn apply(&mut self, op: PaintOp<'_>) {
        self.stats.ops += 1;
        match op {
            PaintOp::PushTransform(transform) => {
                self.save();
                self.canvas.transform(transform);
                self.scopes.push(Scope::Transform);
            }
            PaintOp::PopTransform => {
                if self.pop_scope(Scope::Transform) {
                    self.restore();
                }
            }
            PaintOp::PushClipGlyph(glyph_id) => {
                self.save();
                let path = self.glyph_clip_path(glyph_id);
                self.canvas.clip_path(&path);
                self.scopes.push(Scope::Clip);
            }
            PaintOp::PushClipRect(rect) => {
                self.save();
                self.canvas.clip_rect(rect);
                self.scopes.push(Scope::Clip);
            }
            PaintOp::PopClip => {
                if self.pop_scope(Scope::Clip) {
                    self.restore();
                }
            }
            PaintOp::PushGroup => {
                self.save();
                self.push_group();
                self.scopes.push(Scope::Group);
            }
            PaintOp::PopGroup(mode) => {
                if self.pop_scope(Scope::Group) {
                    self.pop_group(mode);
                    self.restore();
                }
            }
            PaintOp::PaintColor {
                palette_index,
                alpha,
            } => {
                let color = self.resolver.resolve_palette_color(palette_index, alpha);
                self.canvas.fill_solid(color);
            }
            PaintOp::PaintImage(image) => self.paint_image(&image),
            PaintOp::LinearGradient {
                color_line,
                p0,
                p1,
                p2,
            } => {
                let p1 = reduce_anchors(p0, p1, p2);
                self.fill_gradient(&color_line, |resolved| Gradient {
                    kind: LinearGradientPosition { start: p0, end: p1 }.into(),
                    extend: resolved.extend,
                    stops: resolved.stops,
                    ..Gradient::default()
                });
            }
            PaintOp::RadialGradient {
                color_line,
                c0,
                r0,
                c1,
                r1,
            } => {
                let (r0, r1) = (r0.max(0.0), r1.max(0.0));
                if r0 == 0.0 && r1 == 0.0 && c0 == c1 {
                    self.fill_first_stop(&color_line);
                    return;
                }
                self.fill_gradient(&color_line, |resolved| Gradient {
                    kind: RadialGradientPosition {
                        start_center: c0,
                        start_radius: r0,
                        end_center: c1,
                        end_radius: r1,
                    }
                    .into(),
                    extend: resolved.extend,
                    stops: resolved.stops,
                    ..Gradient::default()
                });
            }
            PaintOp::SweepGradient {
                color_line,
                center,
                start_angle,
                mut end_angle,
            } => {
                if start_angle == end_angle && color_line.extend == Extend::Pad {
                    end_angle += SWEEP_EPSILON;
                }
                self.fill_gradient(&color_line, |resolved| Gradient {
                    kind: SweepGradientPosition {
                        center,
                        start_angle,
                        end_angle,
                    }
                    .into(),
                    extend: resolved.extend,
                    stops: resolved.stops,
                    ..Gradient::default()
                });
            }
        }
    }

    /// Closes every scope that is still open and returns the counters.
    pub fn finish(mut self) -> ReplayStats {
        self.close_all();
        self.stats
    }

    fn close_all(&mut self) {
        while let Some(scope) = self.scopes.pop() {
            self.stats.unclosed_scopes += 1;
            if scope == Scope::Group {
                self.pop_group(CompositeMode::SrcOver);
            }
            self.restore();
        }
        debug_assert_eq!(self.saves, 0, "every canvas save must be restored");
        debug_assert_eq!(self.groups, 0, "every canvas group must be popped");
    }

    fn save(&mut self) {
        self.canvas.save();
        self.saves += 1;
    }

    fn restore(&mut self) {
        self.canvas.restore();
        self.saves -= 1;
    }

    fn push_group(&mut self) {
        self.canvas.push_group();
        self.groups += 1;
    }

    fn pop_group(&mut self, mode: CompositeMode) {
        self.canvas.pop_group(self.dispatch.blend_mode(mode));
        self.groups -= 1;
    }

    /// Pops the innermost scope if it has the expected kind.
    fn pop_scope(&mut self, expected: Scope) -> bool {
        match self.scopes.last() {
            Some(&scope) if scope == expected => {
                self.scopes.pop();
                true
            }
            innermost => {
                log::warn!("ignoring pop of {expected:?} scope, innermost open scope is {innermost:?}");
                self.stats.unbalanced_pops += 1;
                false
            }
        }
    }

    fn glyph_clip_path(&self, glyph_id: GlyphId) -> BezPath {
        let mut path = BezPath::new();
        if !decompose_outline(self.font, glyph_id, &mut path) {
            log::debug!("clip glyph {} has no outline", glyph_id.to_u32());
        }
        if !matches!(path.elements().last(), None | Some(PathEl::ClosePath)) {
            path.close_path();
        }
        path
    }

    fn paint_image(&mut self, image: &ImagePaint<'_>) {
        if !self.dispatch.supports_image(image.format) {
            log::debug!("skipping image paint with unsupported format {:?}", image.format);
            self.stats.skipped_images += 1;
            return;
        }
        let Some(extents) = image.extents.filter(|e| e.width() > 0.0 && e.height() > 0.0) else {
            log::debug!("skipping image paint without extents");
            self.stats.skipped_images += 1;
            return;
        };
        let decoded = match decode_image(image) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::debug!("skipping image paint: {err}");
                self.stats.skipped_images += 1;
                return;
            }
        };
        // Image rows run downwards while font units point up.
        let transform = Affine::translate((extents.x0, extents.y1))
            * Affine::scale_non_uniform(
                extents.width() / f64::from(decoded.width()),
                -extents.height() / f64::from(decoded.height()),
            );
        self.save();
        self.canvas.transform(transform);
        self.canvas.draw_image(&decoded);
        self.restore();
    }

    fn fill_gradient(
        &mut self,
        color_line: &ColorLine<'_>,
        build: impl FnOnce(ResolvedColorLine) -> Gradient,
    ) {
        match color_line.stops.len() {
            0 => {}
            1 => self.fill_first_stop(color_line),
            _ => {
                let resolved = self.resolver.resolve_color_line(color_line);
                self.canvas.fill_gradient(&build(resolved));
            }
        }
    }

    fn fill_first_stop(&mut self, color_line: &ColorLine<'_>) {
        let resolved = self.resolver.resolve_color_line(color_line);
        if let Some(stop) = resolved.stops.first() {
            self.canvas.fill_solid(stop.color.to_alpha_color::<Srgb>());
        }
    }
}

impl<F, R, C> Drop for PaintInterpreter<'_, F, R, C>
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Reduces the three-point linear gradient form to two points.
///
/// The returned end point is `p1` projected onto the line through `p0` that is
/// perpendicular to `p0 -> p2`.
fn reduce_anchors(p0: Point, p1: Point, p2: Point) -> Point {
    let q1 = p1 - p0;
    let q2 = p2 - p0;
    let len2 = q2.hypot2();
    if len2 == 0.0 {
        return p1;
    }
    p1 - q2 * (q1.dot(q2) / len2)
}

/// Replays a materialized sequence of operations.
pub fn replay_ops<'o, F, R, C>(
    ops: impl IntoIterator<Item = PaintOp<'o>>,
    font: &F,
    resolver: &R,
    canvas: &mut C,
    dispatch: &PaintDispatch,
) -> ReplayStats
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    let mut interpreter = PaintInterpreter::new(font, resolver, canvas, dispatch);
    for op in ops {
        interpreter.apply(op);
    }
    interpreter.finish()
}

/// Replays the color paint sequence of a glyph, using the shared dispatch tables.
pub fn replay_color_glyph<F, R, C>(
    glyph_id: GlyphId,
    font: &F,
    resolver: &R,
    canvas: &mut C,
) -> ReplayStats
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    replay_color_glyph_with(glyph_id, font, resolver, canvas, PaintDispatch::shared())
}

/// Replays the color paint sequence of a glyph.
///
/// Errors reported by the font while traversing the paint graph are logged and counted in
/// [`ReplayStats::paint_errors`]; whatever was painted before the error is kept.
pub fn replay_color_glyph_with<F, R, C>(
    glyph_id: GlyphId,
    font: &F,
    resolver: &R,
    canvas: &mut C,
    dispatch: &PaintDispatch,
) -> ReplayStats
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    let mut interpreter = PaintInterpreter::new(font, resolver, canvas, dispatch);
    let result = font.paint_glyph(glyph_id, &mut |op: PaintOp<'_>| interpreter.apply(op));
    let mut stats = interpreter.finish();
    match result {
        Ok(true) => {}
        Ok(false) => log::debug!("glyph {} has no paint", glyph_id.to_u32()),
        Err(err) => {
            log::debug!("failed to paint glyph {}: {err}", glyph_id.to_u32());
            stats.paint_errors += 1;
        }
    }
    stats
}
