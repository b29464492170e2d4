// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing runs of positioned glyphs.

use crate::canvas::Canvas;
use crate::color_line::{ColorResolver, FOREGROUND_INDEX};
use crate::dispatch::PaintDispatch;
use crate::font::ColorFont;
use crate::interpreter::{replay_color_glyph_with, ReplayStats};
use crate::kurbo::{Affine, BezPath};
use crate::outline::decompose_outline;
use skrifa::GlyphId;

/// Positioned glyph.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Glyph {
    /// The font-specific identifier for this glyph.
    ///
    /// This ID is specific to the font being used and corresponds to the
    /// glyph index within that font. It is *not* a Unicode code point.
    pub id: u32,
    /// X-offset in run, relative to transform.
    pub x: f32,
    /// Y-offset in run, relative to transform.
    pub y: f32,
}

/// A builder for configuring and drawing a run of glyphs onto a [`Canvas`].
#[must_use = "Methods on the builder don't do anything until `draw` is called."]
pub struct GlyphRunBuilder<'a, F: ?Sized, R: ?Sized, C: ?Sized> {
    font: &'a F,
    resolver: &'a R,
    canvas: &'a mut C,
    dispatch: &'a PaintDispatch,
    transform: Affine,
    glyph_transform: Option<Affine>,
    font_size: f32,
}

impl<F: ?Sized, R: ?Sized, C: ?Sized> core::fmt::Debug for GlyphRunBuilder<'_, F, R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphRunBuilder")
            .field("transform", &self.transform)
            .field("glyph_transform", &self.glyph_transform)
            .field("font_size", &self.font_size)
            .finish_non_exhaustive()
    }
}

impl<'a, F, R, C> GlyphRunBuilder<'a, F, R, C>
where
    F: ColorFont + ?Sized,
    R: ColorResolver + ?Sized,
    C: Canvas + ?Sized,
{
    /// Creates a new builder for drawing glyphs.
    ///
    /// `transform` maps run coordinates (y down) to canvas coordinates.
    pub fn new(font: &'a F, resolver: &'a R, transform: Affine, canvas: &'a mut C) -> Self {
        Self {
            font,
            resolver,
            canvas,
            dispatch: PaintDispatch::shared(),
            transform,
            glyph_transform: None,
            font_size: 16.0,
        }
    }

    /// Set the font size in pixels per em.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set the per-glyph transform. Use `Affine::skew` with a horizontal-only skew to simulate
    /// italic text.
    pub fn glyph_transform(mut self, transform: Affine) -> Self {
        self.glyph_transform = Some(transform);
        self
    }

    /// Use `dispatch` instead of the shared dispatch tables.
    pub fn dispatch(mut self, dispatch: &'a PaintDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Consumes the builder and draws the glyphs.
    ///
    /// Glyphs without a color paint sequence are drawn as their outline filled with the
    /// foreground color. Glyphs with neither draw nothing.
    pub fn draw(self, glyphs: impl IntoIterator<Item = Glyph>) -> ReplayStats {
        let Self {
            font,
            resolver,
            canvas,
            dispatch,
            transform,
            glyph_transform,
            font_size,
        } = self;
        let scale = f64::from(font_size) / f64::from(font.units_per_em().max(1));
        // Font units are y up.
        let font_to_em = Affine::scale_non_uniform(scale, -scale);
        let glyph_transform = glyph_transform.unwrap_or(Affine::IDENTITY);
        let has_color = font.has_color_glyphs();
        let mut stats = ReplayStats::default();

        for glyph in glyphs {
            let glyph_id = GlyphId::new(glyph.id);
            let origin = Affine::translate((f64::from(glyph.x), f64::from(glyph.y)));
            canvas.save();
            canvas.transform(transform * origin * glyph_transform * font_to_em);

            let mut painted = false;
            if has_color {
                let glyph_stats =
                    replay_color_glyph_with(glyph_id, font, resolver, canvas, dispatch);
                painted = glyph_stats.ops > 0;
                stats += glyph_stats;
            }
            if !painted {
                let mut path = BezPath::new();
                if decompose_outline(font, glyph_id, &mut path) {
                    let color = resolver.resolve_palette_color(FOREGROUND_INDEX, 1.0);
                    canvas.fill_path(&path, color);
                } else {
                    log::trace!("glyph {} has nothing to draw", glyph.id);
                }
            }

            canvas.restore();
        }
        stats
    }
}
