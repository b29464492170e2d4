// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface glyphs are replayed onto.

pub(crate) mod pixmap;
pub(crate) mod recording;

use crate::color::{AlphaColor, Srgb};
use crate::image::Image;
use crate::kurbo::{Affine, BezPath, Rect, Shape};
use crate::peniko::{BlendMode, Gradient};

/// A 2D drawing surface with a save/restore state stack.
///
/// The state consists of the current transform and the current clip. Fills always cover the
/// whole current clip, the way `COLR` paints do; painting an unclipped canvas fills all of it.
pub trait Canvas {
    /// Push a copy of the current state.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`Canvas::save`].
    fn restore(&mut self);

    /// Post-multiply the current transform by `transform`.
    fn transform(&mut self, transform: Affine);

    /// Intersect the clip with `path`, interpreted in the current coordinate space.
    fn clip_path(&mut self, path: &BezPath);

    /// Intersect the clip with `rect`, interpreted in the current coordinate space.
    fn clip_rect(&mut self, rect: Rect) {
        self.clip_path(&rect.to_path(0.1));
    }

    /// Start rendering into a transparent offscreen group.
    fn push_group(&mut self);

    /// Finish the innermost group and composite it onto the enclosing surface with
    /// `blend_mode`, limited by the clip that is current at this point.
    fn pop_group(&mut self, blend_mode: BlendMode);

    /// Fill the current clip with a solid color.
    fn fill_solid(&mut self, color: AlphaColor<Srgb>);

    /// Fill the current clip with a gradient defined in the current coordinate space.
    fn fill_gradient(&mut self, gradient: &Gradient);

    /// Draw `image` into the rectangle `(0, 0, width, height)` of the current coordinate space.
    fn draw_image(&mut self, image: &Image);

    /// Fill `path` with a solid color, using the non-zero fill rule.
    fn fill_path(&mut self, path: &BezPath, color: AlphaColor<Srgb>);
}
