// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`Canvas`] rendered with Vello CPU.

use core::fmt;
use std::sync::Arc;

use vello_cpu::color::PremulRgba8;
use vello_cpu::{Image as CpuImage, ImageSource, Pixmap, RenderContext};

use crate::canvas::Canvas;
use crate::color::{AlphaColor, Srgb};
use crate::image::Image;
use crate::kurbo::{Affine, BezPath, Rect};
use crate::peniko::{BlendMode, Extend, Gradient, ImageQuality, ImageSampler};

/// A [`Canvas`] that renders into an in-memory pixmap through [`vello_cpu`].
///
/// Clips become clip layers of the surface they are pushed on. Each group renders into an
/// offscreen context of its own, which is drawn into the enclosing surface inside a blend
/// layer when the group is popped.
pub struct PixmapCanvas {
    width: u16,
    height: u16,
    base: RenderContext,
    groups: Vec<Group>,
    /// The base state followed by one state per save and per open group.
    states: Vec<State>,
    /// The base surface as of the last read, if nothing was drawn since.
    snapshot: Option<Pixmap>,
}

struct Group {
    ctx: RenderContext,
    /// Length of the state stack once the group was pushed.
    states: usize,
}

#[derive(Copy, Clone)]
struct State {
    transform: Affine,
    /// Clip layers pushed since this state was entered.
    clips: usize,
}

impl fmt::Debug for PixmapCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixmapCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("save_depth", &self.save_depth())
            .field("group_depth", &self.group_depth())
            .finish_non_exhaustive()
    }
}

impl PixmapCanvas {
    /// Creates a fully transparent canvas.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            base: RenderContext::new(width, height),
            groups: Vec::new(),
            states: vec![State {
                transform: Affine::IDENTITY,
                clips: 0,
            }],
            snapshot: None,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The number of saves not yet restored.
    pub fn save_depth(&self) -> usize {
        self.states.len() - 1 - self.groups.len()
    }

    /// The number of groups not yet popped.
    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    /// Paints `color` over the whole base surface, ignoring the transform and any open group.
    pub fn clear(&mut self, color: AlphaColor<Srgb>) {
        self.snapshot = None;
        let bounds = self.bounds();
        self.base.set_transform(Affine::IDENTITY);
        self.base.set_paint(color);
        self.base.fill_rect(&bounds);
    }

    /// The color of a pixel on the base surface.
    ///
    /// Content of groups that are still open is not included.
    pub fn pixel(&mut self, x: u16, y: u16) -> Option<AlphaColor<Srgb>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ix = (usize::from(y) * usize::from(self.width) + usize::from(x)) * 4;
        let data = self.rendered().data_as_u8_slice();
        let [r, g, b, a] = [data[ix], data[ix + 1], data[ix + 2], data[ix + 3]];
        if a == 0 {
            return Some(AlphaColor::TRANSPARENT);
        }
        let alpha = f32::from(a);
        Some(AlphaColor::new([
            f32::from(r) / alpha,
            f32::from(g) / alpha,
            f32::from(b) / alpha,
            alpha / 255.0,
        ]))
    }

    /// The base surface as straight (not premultiplied) RGBA8, row by row from the top.
    pub fn to_rgba8(&mut self) -> Vec<u8> {
        self.rendered();
        let pixmap = self
            .snapshot
            .take()
            .unwrap_or_else(|| Pixmap::new(self.width, self.height));
        pixmap
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }

    fn rendered(&mut self) -> &Pixmap {
        if self.save_depth() > 0 || self.group_depth() > 0 {
            log::warn!("reading a canvas with saves or groups still open");
        }
        let Self {
            width,
            height,
            base,
            snapshot,
            ..
        } = self;
        snapshot.get_or_insert_with(|| {
            let mut pixmap = Pixmap::new(*width, *height);
            base.flush();
            base.render_to_pixmap(&mut pixmap);
            pixmap
        })
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn state(&self) -> State {
        // The base state is never popped.
        self.states[self.states.len() - 1]
    }

    /// The innermost surface, invalidating the last read.
    fn surface(&mut self) -> &mut RenderContext {
        self.snapshot = None;
        match self.groups.last_mut() {
            Some(group) => &mut group.ctx,
            None => &mut self.base,
        }
    }

    /// The surface to paint on with `transform`, or `None` if it collapses space.
    fn surface_with(&mut self, transform: Affine) -> Option<&mut RenderContext> {
        if transform.determinant().abs() < 1e-12 {
            return None;
        }
        let ctx = self.surface();
        ctx.set_transform(transform);
        Some(ctx)
    }
}

impl Canvas for PixmapCanvas {
    fn save(&mut self) {
        let State { transform, .. } = self.state();
        self.states.push(State {
            transform,
            clips: 0,
        });
    }

    fn restore(&mut self) {
        let floor = self.groups.last().map_or(1, |group| group.states);
        if self.states.len() <= floor {
            log::warn!("restore without a matching save");
            return;
        }
        let Some(State { clips, .. }) = self.states.pop() else {
            return;
        };
        let ctx = self.surface();
        for _ in 0..clips {
            ctx.pop_layer();
        }
    }

    fn transform(&mut self, transform: Affine) {
        let last = self.states.len() - 1;
        self.states[last].transform *= transform;
    }

    fn clip_path(&mut self, path: &BezPath) {
        let transform = self.state().transform;
        let ctx = self.surface();
        ctx.set_transform(transform);
        ctx.push_clip_layer(path);
        let last = self.states.len() - 1;
        self.states[last].clips += 1;
    }

    fn push_group(&mut self) {
        let State { transform, .. } = self.state();
        self.states.push(State {
            transform,
            clips: 0,
        });
        self.groups.push(Group {
            ctx: RenderContext::new(self.width, self.height),
            states: self.states.len(),
        });
    }

    fn pop_group(&mut self, blend_mode: BlendMode) {
        match self.groups.last() {
            None => {
                log::warn!("group pop without a matching push");
                return;
            }
            Some(group) if group.states != self.states.len() => {
                log::warn!("group pop with saves still open inside the group");
                return;
            }
            Some(_) => {}
        }
        let (Some(mut group), Some(_)) = (self.groups.pop(), self.states.pop()) else {
            return;
        };
        let mut pixmap = Pixmap::new(self.width, self.height);
        group.ctx.flush();
        group.ctx.render_to_pixmap(&mut pixmap);

        let bounds = self.bounds();
        let ctx = self.surface();
        ctx.push_blend_layer(blend_mode);
        ctx.set_transform(Affine::IDENTITY);
        ctx.set_paint_transform(Affine::IDENTITY);
        ctx.set_paint(CpuImage {
            image: ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: ImageSampler {
                x_extend: Extend::Pad,
                y_extend: Extend::Pad,
                // The group is pixel aligned with its parent.
                quality: ImageQuality::Low,
                alpha: 1.0,
            },
        });
        ctx.fill_rect(&bounds);
        ctx.pop_layer();
    }

    fn fill_solid(&mut self, color: AlphaColor<Srgb>) {
        let bounds = self.bounds();
        let ctx = self.surface();
        ctx.set_transform(Affine::IDENTITY);
        ctx.set_paint(color);
        ctx.fill_rect(&bounds);
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        let transform = self.state().transform;
        if transform.determinant().abs() < 1e-12 {
            return;
        }
        let bounds = self.bounds();
        let Some(ctx) = self.surface_with(Affine::IDENTITY) else {
            return;
        };
        // Gradients live in user space but cover the whole clip.
        ctx.set_paint_transform(transform);
        ctx.set_paint(gradient.clone());
        ctx.fill_rect(&bounds);
        ctx.set_paint_transform(Affine::IDENTITY);
    }

    fn draw_image(&mut self, image: &Image) {
        let (Ok(width), Ok(height)) = (u16::try_from(image.width()), u16::try_from(image.height()))
        else {
            log::warn!(
                "image of {}x{} pixels is too large to draw",
                image.width(),
                image.height()
            );
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        let pixels = image
            .data()
            .chunks_exact(4)
            .map(|p| PremulRgba8 {
                r: p[0],
                g: p[1],
                b: p[2],
                a: p[3],
            })
            .collect();
        let pixmap = Pixmap::from_parts(pixels, width, height);

        let transform = self.state().transform;
        let Some(ctx) = self.surface_with(transform) else {
            return;
        };
        ctx.set_paint_transform(Affine::IDENTITY);
        ctx.set_paint(CpuImage {
            image: ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: ImageSampler {
                x_extend: Extend::Pad,
                y_extend: Extend::Pad,
                quality: ImageQuality::Low,
                alpha: 1.0,
            },
        });
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(width), f64::from(height)));
    }

    fn fill_path(&mut self, path: &BezPath, color: AlphaColor<Srgb>) {
        let transform = self.state().transform;
        let Some(ctx) = self.surface_with(transform) else {
            return;
        };
        ctx.set_paint(color);
        ctx.fill_path(path);
    }
}
