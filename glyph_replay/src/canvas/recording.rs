// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A canvas that records the calls it receives.

use crate::canvas::Canvas;
use crate::color::{AlphaColor, Srgb};
use crate::image::Image;
use crate::kurbo::{Affine, BezPath, Rect};
use crate::peniko::{BlendMode, Gradient};

/// A single canvas call recorded by [`RecordingCanvas`].
///
/// The variants correspond 1:1 to the methods on [`Canvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::transform`].
    Transform(Affine),
    /// [`Canvas::clip_path`].
    ClipPath(BezPath),
    /// [`Canvas::clip_rect`].
    ClipRect(Rect),
    /// [`Canvas::push_group`].
    PushGroup,
    /// [`Canvas::pop_group`].
    PopGroup(BlendMode),
    /// [`Canvas::fill_solid`].
    FillSolid(AlphaColor<Srgb>),
    /// [`Canvas::fill_gradient`].
    FillGradient(Gradient),
    /// [`Canvas::draw_image`], with the image's dimensions.
    DrawImage {
        /// Width of the image in pixels.
        width: u32,
        /// Height of the image in pixels.
        height: u32,
    },
    /// [`Canvas::fill_path`].
    FillPath(BezPath, AlphaColor<Srgb>),
}

/// Records canvas calls and tracks the state stacks they imply.
///
/// Useful for inspecting what a replay did without rasterizing anything. Unbalanced
/// restores and group pops are counted rather than panicking.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    /// The recorded commands.
    pub commands: Vec<CanvasCommand>,
    transforms: Vec<Affine>,
    groups: usize,
    max_depth: usize,
    unbalanced: usize,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    /// Creates an empty recording at identity transform.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            transforms: vec![Affine::IDENTITY],
            groups: 0,
            max_depth: 0,
            unbalanced: 0,
        }
    }

    /// The number of saves not yet restored.
    pub fn save_depth(&self) -> usize {
        self.transforms.len() - 1
    }

    /// The deepest save nesting seen so far.
    pub fn max_save_depth(&self) -> usize {
        self.max_depth
    }

    /// The number of groups not yet popped.
    pub fn group_depth(&self) -> usize {
        self.groups
    }

    /// The number of restores and group pops that had nothing to close.
    pub fn unbalanced_calls(&self) -> usize {
        self.unbalanced
    }

    /// The transform that is currently in effect.
    pub fn current_transform(&self) -> Affine {
        self.transforms.last().copied().unwrap_or_default()
    }

    /// Iterates over the recorded fills, skipping state changes.
    pub fn fills(&self) -> impl Iterator<Item = &CanvasCommand> + '_ {
        self.commands.iter().filter(|command| {
            matches!(
                command,
                CanvasCommand::FillSolid(_)
                    | CanvasCommand::FillGradient(_)
                    | CanvasCommand::DrawImage { .. }
                    | CanvasCommand::FillPath(..)
            )
        })
    }

    /// Clears the recording and resets the state stacks.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.commands.push(CanvasCommand::Save);
        self.transforms.push(self.current_transform());
        self.max_depth = self.max_depth.max(self.save_depth());
    }

    fn restore(&mut self) {
        self.commands.push(CanvasCommand::Restore);
        if self.transforms.len() > 1 {
            self.transforms.pop();
        } else {
            self.unbalanced += 1;
        }
    }

    fn transform(&mut self, transform: Affine) {
        self.commands.push(CanvasCommand::Transform(transform));
        if let Some(current) = self.transforms.last_mut() {
            *current *= transform;
        }
    }

    fn clip_path(&mut self, path: &BezPath) {
        self.commands.push(CanvasCommand::ClipPath(path.clone()));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(CanvasCommand::ClipRect(rect));
    }

    fn push_group(&mut self) {
        self.commands.push(CanvasCommand::PushGroup);
        self.groups += 1;
    }

    fn pop_group(&mut self, blend_mode: BlendMode) {
        self.commands.push(CanvasCommand::PopGroup(blend_mode));
        if self.groups > 0 {
            self.groups -= 1;
        } else {
            self.unbalanced += 1;
        }
    }

    fn fill_solid(&mut self, color: AlphaColor<Srgb>) {
        self.commands.push(CanvasCommand::FillSolid(color));
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        self.commands.push(CanvasCommand::FillGradient(gradient.clone()));
    }

    fn draw_image(&mut self, image: &Image) {
        self.commands.push(CanvasCommand::DrawImage {
            width: image.width(),
            height: image.height(),
        });
    }

    fn fill_path(&mut self, path: &BezPath, color: AlphaColor<Srgb>) {
        self.commands.push(CanvasCommand::FillPath(path.clone(), color));
    }
}
