// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Replay turns font glyphs into drawing commands for any 2D canvas.
//!
//! There are two halves:
//!
//! - The outline decomposer ([`decompose_outline`]) walks a glyph's vector outline and emits
//!   move/line/cubic/close commands to a [`PathBuilder`].
//! - The paint interpreter ([`PaintInterpreter`], [`replay_color_glyph`]) consumes the
//!   depth-first sequence of [`PaintOp`]s describing a color glyph and drives a [`Canvas`],
//!   mirroring the paint graph's nesting onto the canvas' save/restore and group stacks.
//!
//! Fonts are reached through the [`ColorFont`] and [`ColorResolver`] traits. [`SkrifaFont`]
//! implements both on top of [skrifa], covering COLR paint graphs, PNG bitmap strikes
//! and plain outlines.
//!
//! Two canvases ship with the crate: [`RecordingCanvas`], which logs every call, and
//! [`PixmapCanvas`], which renders into a pixmap with [Vello CPU](vello_cpu).
//!
//! ## Features
//!
//! - `png` (enabled by default): Decode PNG image paints. Without it, every image paint is
//!   treated as an unsupported encoding and skipped.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use peniko::{self, color, kurbo};
pub use skrifa::outline::OutlinePen;
pub use skrifa::GlyphId;

mod canvas;
mod color_line;
mod dispatch;
mod draw;
mod font;
mod image;
mod interpreter;
mod math;
mod outline;
mod paint;

pub use canvas::pixmap::PixmapCanvas;
pub use canvas::recording::{CanvasCommand, RecordingCanvas};
pub use canvas::Canvas;
pub use color_line::{normalize_color_stops, ColorResolver, PaletteResolver, ResolvedColorLine};
pub use dispatch::PaintDispatch;
pub use draw::{Glyph, GlyphRunBuilder};
pub use font::{ColorFont, FontError, PaintError, SkrifaFont};
pub use image::{decode_image, Image, ImageError};
pub use interpreter::{
    replay_color_glyph, replay_color_glyph_with, replay_ops, PaintInterpreter, ReplayStats,
};
pub use outline::{decompose_outline, OutlineCommand, PathBuilder};
pub use paint::{ColorLine, ColorStop, CompositeMode, Extend, ImageFormat, ImagePaint, PaintOp};
