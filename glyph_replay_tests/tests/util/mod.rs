// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions and types shared across tests.

mod asserts;
mod font;

pub(crate) use asserts::assert_color_near;
pub(crate) use font::{PenCommand, TestFont};

use glyph_replay::color::{AlphaColor, Srgb};
use glyph_replay::PaletteResolver;

/// Opaque red at palette index 0, half transparent blue at 1, opaque black at 2.
pub(crate) fn test_palette() -> PaletteResolver {
    PaletteResolver::new(
        vec![
            AlphaColor::new([1.0, 0.0, 0.0, 1.0]),
            AlphaColor::new([0.0, 0.0, 1.0, 0.5]),
            AlphaColor::BLACK,
        ],
        AlphaColor::new([0.0, 0.5, 0.0, 1.0]),
    )
}

/// The foreground color of [`test_palette`].
pub(crate) const FOREGROUND: AlphaColor<Srgb> = AlphaColor::new([0.0, 0.5, 0.0, 1.0]);

/// Encodes straight RGBA8 pixels as a PNG file.
pub(crate) fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut encoder = png::Encoder::new(&mut data, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(rgba).unwrap();
    writer.finish().unwrap();
    data
}
