// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tables shared by every replay.

use std::sync::OnceLock;

use crate::paint::{CompositeMode, ImageFormat};
use crate::peniko::{BlendMode, Compose, Mix};

/// Lookup tables used while interpreting paint operations.
///
/// The tables are immutable once built. [`PaintDispatch::shared`] returns a process-wide
/// instance that is built on first use, so concurrent replays never race on initialization.
#[derive(Clone, Debug)]
pub struct PaintDispatch {
    blend_modes: [BlendMode; CompositeMode::COUNT],
    image_formats: &'static [ImageFormat],
}

static SHARED: OnceLock<PaintDispatch> = OnceLock::new();

impl Default for PaintDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintDispatch {
    /// Builds the tables.
    pub fn new() -> Self {
        Self {
            blend_modes: CompositeMode::ALL.map(map_composite_mode),
            image_formats: if cfg!(feature = "png") {
                &[ImageFormat::Png]
            } else {
                &[]
            },
        }
    }

    /// The process-wide instance, built the first time it's requested.
    pub fn shared() -> &'static Self {
        SHARED.get_or_init(|| {
            log::trace!("building shared paint dispatch tables");
            Self::new()
        })
    }

    /// The blend mode a group with the given composite mode is drawn with.
    pub fn blend_mode(&self, mode: CompositeMode) -> BlendMode {
        self.blend_modes[mode as usize]
    }

    /// Whether images in `format` can be decoded.
    pub fn supports_image(&self, format: ImageFormat) -> bool {
        self.image_formats.contains(&format)
    }
}

fn map_composite_mode(mode: CompositeMode) -> BlendMode {
    match mode {
        CompositeMode::Clear => BlendMode::new(Mix::Normal, Compose::Clear),
        CompositeMode::Src => BlendMode::new(Mix::Normal, Compose::Copy),
        CompositeMode::Dest => BlendMode::new(Mix::Normal, Compose::Dest),
        CompositeMode::SrcOver => BlendMode::new(Mix::Normal, Compose::SrcOver),
        CompositeMode::DestOver => BlendMode::new(Mix::Normal, Compose::DestOver),
        CompositeMode::SrcIn => BlendMode::new(Mix::Normal, Compose::SrcIn),
        CompositeMode::DestIn => BlendMode::new(Mix::Normal, Compose::DestIn),
        CompositeMode::SrcOut => BlendMode::new(Mix::Normal, Compose::SrcOut),
        CompositeMode::DestOut => BlendMode::new(Mix::Normal, Compose::DestOut),
        CompositeMode::SrcAtop => BlendMode::new(Mix::Normal, Compose::SrcAtop),
        CompositeMode::DestAtop => BlendMode::new(Mix::Normal, Compose::DestAtop),
        CompositeMode::Xor => BlendMode::new(Mix::Normal, Compose::Xor),
        CompositeMode::Plus => BlendMode::new(Mix::Normal, Compose::Plus),
        CompositeMode::Screen => BlendMode::new(Mix::Screen, Compose::SrcOver),
        CompositeMode::Overlay => BlendMode::new(Mix::Overlay, Compose::SrcOver),
        CompositeMode::Darken => BlendMode::new(Mix::Darken, Compose::SrcOver),
        CompositeMode::Lighten => BlendMode::new(Mix::Lighten, Compose::SrcOver),
        CompositeMode::ColorDodge => BlendMode::new(Mix::ColorDodge, Compose::SrcOver),
        CompositeMode::ColorBurn => BlendMode::new(Mix::ColorBurn, Compose::SrcOver),
        CompositeMode::HardLight => BlendMode::new(Mix::HardLight, Compose::SrcOver),
        CompositeMode::SoftLight => BlendMode::new(Mix::SoftLight, Compose::SrcOver),
        CompositeMode::Difference => BlendMode::new(Mix::Difference, Compose::SrcOver),
        CompositeMode::Exclusion => BlendMode::new(Mix::Exclusion, Compose::SrcOver),
        CompositeMode::Multiply => BlendMode::new(Mix::Multiply, Compose::SrcOver),
        CompositeMode::HslHue => BlendMode::new(Mix::Hue, Compose::SrcOver),
        CompositeMode::HslSaturation => BlendMode::new(Mix::Saturation, Compose::SrcOver),
        CompositeMode::HslColor => BlendMode::new(Mix::Color, Compose::SrcOver),
        CompositeMode::HslLuminosity => BlendMode::new(Mix::Luminosity, Compose::SrcOver),
        CompositeMode::Unknown => BlendMode::new(Mix::Normal, Compose::SrcOver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_is_built_once() {
        let a = PaintDispatch::shared();
        let b = PaintDispatch::shared();
        assert!(core::ptr::eq(a, b));
    }

    #[test]
    fn shared_from_many_threads() {
        let addrs = std::thread::scope(|s| {
            let handles = (0..8)
                .map(|_| s.spawn(|| core::ptr::from_ref(PaintDispatch::shared()) as usize))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn table_covers_every_mode() {
        let dispatch = PaintDispatch::new();
        for mode in CompositeMode::ALL {
            assert_eq!(dispatch.blend_mode(mode), map_composite_mode(mode));
        }
        assert_eq!(
            dispatch.blend_mode(CompositeMode::Unknown),
            dispatch.blend_mode(CompositeMode::SrcOver)
        );
        assert_eq!(
            dispatch.blend_mode(CompositeMode::Src),
            BlendMode::new(Mix::Normal, Compose::Copy)
        );
    }

    #[test]
    fn image_support() {
        let dispatch = PaintDispatch::shared();
        assert_eq!(dispatch.supports_image(ImageFormat::Png), cfg!(feature = "png"));
        assert!(!dispatch.supports_image(ImageFormat::Svg));
        assert!(!dispatch.supports_image(ImageFormat::Bgra));
    }
}
