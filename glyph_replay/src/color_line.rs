// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving palette references into concrete colors.

use crate::color::{AlphaColor, DynamicColor, Srgb};
use crate::math::FloatExt;
use crate::paint::ColorLine;
use crate::peniko::{self, ColorStops};
use smallvec::SmallVec;

/// Palette index that refers to the foreground (text) color instead of a palette entry.
pub(crate) const FOREGROUND_INDEX: u16 = 0xFFFF;

/// A color line whose stops have been turned into colors.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedColorLine {
    /// Stops covering `[0, 1]`, ordered by offset.
    pub stops: ColorStops,
    /// Extend mode of the gradient.
    pub extend: peniko::Extend,
}

/// Turns palette references into colors.
pub trait ColorResolver {
    /// Resolves a palette entry, multiplied by `alpha`.
    ///
    /// Index `0xFFFF` refers to the foreground color. Implementations decide what an
    /// out-of-range index resolves to.
    fn resolve_palette_color(&self, palette_index: u16, alpha: f32) -> AlphaColor<Srgb>;

    /// Resolves every stop of a color line.
    fn resolve_color_line(&self, color_line: &ColorLine<'_>) -> ResolvedColorLine {
        let stops = color_line.stops.iter().map(|stop| peniko::ColorStop {
            offset: stop.offset,
            color: DynamicColor::from_alpha_color(
                self.resolve_palette_color(stop.palette_index, stop.alpha),
            ),
        });
        ResolvedColorLine {
            stops: normalize_color_stops(stops),
            extend: color_line.extend.into(),
        }
    }
}

/// Sorts gradient stops and makes them cover exactly `[0, 1]`.
///
/// The first and last stops are duplicated at offsets 0 and 1 if necessary. When several
/// stops sit at offset 1, only the last one is kept.
pub fn normalize_color_stops(stops: impl IntoIterator<Item = peniko::ColorStop>) -> ColorStops {
    let mut stops = stops.into_iter().collect::<SmallVec<[peniko::ColorStop; 4]>>();
    // Stable, so stops sharing an offset keep their order.
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    let (Some(&first_stop), Some(&last_stop)) = (stops.first(), stops.last()) else {
        return ColorStops::from(&[][..]);
    };

    if first_stop.offset > 0.0 {
        let mut new_stop = first_stop;
        new_stop.offset = 0.0;
        stops.insert(0, new_stop);
    }

    if last_stop.offset < 1.0 {
        let mut new_stop = last_stop;
        new_stop.offset = 1.0;
        stops.push(new_stop);
    }

    while stops.len() >= 2 && stops[stops.len() - 2].offset.is_nearly_equal(1.0) {
        stops.remove(stops.len() - 2);
    }

    ColorStops::from(stops.as_slice())
}

/// A [`ColorResolver`] over a fixed list of palette colors.
///
/// Out-of-range indices resolve to the foreground color, like the foreground index itself.
#[derive(Clone, Debug)]
pub struct PaletteResolver {
    palette: Vec<AlphaColor<Srgb>>,
    foreground: AlphaColor<Srgb>,
}

impl PaletteResolver {
    /// Creates a resolver for `palette` with the given foreground color.
    pub fn new(palette: Vec<AlphaColor<Srgb>>, foreground: AlphaColor<Srgb>) -> Self {
        Self {
            palette,
            foreground,
        }
    }

    /// The palette colors.
    pub fn palette(&self) -> &[AlphaColor<Srgb>] {
        &self.palette
    }

    /// The foreground color.
    pub fn foreground(&self) -> AlphaColor<Srgb> {
        self.foreground
    }
}

impl ColorResolver for PaletteResolver {
    fn resolve_palette_color(&self, palette_index: u16, alpha: f32) -> AlphaColor<Srgb> {
        let base = if palette_index == FOREGROUND_INDEX {
            self.foreground
        } else if let Some(color) = self.palette.get(usize::from(palette_index)) {
            *color
        } else {
            log::debug!("palette index {palette_index} out of range, using foreground color");
            self.foreground
        };
        base.multiply_alpha(alpha)
    }
}
