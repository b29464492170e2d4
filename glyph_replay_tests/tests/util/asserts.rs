// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers to compare rendered colors.

use glyph_replay::color::{AlphaColor, Srgb};

// Readback goes through premultiplied 8-bit pixels.
const EPSILON: f32 = 0.02;

/// Assert that `actual` matches the straight RGBA `expected` within a small tolerance.
pub(crate) fn assert_color_near(actual: Option<AlphaColor<Srgb>>, expected: [f32; 4], case: &str) {
    let actual = actual.unwrap_or_else(|| panic!("pixel out of bounds with {case}"));
    let [_, _, _, alpha] = expected;
    for (i, (a, e)) in actual.components.iter().zip(expected).enumerate() {
        // Color channels of fully transparent pixels carry no information.
        if alpha == 0.0 && i < 3 {
            continue;
        }
        assert!(
            (a - e).abs() <= EPSILON,
            "channel {i} is {a}, expected {e} with {case} (got {:?})",
            actual.components
        );
    }
}
