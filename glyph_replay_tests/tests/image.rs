// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for image paints.

use glyph_replay::kurbo::{Affine, Rect};
use glyph_replay::{
    decode_image, replay_ops, Canvas, CanvasCommand, ImageFormat, ImagePaint, PaintDispatch,
    PaintOp, PixmapCanvas, RecordingCanvas,
};

use crate::util::{assert_color_near, encode_png, test_palette, TestFont};

/// A 2x2 image: red over blue, straight alpha.
fn red_over_blue() -> Vec<u8> {
    encode_png(
        2,
        2,
        &[
            255, 0, 0, 255, 255, 0, 0, 255, //
            0, 0, 255, 255, 0, 0, 255, 255,
        ],
    )
}

fn record(image: ImagePaint<'_>) -> (RecordingCanvas, glyph_replay::ReplayStats) {
    let mut canvas = RecordingCanvas::new();
    let stats = replay_ops(
        [PaintOp::PaintImage(image)],
        &TestFont::new(1000),
        &test_palette(),
        &mut canvas,
        PaintDispatch::shared(),
    );
    (canvas, stats)
}

#[test]
fn image_unsupported_format_is_a_no_op() {
    for format in [ImageFormat::Bgra, ImageFormat::Svg, ImageFormat::Other(*b"jpg ")] {
        let (canvas, stats) = record(ImagePaint {
            data: b"<svg/>",
            format,
            extents: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
        });
        assert!(
            canvas.commands.is_empty(),
            "{format:?} reached the canvas: {:?}",
            canvas.commands
        );
        assert_eq!(stats.skipped_images, 1, "{format:?} was not counted");
    }
}

#[test]
fn image_without_extents_is_skipped() {
    let png = red_over_blue();
    let (canvas, stats) = record(ImagePaint {
        data: &png,
        format: ImageFormat::Png,
        extents: None,
    });
    assert!(canvas.commands.is_empty(), "nothing should be drawn");
    assert_eq!(stats.skipped_images, 1);
}

#[test]
fn image_invalid_png_is_skipped() {
    let (canvas, stats) = record(ImagePaint {
        data: b"\x89PNG but not really",
        format: ImageFormat::Png,
        extents: Some(Rect::new(0.0, 0.0, 1.0, 1.0)),
    });
    assert!(canvas.commands.is_empty(), "nothing should be drawn");
    assert_eq!(stats.skipped_images, 1);
}

#[test]
fn image_png_is_drawn_with_its_size() {
    let png = red_over_blue();
    let (canvas, stats) = record(ImagePaint {
        data: &png,
        format: ImageFormat::Png,
        extents: Some(Rect::new(0.0, 0.0, 100.0, 50.0)),
    });
    assert!(stats.is_clean(), "unexpected diagnostics: {stats:?}");
    assert_eq!(
        canvas.commands,
        [
            CanvasCommand::Save,
            CanvasCommand::Transform(Affine::new([50.0, 0.0, 0.0, -25.0, 0.0, 50.0])),
            CanvasCommand::DrawImage {
                width: 2,
                height: 2
            },
            CanvasCommand::Restore,
        ]
    );
}

#[test]
fn image_png_fills_its_extents_upright() {
    let png = red_over_blue();
    let mut canvas = PixmapCanvas::new(4, 4);
    // Font units point up; flip them onto the pixel grid.
    canvas.transform(Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, 4.0]));
    let stats = replay_ops(
        [PaintOp::PaintImage(ImagePaint {
            data: &png,
            format: ImageFormat::Png,
            extents: Some(Rect::new(0.0, 0.0, 2.0, 2.0)),
        })],
        &TestFont::new(4),
        &test_palette(),
        &mut canvas,
        PaintDispatch::shared(),
    );

    assert!(stats.is_clean(), "unexpected diagnostics: {stats:?}");
    // The image covers the bottom-left quarter, top row first.
    assert_color_near(canvas.pixel(0, 2), [1.0, 0.0, 0.0, 1.0], "top row");
    assert_color_near(canvas.pixel(1, 3), [0.0, 0.0, 1.0, 1.0], "bottom row");
    assert_color_near(canvas.pixel(3, 0), [0.0, 0.0, 0.0, 0.0], "outside");
    assert_color_near(canvas.pixel(2, 3), [0.0, 0.0, 0.0, 0.0], "outside");
}

#[test]
fn image_decoding_premultiplies() {
    let png = encode_png(1, 1, &[255, 255, 255, 51]);
    let image = decode_image(&ImagePaint {
        data: &png,
        format: ImageFormat::Png,
        extents: None,
    })
    .unwrap();
    assert_eq!((image.width(), image.height()), (1, 1));
    assert_eq!(image.pixel(0, 0), Some([51, 51, 51, 51]));
}
