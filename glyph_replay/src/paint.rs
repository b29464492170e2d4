// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paint operations a color glyph is made of.

use crate::kurbo::{Affine, Point, Rect};
use skrifa::GlyphId;

/// One step of a color glyph's paint graph, serialized depth-first.
///
/// Pushes and pops are expected to nest properly: every `Pop*` closes the innermost open
/// scope of the same kind. All geometry is in font units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PaintOp<'a> {
    /// Compose a transform into the current one until the matching [`PaintOp::PopTransform`].
    PushTransform(Affine),
    /// Undo the innermost [`PaintOp::PushTransform`].
    PopTransform,
    /// Intersect the clip with the outline of a glyph.
    PushClipGlyph(GlyphId),
    /// Intersect the clip with a rectangle.
    PushClipRect(Rect),
    /// Undo the innermost clip push.
    PopClip,
    /// Start rendering into an offscreen group.
    PushGroup,
    /// Composite the innermost group onto its parent with the given mode.
    PopGroup(CompositeMode),
    /// Fill the current clip with a palette color.
    PaintColor {
        /// Index into the color palette. `0xFFFF` selects the foreground color.
        palette_index: u16,
        /// Alpha multiplier applied on top of the palette color.
        alpha: f32,
    },
    /// Draw an embedded image.
    PaintImage(ImagePaint<'a>),
    /// Fill the current clip with a linear gradient.
    ///
    /// `p2` is the rotation point: the color line runs from `p0` towards `p1`, with lines of
    /// equal color parallel to `p0 -> p2`.
    LinearGradient {
        /// The gradient's color line.
        color_line: ColorLine<'a>,
        /// Start point.
        p0: Point,
        /// End point.
        p1: Point,
        /// Rotation point.
        p2: Point,
    },
    /// Fill the current clip with a two-circle radial gradient.
    RadialGradient {
        /// The gradient's color line.
        color_line: ColorLine<'a>,
        /// Center of the start circle.
        c0: Point,
        /// Radius of the start circle.
        r0: f32,
        /// Center of the end circle.
        c1: Point,
        /// Radius of the end circle.
        r1: f32,
    },
    /// Fill the current clip with a sweep (conic) gradient.
    SweepGradient {
        /// The gradient's color line.
        color_line: ColorLine<'a>,
        /// Center of the sweep.
        center: Point,
        /// Start angle in radians, measured from the positive x axis towards positive y.
        start_angle: f32,
        /// End angle in radians.
        end_angle: f32,
    },
}

/// A gradient's stop list and edge behavior, as stored in the font.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorLine<'a> {
    /// Color stops, ordered by offset.
    pub stops: &'a [ColorStop],
    /// How the gradient continues outside of `[0, 1]`.
    pub extend: Extend,
}

/// A color stop that still refers to the palette.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the color line.
    pub offset: f32,
    /// Palette entry. `0xFFFF` selects the foreground color.
    pub palette_index: u16,
    /// Alpha multiplier.
    pub alpha: f32,
}

/// Extend mode of a gradient.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Extend {
    /// Repeat the edge colors.
    #[default]
    Pad,
    /// Repeat the whole color line.
    Repeat,
    /// Repeat the color line, mirroring every other repetition.
    Reflect,
}

impl From<Extend> for peniko::Extend {
    fn from(extend: Extend) -> Self {
        match extend {
            Extend::Pad => Self::Pad,
            Extend::Repeat => Self::Repeat,
            Extend::Reflect => Self::Reflect,
        }
    }
}

/// How a group is composited onto its parent.
///
/// These are the composite modes of the OpenType `COLR` table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompositeMode {
    /// No regions are enabled.
    Clear,
    /// Only the source is shown.
    Src,
    /// Only the destination is shown.
    Dest,
    /// The source is placed over the destination.
    #[default]
    SrcOver,
    /// The destination is placed over the source.
    DestOver,
    /// The source that overlaps the destination replaces the destination.
    SrcIn,
    /// The destination that overlaps the source replaces the source.
    DestIn,
    /// The source is shown where it doesn't overlap the destination.
    SrcOut,
    /// The destination is shown where it doesn't overlap the source.
    DestOut,
    /// The source is shown where it overlaps the destination, over the destination.
    SrcAtop,
    /// The destination is shown where it overlaps the source, over the source.
    DestAtop,
    /// Only the non-overlapping parts of source and destination are shown.
    Xor,
    /// Source and destination are added together.
    Plus,
    /// Screen blending.
    Screen,
    /// Overlay blending.
    Overlay,
    /// Keeps the darker of source and destination.
    Darken,
    /// Keeps the lighter of source and destination.
    Lighten,
    /// Brightens the destination to reflect the source.
    ColorDodge,
    /// Darkens the destination to reflect the source.
    ColorBurn,
    /// Hard light blending.
    HardLight,
    /// Soft light blending.
    SoftLight,
    /// Subtracts the darker color from the lighter one.
    Difference,
    /// Like difference, with lower contrast.
    Exclusion,
    /// Multiplies source and destination.
    Multiply,
    /// Hue of the source with saturation and luminosity of the destination.
    HslHue,
    /// Saturation of the source with hue and luminosity of the destination.
    HslSaturation,
    /// Hue and saturation of the source with luminosity of the destination.
    HslColor,
    /// Luminosity of the source with hue and saturation of the destination.
    HslLuminosity,
    /// A mode this crate doesn't know about; treated as [`CompositeMode::SrcOver`].
    Unknown,
}

impl CompositeMode {
    /// The number of composite modes, including [`CompositeMode::Unknown`].
    pub const COUNT: usize = Self::Unknown as usize + 1;

    /// All composite modes, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Clear,
        Self::Src,
        Self::Dest,
        Self::SrcOver,
        Self::DestOver,
        Self::SrcIn,
        Self::DestIn,
        Self::SrcOut,
        Self::DestOut,
        Self::SrcAtop,
        Self::DestAtop,
        Self::Xor,
        Self::Plus,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Multiply,
        Self::HslHue,
        Self::HslSaturation,
        Self::HslColor,
        Self::HslLuminosity,
        Self::Unknown,
    ];
}

/// Encoding of an embedded image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG data.
    Png,
    /// Raw premultiplied BGRA pixels.
    Bgra,
    /// An SVG document.
    Svg,
    /// Any other encoding, identified by its tag.
    Other([u8; 4]),
}

/// An image painted as part of a glyph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImagePaint<'a> {
    /// The encoded image data.
    pub data: &'a [u8],
    /// The encoding of `data`.
    pub format: ImageFormat,
    /// The area covered by the image, in font units with y pointing up.
    ///
    /// Images without extents are not drawn.
    pub extents: Option<Rect>,
}
