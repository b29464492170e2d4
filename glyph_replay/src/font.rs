// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Access to glyph outlines and color paint sequences.

use core::fmt;

use crate::color::{AlphaColor, Srgb};
use crate::color_line::{ColorResolver, PaletteResolver, ResolvedColorLine, FOREGROUND_INDEX};
use crate::image::png_dimensions;
use crate::kurbo::{Affine, Point, Rect};
use crate::paint::{ColorLine, ColorStop, CompositeMode, Extend, ImageFormat, ImagePaint, PaintOp};
use skrifa::bitmap::{BitmapData, BitmapFormat, BitmapGlyph, Origin};
use skrifa::color::{Brush, ColorPainter, Transform};
use skrifa::instance::{LocationRef, NormalizedCoord, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::raw::types::{BoundingBox, Tag};
use skrifa::raw::{ReadError, TableProvider};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use smallvec::SmallVec;

/// A font that can provide glyph outlines and color paint sequences.
pub trait ColorFont {
    /// The number of font units per em.
    fn units_per_em(&self) -> u16;

    /// Draws the outline of `glyph_id` into `pen`, in font units.
    ///
    /// Returns `false` if the glyph has no outline.
    fn draw_outline(&self, glyph_id: GlyphId, pen: &mut dyn OutlinePen) -> bool;

    /// Emits the paint sequence of `glyph_id`, depth first, in font units.
    ///
    /// Returns `Ok(false)` if the font has nothing to paint for the glyph. On error, the
    /// operations emitted so far may not be balanced.
    fn paint_glyph(
        &self,
        glyph_id: GlyphId,
        sink: &mut dyn FnMut(PaintOp<'_>),
    ) -> Result<bool, PaintError>;

    /// Whether the font carries color glyph data at all.
    fn has_color_glyphs(&self) -> bool;
}

/// A [`ColorFont`] backed by [skrifa].
///
/// Color glyphs come from the `COLR` table, then from bitmap strikes (`CBDT`/`sbix`).
/// Glyphs with neither are painted as their outline filled with the foreground color.
#[derive(Clone)]
pub struct SkrifaFont<'a> {
    font: FontRef<'a>,
    units_per_em: u16,
    coords: Vec<NormalizedCoord>,
    palette: PaletteResolver,
    bitmap_size: Size,
}

impl fmt::Debug for SkrifaFont<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkrifaFont")
            .field("units_per_em", &self.units_per_em)
            .field("coords", &self.coords)
            .field("palette", &self.palette)
            .field("bitmap_size", &self.bitmap_size.ppem())
            .finish_non_exhaustive()
    }
}

impl<'a> SkrifaFont<'a> {
    /// Loads font `index` from `data`, a font file or collection.
    ///
    /// The first palette is selected and the foreground color is black.
    pub fn new(data: &'a [u8], index: u32) -> Result<Self, FontError> {
        let font = FontRef::from_index(data, index)?;
        let units_per_em = font.head()?.units_per_em();
        if units_per_em == 0 {
            return Err(FontError::InvalidUnitsPerEm);
        }
        let palette = PaletteResolver::new(load_palette(&font, 0), AlphaColor::BLACK);
        Ok(Self {
            font,
            units_per_em,
            coords: Vec::new(),
            palette,
            bitmap_size: Size::unscaled(),
        })
    }

    /// Selects a `CPAL` palette. Indices past the last palette leave every entry resolving
    /// to the foreground color.
    pub fn palette(mut self, index: u16) -> Self {
        let foreground = self.palette.foreground();
        self.palette = PaletteResolver::new(load_palette(&self.font, index), foreground);
        self
    }

    /// Sets the color used for palette index `0xFFFF` and for plain outlines.
    pub fn foreground(mut self, color: AlphaColor<Srgb>) -> Self {
        self.palette = PaletteResolver::new(self.palette.palette().to_vec(), color);
        self
    }

    /// Sets normalized variation coordinates, in 2.14 fixed point.
    pub fn normalized_coords(mut self, coords: &[i16]) -> Self {
        self.coords = bytemuck::cast_slice(coords).to_vec();
        self
    }

    /// Selects the bitmap strike closest to `ppem` pixels per em.
    ///
    /// By default the largest strike is used.
    pub fn bitmap_size(mut self, ppem: f32) -> Self {
        self.bitmap_size = Size::new(ppem);
        self
    }

    /// The underlying skrifa font.
    pub fn font_ref(&self) -> &FontRef<'a> {
        &self.font
    }

    /// The foreground color.
    pub fn foreground_color(&self) -> AlphaColor<Srgb> {
        self.palette.foreground()
    }

    fn location(&self) -> LocationRef<'_> {
        LocationRef::new(&self.coords)
    }

    fn has_table(&self, tag: &[u8; 4]) -> bool {
        self.font.table_data(Tag::new(tag)).is_some()
    }

    /// The image paint for a bitmap glyph, with extents in font units.
    fn bitmap_paint(&self, glyph_id: GlyphId) -> Option<ImagePaint<'a>> {
        let strikes = self.font.bitmap_strikes();
        let glyph = strikes.glyph_for_size(self.bitmap_size, glyph_id)?;
        let (format, data) = match glyph.data {
            BitmapData::Png(data) => (ImageFormat::Png, data),
            BitmapData::Bgra(data) => (ImageFormat::Bgra, data),
            BitmapData::Mask(_) => (ImageFormat::Other(*b"mask"), &[][..]),
        };
        let sbix = strikes.format() == Some(BitmapFormat::Sbix);
        let extents = (format == ImageFormat::Png)
            .then(|| png_dimensions(data))
            .flatten()
            .and_then(|size| bitmap_extents(&glyph, sbix, self.units_per_em, size));
        Some(ImagePaint {
            data,
            format,
            extents,
        })
    }
}

/// Places a `width` by `height` pixel bitmap in font units, y up.
fn bitmap_extents(
    glyph: &BitmapGlyph<'_>,
    sbix: bool,
    units_per_em: u16,
    (width, height): (u32, u32),
) -> Option<Rect> {
    if glyph.ppem_x <= 0.0 || glyph.ppem_y <= 0.0 {
        return None;
    }
    // CoreText adds a 100 unit offset to sbix glyphs that don't carry one.
    let bearing_y = if glyph.bearing_y == 0.0 && sbix {
        100.0
    } else {
        glyph.bearing_y
    };
    let upem = f32::from(units_per_em);
    let scale_x = upem / glyph.ppem_x;
    let scale_y = upem / glyph.ppem_y;
    #[allow(
        clippy::cast_precision_loss,
        reason = "bitmap glyphs are far smaller than 2^24 pixels"
    )]
    let (width, height) = (width as f32, height as f32);
    let shift_y = match glyph.placement_origin {
        Origin::TopLeft => 0.0,
        Origin::BottomLeft => -height,
    };
    let x0 = -glyph.bearing_x - glyph.inner_bearing_x * scale_x;
    // Top edge, measured downwards from the baseline.
    let top = bearing_y + (shift_y - glyph.inner_bearing_y) * scale_y;
    let (width, height) = (width * scale_x, height * scale_y);
    Some(Rect::new(
        f64::from(x0),
        f64::from(-top - height),
        f64::from(x0 + width),
        f64::from(-top),
    ))
}

fn load_palette(font: &FontRef<'_>, index: u16) -> Vec<AlphaColor<Srgb>> {
    let palettes = font.color_palettes();
    let Some(palette) = palettes.get(index) else {
        return Vec::new();
    };
    palette
        .colors()
        .iter()
        .map(|c| AlphaColor::from_rgba8(c.red, c.green, c.blue, c.alpha))
        .collect()
}

impl ColorFont for SkrifaFont<'_> {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn draw_outline(&self, glyph_id: GlyphId, pen: &mut dyn OutlinePen) -> bool {
        let Some(outline) = self.font.outline_glyphs().get(glyph_id) else {
            return false;
        };
        let settings = DrawSettings::unhinted(Size::unscaled(), self.location());
        match outline.draw(settings, &mut DynPen(pen)) {
            Ok(_) => true,
            Err(err) => {
                log::debug!("failed to draw outline of glyph {}: {err}", glyph_id.to_u32());
                false
            }
        }
    }

    fn paint_glyph(
        &self,
        glyph_id: GlyphId,
        sink: &mut dyn FnMut(PaintOp<'_>),
    ) -> Result<bool, PaintError> {
        if let Some(color_glyph) = self.font.color_glyphs().get(glyph_id) {
            let mut bridge = PaintBridge {
                sink,
                layers: SmallVec::new(),
            };
            color_glyph.paint(self.location(), &mut bridge)?;
            return Ok(true);
        }
        if let Some(image) = self.bitmap_paint(glyph_id) {
            sink(PaintOp::PaintImage(image));
            return Ok(true);
        }
        if self.font.outline_glyphs().get(glyph_id).is_some() {
            sink(PaintOp::PushClipGlyph(glyph_id));
            sink(PaintOp::PaintColor {
                palette_index: FOREGROUND_INDEX,
                alpha: 1.0,
            });
            sink(PaintOp::PopClip);
            return Ok(true);
        }
        Ok(false)
    }

    fn has_color_glyphs(&self) -> bool {
        self.has_table(b"COLR") || self.has_table(b"CBDT") || self.has_table(b"sbix")
    }
}

impl ColorResolver for SkrifaFont<'_> {
    fn resolve_palette_color(&self, palette_index: u16, alpha: f32) -> AlphaColor<Srgb> {
        self.palette.resolve_palette_color(palette_index, alpha)
    }

    fn resolve_color_line(&self, color_line: &ColorLine<'_>) -> ResolvedColorLine {
        self.palette.resolve_color_line(color_line)
    }
}

/// Lets skrifa draw into a pen it only knows as a trait object.
struct DynPen<'p>(&'p mut dyn OutlinePen);

impl OutlinePen for DynPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to(cx0, cy0, x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to(cx0, cy0, cx1, cy1, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Translates skrifa's painter callbacks into [`PaintOp`]s.
struct PaintBridge<'s, 'f> {
    sink: &'s mut (dyn FnMut(PaintOp<'_>) + 'f),
    /// Composite modes of the open layers; skrifa only reports them on push.
    layers: SmallVec<[CompositeMode; 4]>,
}

impl PaintBridge<'_, '_> {
    fn emit_stops(
        &mut self,
        stops: &[skrifa::color::ColorStop],
        extend: skrifa::color::Extend,
        op: impl FnOnce(ColorLine<'_>) -> PaintOp<'_>,
    ) {
        let stops = stops
            .iter()
            .map(|stop| ColorStop {
                offset: stop.offset,
                palette_index: stop.palette_index,
                alpha: stop.alpha,
            })
            .collect::<SmallVec<[ColorStop; 8]>>();
        let color_line = ColorLine {
            stops: &stops,
            extend: convert_extend(extend),
        };
        (self.sink)(op(color_line));
    }
}

impl ColorPainter for PaintBridge<'_, '_> {
    fn push_transform(&mut self, t: Transform) {
        let transform = Affine::new([
            f64::from(t.xx),
            f64::from(t.yx),
            f64::from(t.xy),
            f64::from(t.yy),
            f64::from(t.dx),
            f64::from(t.dy),
        ]);
        (self.sink)(PaintOp::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        (self.sink)(PaintOp::PopTransform);
    }

    fn push_clip_glyph(&mut self, glyph_id: GlyphId) {
        (self.sink)(PaintOp::PushClipGlyph(glyph_id));
    }

    fn push_clip_box(&mut self, clip_box: BoundingBox<f32>) {
        let rect = Rect::new(
            f64::from(clip_box.x_min),
            f64::from(clip_box.y_min),
            f64::from(clip_box.x_max),
            f64::from(clip_box.y_max),
        );
        (self.sink)(PaintOp::PushClipRect(rect));
    }

    fn pop_clip(&mut self) {
        (self.sink)(PaintOp::PopClip);
    }

    fn fill(&mut self, brush: Brush<'_>) {
        match brush {
            Brush::Solid {
                palette_index,
                alpha,
            } => (self.sink)(PaintOp::PaintColor {
                palette_index,
                alpha,
            }),
            Brush::LinearGradient {
                p0,
                p1,
                color_stops,
                extend,
            } => {
                // skrifa has already folded the rotation point in; pick one that keeps
                // the axis as is.
                let (p0, p1) = (convert_point(p0), convert_point(p1));
                let axis = p1 - p0;
                let p2 = p0 + crate::kurbo::Vec2::new(-axis.y, axis.x);
                self.emit_stops(color_stops, extend, |color_line| {
                    PaintOp::LinearGradient {
                        color_line,
                        p0,
                        p1,
                        p2,
                    }
                });
            }
            Brush::RadialGradient {
                c0,
                r0,
                c1,
                r1,
                color_stops,
                extend,
            } => {
                let (c0, c1) = (convert_point(c0), convert_point(c1));
                self.emit_stops(color_stops, extend, |color_line| {
                    PaintOp::RadialGradient {
                        color_line,
                        c0,
                        r0,
                        c1,
                        r1,
                    }
                });
            }
            Brush::SweepGradient {
                c0,
                start_angle,
                end_angle,
                color_stops,
                extend,
            } => {
                let center = convert_point(c0);
                self.emit_stops(color_stops, extend, |color_line| {
                    PaintOp::SweepGradient {
                        color_line,
                        center,
                        start_angle: start_angle.to_radians(),
                        end_angle: end_angle.to_radians(),
                    }
                });
            }
        }
    }

    fn push_layer(&mut self, composite_mode: skrifa::color::CompositeMode) {
        self.layers.push(convert_composite_mode(composite_mode));
        (self.sink)(PaintOp::PushGroup);
    }

    fn pop_layer(&mut self) {
        let mode = self.layers.pop().unwrap_or_default();
        (self.sink)(PaintOp::PopGroup(mode));
    }
}

fn convert_point(point: skrifa::raw::types::Point<f32>) -> Point {
    Point::new(f64::from(point.x), f64::from(point.y))
}

fn convert_extend(extend: skrifa::color::Extend) -> Extend {
    match extend {
        skrifa::color::Extend::Pad => Extend::Pad,
        skrifa::color::Extend::Repeat => Extend::Repeat,
        skrifa::color::Extend::Reflect => Extend::Reflect,
        skrifa::color::Extend::Unknown => Extend::Pad,
    }
}

fn convert_composite_mode(mode: skrifa::color::CompositeMode) -> CompositeMode {
    use skrifa::color::CompositeMode as Colr;

    match mode {
        Colr::Clear => CompositeMode::Clear,
        Colr::Src => CompositeMode::Src,
        Colr::Dest => CompositeMode::Dest,
        Colr::SrcOver => CompositeMode::SrcOver,
        Colr::DestOver => CompositeMode::DestOver,
        Colr::SrcIn => CompositeMode::SrcIn,
        Colr::DestIn => CompositeMode::DestIn,
        Colr::SrcOut => CompositeMode::SrcOut,
        Colr::DestOut => CompositeMode::DestOut,
        Colr::SrcAtop => CompositeMode::SrcAtop,
        Colr::DestAtop => CompositeMode::DestAtop,
        Colr::Xor => CompositeMode::Xor,
        Colr::Plus => CompositeMode::Plus,
        Colr::Screen => CompositeMode::Screen,
        Colr::Overlay => CompositeMode::Overlay,
        Colr::Darken => CompositeMode::Darken,
        Colr::Lighten => CompositeMode::Lighten,
        Colr::ColorDodge => CompositeMode::ColorDodge,
        Colr::ColorBurn => CompositeMode::ColorBurn,
        Colr::HardLight => CompositeMode::HardLight,
        Colr::SoftLight => CompositeMode::SoftLight,
        Colr::Difference => CompositeMode::Difference,
        Colr::Exclusion => CompositeMode::Exclusion,
        Colr::Multiply => CompositeMode::Multiply,
        Colr::HslHue => CompositeMode::HslHue,
        Colr::HslSaturation => CompositeMode::HslSaturation,
        Colr::HslColor => CompositeMode::HslColor,
        Colr::HslLuminosity => CompositeMode::HslLuminosity,
        Colr::Unknown => CompositeMode::Unknown,
    }
}

/// An error that occurred while loading a font.
#[derive(Debug)]
#[non_exhaustive]
pub enum FontError {
    /// The font data couldn't be read.
    Read(ReadError),
    /// The `head` table declares zero units per em.
    InvalidUnitsPerEm,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read font: {err}"),
            Self::InvalidUnitsPerEm => f.write_str("font has zero units per em"),
        }
    }
}

impl core::error::Error for FontError {}

impl From<ReadError> for FontError {
    fn from(err: ReadError) -> Self {
        Self::Read(err)
    }
}

/// An error that occurred while traversing a color glyph's paint graph.
#[derive(Debug)]
#[non_exhaustive]
pub enum PaintError {
    /// skrifa rejected the `COLR` paint graph.
    Colr(skrifa::color::PaintError),
}

impl fmt::Display for PaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Colr(err) => write!(f, "invalid color glyph: {err}"),
        }
    }
}

impl core::error::Error for PaintError {}

impl From<skrifa::color::PaintError> for PaintError {
    fn from(err: skrifa::color::PaintError) -> Self {
        Self::Colr(err)
    }
}
