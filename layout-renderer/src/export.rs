//! Document export to raster images, PDF, SVG and zip packages.
//!
//! Every format starts from the SVG representation of the view's content
//! layer. Raster and PDF output are rasterised with resvg into a tiny-skia
//! pixmap; SVG and package output are written as-is.

use std::fmt;
use std::io::{Cursor, Write};
use std::str::FromStr;

use image::ImageEncoder;
use layout_core::{Bounds, Color, Document, DocumentSpec, Layer, LayoutView, Primitive};
use serde::Serialize;

use crate::error::{RenderError, RenderResult};
use crate::fonts::{FontConfig, FontContext};
use crate::svg::{asset_path, document_svg, ImageRefs, SvgFrame};

/// Accepted DPI range.
pub const DPI_RANGE: std::ops::RangeInclusive<f32> = 1.0..=2400.0;

/// JPEG quality used when none is requested.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Largest raster the exporter will allocate, in pixels.
const MAX_PIXELS: u64 = 200_000_000;

/// Length of each crop mark, in points.
const CROP_MARK_LENGTH: f32 = 18.0;

/// Gap between the bleed edge and a crop mark, in points.
const CROP_MARK_OFFSET: f32 = 3.0;

/// Crop mark stroke, in points.
const CROP_MARK_WIDTH: f32 = 0.25;

/// Raster encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    /// Lossless PNG; quality is ignored.
    Png,
    /// JPEG composited over the background colour.
    Jpeg,
}

impl RasterFormat {
    /// MIME type for data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Any export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image of the trim box.
    Png,
    /// JPEG image of the trim box.
    Jpeg,
    /// Print PDF of the bleed box.
    Pdf,
    /// SVG of the bleed box in physical units.
    Svg,
    /// Zip with SVG, image assets and a manifest.
    Package,
}

impl ExportFormat {
    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Package => "zip",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            "package" | "zip" => Ok(Self::Package),
            other => Err(RenderError::InvalidOptions(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Package => "package",
        };
        f.write_str(name)
    }
}

/// Options for [`SceneExporter::raster`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Output resolution.
    pub dpi: f32,
    /// Encoding.
    pub format: RasterFormat,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: Option<f32>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: 150.0,
            format: RasterFormat::Png,
            quality: None,
        }
    }
}

/// Options for [`SceneExporter::pdf`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    /// Resolution of the embedded raster.
    pub dpi: f32,
    /// Draw crop marks outside the trim, extending the page.
    pub crop_marks: bool,
    /// Outline text before rasterising.
    pub outline: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            crop_marks: false,
            outline: false,
        }
    }
}

/// Options shared by the SVG and package exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VectorOptions {
    /// Convert text to glyph paths.
    pub outline: bool,
}

/// Format-independent options, as collected by a CLI.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExportOptions {
    /// Resolution; format default when unset.
    pub dpi: Option<f32>,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: Option<f32>,
    /// PDF crop marks.
    pub crop_marks: bool,
    /// Outline text.
    pub outline: bool,
}

/// Configuration for scene export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Colour painted under the content; JPEG composites onto it.
    pub background: Color,
    /// Font sources.
    pub fonts: FontConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            fonts: FontConfig::default(),
        }
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    version: &'a str,
    document: DocumentSpec,
    svg: &'a str,
    outlined: bool,
    assets: Vec<ManifestAsset>,
}

#[derive(Serialize)]
struct ManifestAsset {
    object: String,
    path: String,
    mime: &'static str,
    width_px: u32,
    height_px: u32,
}

fn validate_dpi(dpi: f32) -> RenderResult<()> {
    if dpi.is_finite() && DPI_RANGE.contains(&dpi) {
        Ok(())
    } else {
        Err(RenderError::InvalidOptions(format!(
            "dpi must be within {}..={}, got {dpi}",
            DPI_RANGE.start(),
            DPI_RANGE.end()
        )))
    }
}

fn validate_quality(quality: Option<f32>) -> RenderResult<()> {
    match quality {
        Some(q) if !(q.is_finite() && (0.0..=1.0).contains(&q)) => Err(
            RenderError::InvalidOptions(format!("quality must be within 0..=1, got {q}")),
        ),
        _ => Ok(()),
    }
}

/// Map a `0..=1` quality onto the JPEG encoder's `1..=100`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn jpeg_quality(quality: f32) -> u8 {
    (1.0 + (quality.clamp(0.0, 1.0) * 99.0).round()) as u8
}

/// Pixel size of a region at a resolution.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_size(document: &Document, region: Bounds, dpi: f32) -> RenderResult<(u32, u32)> {
    let unit = document.unit();
    let px = |len: f32| (unit.to_points(len) * dpi / 72.0).round().max(1.0) as u32;
    let (w, h) = (px(region.width), px(region.height));
    if u64::from(w) * u64::from(h) > MAX_PIXELS {
        return Err(RenderError::Surface(format!(
            "{w}x{h} pixels exceeds the raster limit; lower the dpi"
        )));
    }
    Ok((w, h))
}

fn points_to_mm(points: f32) -> f32 {
    points * 25.4 / 72.0
}

/// Exports a [`LayoutView`] to print and screen formats.
///
/// Exporters read a snapshot and never mutate the engine.
#[derive(Debug, Clone)]
pub struct SceneExporter {
    config: ExportConfig,
    fonts: FontContext,
}

impl SceneExporter {
    /// Create an exporter, loading fonts as configured.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let fonts = FontContext::new(&config.fonts);
        Self { config, fonts }
    }

    /// Create an exporter sharing an already loaded font context.
    #[must_use]
    pub fn with_fonts(config: ExportConfig, fonts: FontContext) -> Self {
        Self { config, fonts }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The fonts used for rasterising and outlining.
    #[must_use]
    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    /// Export to any format.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or rendering fails.
    pub fn export(
        &self,
        view: &LayoutView<'_>,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> RenderResult<Vec<u8>> {
        tracing::info!("Exporting {format}");
        let vector = VectorOptions {
            outline: options.outline,
        };
        match format {
            ExportFormat::Png | ExportFormat::Jpeg => self.raster(
                view,
                &RasterOptions {
                    dpi: options.dpi.unwrap_or(RasterOptions::default().dpi),
                    format: if format == ExportFormat::Png {
                        RasterFormat::Png
                    } else {
                        RasterFormat::Jpeg
                    },
                    quality: options.quality,
                },
            ),
            ExportFormat::Pdf => self.pdf(
                view,
                &PdfOptions {
                    dpi: options.dpi.unwrap_or(PdfOptions::default().dpi),
                    crop_marks: options.crop_marks,
                    outline: options.outline,
                },
            ),
            ExportFormat::Svg => self.svg(view, &vector),
            ExportFormat::Package => self.package(view, &vector),
        }
    }

    /// Render the trim box to PNG or JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, the surface cannot be
    /// allocated or encoding fails.
    pub fn raster(&self, view: &LayoutView<'_>, options: &RasterOptions) -> RenderResult<Vec<u8>> {
        validate_dpi(options.dpi)?;
        validate_quality(options.quality)?;

        let region = view.document.trim_rect();
        let pixmap = self.rasterize(view, region, options.dpi, false)?;
        match options.format {
            RasterFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}"))),
            RasterFormat::Jpeg => self.encode_jpeg(
                &pixmap,
                jpeg_quality(options.quality.unwrap_or(DEFAULT_JPEG_QUALITY)),
            ),
        }
    }

    /// Render the trim box as a `data:` URI.
    ///
    /// # Errors
    ///
    /// See [`SceneExporter::raster`].
    pub fn raster_data_uri(
        &self,
        view: &LayoutView<'_>,
        options: &RasterOptions,
    ) -> RenderResult<String> {
        use base64::Engine;
        let bytes = self.raster(view, options)?;
        Ok(format!(
            "data:{};base64,{}",
            options.format.mime(),
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }

    /// Export the bleed box as a single-page print PDF.
    ///
    /// The page is rasterised at the requested DPI and embedded as an image.
    /// With crop marks, the page grows by a slug area that carries them.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid, outlining fails or PDF
    /// generation fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn pdf(&self, view: &LayoutView<'_>, options: &PdfOptions) -> RenderResult<Vec<u8>> {
        use printpdf::{Mm, PdfDocument};

        validate_dpi(options.dpi)?;

        let document = view.document;
        let unit = document.unit();
        let region = document.bleed_box();
        let pixmap = self.rasterize(view, region, options.dpi, options.outline)?;
        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;

        let art_w = points_to_mm(unit.to_points(region.width));
        let art_h = points_to_mm(unit.to_points(region.height));
        let slug = if options.crop_marks {
            points_to_mm(CROP_MARK_OFFSET + CROP_MARK_LENGTH + CROP_MARK_OFFSET)
        } else {
            0.0
        };
        let page_w = art_w + slug * 2.0;
        let page_h = art_h + slug * 2.0;

        let (doc, page, layer) =
            PdfDocument::new("Layout Export", Mm(page_w), Mm(page_h), "Artwork");
        let current_layer = doc.get_page(page).get_layer(layer);

        // Decode with printpdf's bundled image crate for compatibility.
        let dynamic_image = printpdf::image_crate::load_from_memory(&png)
            .map_err(|e| RenderError::Encode(format!("Failed to decode PNG for PDF: {e}")))?;
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        // Size the image from its pixels at the requested dpi, then correct
        // for rounding so it covers the artwork exactly.
        let natural_w = pixmap.width() as f32 / options.dpi * 25.4;
        let natural_h = pixmap.height() as f32 / options.dpi * 25.4;
        pdf_image.add_to_layer(
            current_layer.clone(),
            printpdf::ImageTransform {
                translate_x: Some(Mm(slug)),
                translate_y: Some(Mm(slug)),
                scale_x: Some(art_w / natural_w),
                scale_y: Some(art_h / natural_h),
                dpi: Some(options.dpi),
                ..Default::default()
            },
        );

        if options.crop_marks {
            let bleed_mm = points_to_mm(unit.to_points(document.bleed()));
            let trim_w = points_to_mm(unit.to_points(document.width()));
            let trim_h = points_to_mm(unit.to_points(document.height()));
            let trim_left = slug + bleed_mm;
            let trim_bottom = slug + bleed_mm;
            draw_crop_marks(
                &current_layer,
                Bounds::new(trim_left, trim_bottom, trim_w, trim_h),
                bleed_mm,
            );
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| RenderError::Encode(format!("PDF save failed: {e}")))?;
        tracing::info!(
            "PDF export: {:.1}x{:.1}mm page, {}x{} px artwork",
            page_w,
            page_h,
            pixmap.width(),
            pixmap.height()
        );
        Ok(bytes)
    }

    /// Export the bleed box as SVG in the document's physical unit.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Outline`] if outlining is requested and a text
    /// object cannot be converted.
    pub fn svg(&self, view: &LayoutView<'_>, options: &VectorOptions) -> RenderResult<Vec<u8>> {
        let svg = self.physical_svg(view, ImageRefs::Embedded, options.outline)?;
        Ok(svg.into_bytes())
    }

    /// Export a zip containing `layout.svg`, the image assets it references
    /// and `manifest.json`.
    ///
    /// Entries carry a fixed timestamp so identical layouts produce identical
    /// archives.
    ///
    /// # Errors
    ///
    /// Returns an error if outlining or zip writing fails.
    pub fn package(&self, view: &LayoutView<'_>, options: &VectorOptions) -> RenderResult<Vec<u8>> {
        const SVG_NAME: &str = "layout.svg";

        let svg = self.physical_svg(view, ImageRefs::Assets, options.outline)?;

        let mut assets = Vec::new();
        let mut payloads = Vec::new();
        for node in view.scene.layer(Layer::Content) {
            let (Primitive::Image { data, .. }, Some(owner)) = (&node.primitive, node.owner) else {
                continue;
            };
            let object = owner.to_string();
            let path = asset_path(&object, data.format.extension());
            assets.push(ManifestAsset {
                object,
                path: path.clone(),
                mime: data.format.mime(),
                width_px: data.width_px,
                height_px: data.height_px,
            });
            payloads.push((path, data));
        }

        let manifest = Manifest {
            version: crate::VERSION,
            document: view.document.spec(),
            svg: SVG_NAME,
            outlined: options.outline,
            assets,
        };
        let manifest_json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| RenderError::Package(format!("manifest serialization failed: {e}")))?;

        let entry = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        zip.start_file(SVG_NAME, entry)?;
        zip.write_all(svg.as_bytes())?;
        for (path, data) in &payloads {
            zip.start_file(path.as_str(), entry)?;
            zip.write_all(&data.bytes)?;
        }
        zip.start_file("manifest.json", entry)?;
        zip.write_all(&manifest_json)?;

        let bytes = zip.finish()?.into_inner();
        tracing::info!("Package export: {} assets, {} bytes", payloads.len(), bytes.len());
        Ok(bytes)
    }

    fn physical_svg(
        &self,
        view: &LayoutView<'_>,
        images: ImageRefs,
        outline: bool,
    ) -> RenderResult<String> {
        let document = view.document;
        let region = document.bleed_box();
        let suffix = document.unit().svg_suffix();
        let frame = SvgFrame {
            view_box: region,
            width: format!("{}{suffix}", region.width),
            height: format!("{}{suffix}", region.height),
            background: Some(self.config.background),
        };
        document_svg(view, &frame, images, outline.then_some(&self.fonts))
    }

    fn rasterize(
        &self,
        view: &LayoutView<'_>,
        region: Bounds,
        dpi: f32,
        outline: bool,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let (px_w, px_h) = pixel_size(view.document, region, dpi)?;
        let frame = SvgFrame {
            view_box: region,
            width: px_w.to_string(),
            height: px_h.to_string(),
            background: Some(self.config.background),
        };
        let svg = document_svg(view, &frame, ImageRefs::Embedded, outline.then_some(&self.fonts))?;

        if !self.fonts.has_fonts() && has_visible_text(view) {
            tracing::warn!("Rendering without fonts; text will be missing");
        }

        let tree = self.fonts.parse(&svg)?;
        let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Surface(format!("Failed to create {px_w}x{px_h} pixmap")))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        tracing::debug!("Rasterised {px_w}x{px_h} at {dpi} dpi");
        Ok(pixmap)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap, quality: u8) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // tiny-skia stores premultiplied alpha.
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (channel, base) in pixel[..3].iter().zip([bg.r, bg.g, bg.b]) {
                let value = f32::from(base).mul_add(inv, f32::from(*channel));
                rgb_data.push(value.round().min(255.0) as u8);
            }
        }

        let mut buf = Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }
}

fn has_visible_text(view: &LayoutView<'_>) -> bool {
    view.scene.layer(Layer::Content).any(|n| {
        matches!(&n.primitive, Primitive::Text { text, .. } if !text.trim().is_empty())
    })
}

/// Draw the eight crop marks around `trim` (PDF millimetres, origin bottom
/// left), offset past the bleed.
fn draw_crop_marks(layer: &printpdf::PdfLayerReference, trim: Bounds, bleed: f32) {
    use printpdf::{Cmyk, Line, Mm, Point};

    let offset = bleed + points_to_mm(CROP_MARK_OFFSET);
    let length = points_to_mm(CROP_MARK_LENGTH);
    let (left, bottom, right, top) = (trim.x, trim.y, trim.right(), trim.bottom());

    layer.set_outline_color(printpdf::Color::Cmyk(Cmyk::new(1.0, 1.0, 1.0, 1.0, None)));
    layer.set_outline_thickness(CROP_MARK_WIDTH);

    let segment = |x1: f32, y1: f32, x2: f32, y2: f32| Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    };

    for x in [left, right] {
        // Vertical marks above and below each vertical trim edge.
        layer.add_line(segment(x, top + offset, x, top + offset + length));
        layer.add_line(segment(x, bottom - offset, x, bottom - offset - length));
    }
    for y in [bottom, top] {
        layer.add_line(segment(left - offset, y, left - offset - length, y));
        layer.add_line(segment(right + offset, y, right + offset + length, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout_core::{Engine, TextStyle, Unit};

    fn exporter() -> SceneExporter {
        SceneExporter::with_fonts(ExportConfig::default(), FontContext::empty())
    }

    fn engine(bleed: Option<f32>) -> Engine {
        Engine::new(
            Document::new(DocumentSpec {
                width: 1.0,
                height: 0.5,
                bleed,
                safe: None,
                unit: Unit::In,
            })
            .expect("valid"),
        )
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let engine = engine(None);
        let (w, h) = pixel_size(engine.document(), engine.document().trim_rect(), 96.0)
            .expect("size");
        assert_eq!((w, h), (96, 48));
    }

    #[test]
    fn test_png_is_trim_sized() {
        let mut engine = engine(Some(0.1));
        engine.add_rect(Bounds::new(0.0, 0.0, 0.5, 0.5), Some(Color::rgb(255, 0, 0)));
        let png = exporter()
            .raster(
                &engine.view(),
                &RasterOptions {
                    dpi: 40.0,
                    ..RasterOptions::default()
                },
            )
            .expect("png");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (40, 20));
        assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(35, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_jpeg_data_uri() {
        let engine = engine(None);
        let uri = exporter()
            .raster_data_uri(
                &engine.view(),
                &RasterOptions {
                    dpi: 20.0,
                    format: RasterFormat::Jpeg,
                    quality: Some(0.5),
                },
            )
            .expect("jpeg");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_option_validation() {
        let engine = engine(None);
        let exporter = exporter();
        for dpi in [0.0, 2401.0, f32::NAN] {
            let result = exporter.raster(
                &engine.view(),
                &RasterOptions {
                    dpi,
                    ..RasterOptions::default()
                },
            );
            assert!(matches!(result, Err(RenderError::InvalidOptions(_))));
        }
        let result = exporter.raster(
            &engine.view(),
            &RasterOptions {
                quality: Some(1.5),
                ..RasterOptions::default()
            },
        );
        assert!(matches!(result, Err(RenderError::InvalidOptions(_))));
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.5), 51);
    }

    #[test]
    fn test_svg_uses_physical_units_over_bleed() {
        let engine = engine(Some(0.125));
        let svg = exporter()
            .svg(&engine.view(), &VectorOptions::default())
            .expect("svg");
        let svg = String::from_utf8(svg).expect("utf8");
        assert!(svg.contains("width=\"1.25in\""));
        assert!(svg.contains("viewBox=\"-0.125 -0.125 1.25 0.75\""));
    }

    #[test]
    fn test_svg_outline_requires_fonts() {
        let mut engine = engine(None);
        engine.add_text(Bounds::new(0.0, 0.0, 1.0, 0.5), "Hi", TextStyle::default());
        let result = exporter().svg(&engine.view(), &VectorOptions { outline: true });
        assert!(matches!(result, Err(RenderError::Outline(_))));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JPG".parse::<ExportFormat>().expect("jpg"), ExportFormat::Jpeg);
        assert_eq!("zip".parse::<ExportFormat>().expect("zip"), ExportFormat::Package);
        assert!("tiff".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Package.to_string(), "package");
    }
}
