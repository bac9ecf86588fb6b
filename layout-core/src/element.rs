//! Canvas objects - the building blocks of a layout.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Bounds, CanvasError};

/// Unique identifier for an object, stable for the document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An sRGB colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Build an opaque colour.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opacity in `0.0..=1.0`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// `#rrggbb` without the alpha channel.
    #[must_use]
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        let short = |idx: usize| channel(idx..idx + 1).map(|v| v * 17);

        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
                a: channel(6..8)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "{}", self.rgb_hex())
        } else {
            write!(f, "{}{:02x}", self.rgb_hex(), self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

/// Typographic attributes of a text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// CSS-style weight (100..=900).
    pub font_weight: u16,
    /// Font size in points, whatever the document unit.
    pub font_size: f32,
    /// Fill colour.
    pub color: Color,
    /// Letter tracking in thousandths of an em.
    pub tracking: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Horizontal alignment.
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_weight: 400,
            font_size: 12.0,
            color: Color::BLACK,
            tracking: 0.0,
            line_height: 1.2,
            align: TextAlign::Left,
        }
    }
}

/// Encoded image formats accepted by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// GIF image.
    Gif,
    /// WebP image.
    WebP,
    /// Unrecognised bytes.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    /// MIME type for data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// File extension used for packaged assets.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Unknown => "bin",
        }
    }
}

/// Encoded pixel payload of an image object, orientation already normalised.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Encoded image bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
    /// Displayed width in pixels.
    pub width_px: u32,
    /// Displayed height in pixels.
    pub height_px: u32,
}

impl ImageData {
    /// Wrap already-decoded metadata around encoded bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, format: ImageFormat, width_px: u32, height_px: u32) -> Self {
        Self {
            bytes,
            format,
            width_px,
            height_px,
        }
    }

    /// The payload as a base64 `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        use base64::Engine;
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("bytes", &format_args!("[{} bytes]", self.bytes.len()))
            .field("format", &self.format)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .finish()
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// Pan and zoom of image pixels inside the fixed clip rectangle.
///
/// Content is drawn at `(x + offset_x, y + offset_y)` with a size of
/// `pixels * scale` document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    /// Document units per image pixel.
    pub scale: f32,
    /// Horizontal offset from the frame's left edge.
    pub offset_x: f32,
    /// Vertical offset from the frame's top edge.
    pub offset_y: f32,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ImageTransform {
    /// Scale the image to fit entirely inside a `width` × `height` frame,
    /// centred.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(width: f32, height: f32, data: &ImageData) -> Self {
        if data.width_px == 0 || data.height_px == 0 {
            return Self::default();
        }
        let (pw, ph) = (data.width_px as f32, data.height_px as f32);
        let scale = (width / pw).min(height / ph);
        Self {
            scale,
            offset_x: (width - pw * scale) / 2.0,
            offset_y: (height - ph * scale) / 2.0,
        }
    }
}

/// A filled rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Fill colour; unfilled when absent.
    #[serde(default)]
    pub fill: Option<Color>,
}

/// A styled text block inside an authored bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Box width, independent of the rendered extent.
    pub width: f32,
    /// Box height, independent of the rendered extent.
    pub height: f32,
    /// Text content; `\n` starts a new line.
    pub text: String,
    /// Typography.
    #[serde(default)]
    pub style: TextStyle,
}

/// An image clipped to its frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Left edge of the clip rectangle.
    pub x: f32,
    /// Top edge of the clip rectangle.
    pub y: f32,
    /// Clip rectangle width.
    pub width: f32,
    /// Clip rectangle height.
    pub height: f32,
    /// Pixel payload.
    pub data: Arc<ImageData>,
    /// Pan/zoom of the content inside the clip rectangle.
    #[serde(default)]
    pub transform: ImageTransform,
}

impl ImageObject {
    /// Where the pixel content is drawn before clipping.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn content_bounds(&self) -> Bounds {
        let t = &self.transform;
        Bounds::new(
            self.x + t.offset_x,
            self.y + t.offset_y,
            self.data.width_px as f32 * t.scale,
            self.data.height_px as f32 * t.scale,
        )
    }
}

/// Discriminant of a [`CanvasObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Rectangle.
    Rect,
    /// Text block.
    Text,
    /// Image.
    Image,
}

/// A placed, typed element of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasObject {
    /// A filled rectangle.
    Rect(RectObject),
    /// A text block.
    Text(TextObject),
    /// A clipped image.
    Image(ImageObject),
}

impl CanvasObject {
    /// Build a rectangle with a fresh id.
    #[must_use]
    pub fn rect(bounds: Bounds, fill: Option<Color>) -> Self {
        Self::Rect(RectObject {
            id: ObjectId::new(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            fill,
        })
    }

    /// Build a text block with a fresh id.
    #[must_use]
    pub fn text(bounds: Bounds, text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text(TextObject {
            id: ObjectId::new(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            text: text.into(),
            style,
        })
    }

    /// Build an image with a fresh id, fitted inside its frame.
    #[must_use]
    pub fn image(bounds: Bounds, data: Arc<ImageData>) -> Self {
        let transform = ImageTransform::fit(bounds.width, bounds.height, &data);
        Self::Image(ImageObject {
            id: ObjectId::new(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            data,
            transform,
        })
    }

    /// The object's id.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Rect(o) => o.id,
            Self::Text(o) => o.id,
            Self::Image(o) => o.id,
        }
    }

    /// The object's discriminant.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Rect(_) => ObjectKind::Rect,
            Self::Text(_) => ObjectKind::Text,
            Self::Image(_) => ObjectKind::Image,
        }
    }

    /// Position and size. For images this is the clip rectangle.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Rect(o) => Bounds::new(o.x, o.y, o.width, o.height),
            Self::Text(o) => Bounds::new(o.x, o.y, o.width, o.height),
            Self::Image(o) => Bounds::new(o.x, o.y, o.width, o.height),
        }
    }

    /// Move and resize. An image's transform is left untouched.
    pub fn set_bounds(&mut self, b: Bounds) {
        let (x, y, width, height) = match self {
            Self::Rect(o) => (&mut o.x, &mut o.y, &mut o.width, &mut o.height),
            Self::Text(o) => (&mut o.x, &mut o.y, &mut o.width, &mut o.height),
            Self::Image(o) => (&mut o.x, &mut o.y, &mut o.width, &mut o.height),
        };
        *x = b.x;
        *y = b.y;
        *width = b.width;
        *height = b.height;
    }

    /// The text variant, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            Self::Text(o) => Some(o),
            _ => None,
        }
    }

    /// The image variant, if this is one.
    #[must_use]
    pub fn as_image(&self) -> Option<&ImageObject> {
        match self {
            Self::Image(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels(w: u32, h: u32) -> Arc<ImageData> {
        Arc::new(ImageData::new(vec![1, 2, 3], ImageFormat::Png, w, h))
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#fff".parse::<Color>().expect("short"), Color::WHITE);
        assert_eq!(
            "#FF8000".parse::<Color>().expect("long"),
            Color::rgb(255, 128, 0)
        );
        let translucent: Color = "#00000080".parse().expect("alpha");
        assert_eq!(translucent.a, 128);
        assert_eq!(translucent.to_string(), "#00000080");
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serde_as_hex() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).expect("serialize");
        assert_eq!(json, "\"#010203\"");
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"xx"), ImageFormat::Unknown);
    }

    #[test]
    fn test_fit_transform_centres_content() {
        let t = ImageTransform::fit(100.0, 50.0, &pixels(200, 200));
        assert!((t.scale - 0.25).abs() < 1e-6);
        assert!((t.offset_x - 25.0).abs() < 1e-6);
        assert!(t.offset_y.abs() < 1e-6);
    }

    #[test]
    fn test_set_bounds_keeps_image_transform() {
        let mut obj = CanvasObject::image(Bounds::new(0.0, 0.0, 100.0, 100.0), pixels(10, 10));
        let before = obj.as_image().expect("image").transform;
        obj.set_bounds(Bounds::new(5.0, 5.0, 10.0, 10.0));
        let image = obj.as_image().expect("image");
        assert_eq!(image.transform, before);
        assert_eq!(obj.bounds(), Bounds::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_object_serde_is_tagged() {
        let obj = CanvasObject::rect(Bounds::new(1.0, 2.0, 3.0, 4.0), Some(Color::BLACK));
        let json = serde_json::to_value(&obj).expect("serialize");
        assert_eq!(json["type"], "rect");
        let back: CanvasObject = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, obj);
    }

    #[test]
    fn test_image_payload_serializes_as_base64() {
        let data = ImageData::new(vec![0, 1, 2], ImageFormat::Png, 1, 1);
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["bytes"], "AAEC");
        assert_eq!(data.data_uri(), "data:image/png;base64,AAEC");
    }
}
