//! # Saorsa Layout Renderer
//!
//! Turns a [`layout_core::LayoutView`] into print and screen output. Every
//! format is produced from one SVG serialisation of the scene's content
//! layer.
//!
//! ## Export Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         Scene graph (content layer)         │
//! ├─────────────────────────────────────────────┤
//! │      SVG serialisation (+ text outlining)   │
//! ├──────────────┬──────────────┬───────────────┤
//! │ resvg/skia   │ resvg→PDF    │ SVG / zip     │
//! │ PNG, JPEG    │ crop marks   │ package       │
//! └──────────────┴──────────────┴───────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod fonts;
pub mod ingest;
pub mod svg;

pub use error::{RenderError, RenderResult};
pub use export::{
    jpeg_quality, ExportConfig, ExportFormat, ExportOptions, PdfOptions, RasterFormat,
    RasterOptions, SceneExporter, VectorOptions, DEFAULT_JPEG_QUALITY, DPI_RANGE,
};
pub use fonts::{FontConfig, FontContext, FontMeasure};
pub use ingest::{ingest, ingest_file, IngestedImage};
pub use svg::{ImageRefs, SvgSurface};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
