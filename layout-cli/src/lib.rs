//! # Saorsa Layout CLI
//!
//! Command-line front end for the layout engine.
//!
//! ## Usage
//!
//! ```bash
//! layout presets
//! layout new --preset a5 --out flyer.json
//! layout ingest photo.jpg --into flyer.json
//! layout export flyer.json --format pdf --crop-marks --out flyer.pdf
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved configuration (fonts, style store, log format)
//! - `run` - Executes one command against layout files on disk

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use layout_core::{
    Bounds, Document, DocumentModel, Editor, Engine, EngineConfig, ImageData,
    JsonStyleRepository, LayoutFile, Notice, Notifier, ObjectId,
    PresetCatalog, StyleRepository, TracingNotifier,
};
use layout_renderer::{
    ingest_file, ExportConfig, ExportFormat, ExportOptions, FontConfig, FontContext,
    SceneExporter,
};

/// Command-line arguments for the `layout` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "layout")]
#[command(about = "Print layout documents: presets, ingestion and export")]
#[command(version)]
pub struct CliArgs {
    /// Extra directory scanned for fonts
    #[arg(long, global = true, env = "LAYOUT_FONTS_DIR")]
    pub fonts_dir: Option<PathBuf>,

    /// Do not load the fonts installed on the system
    #[arg(long, global = true)]
    pub no_system_fonts: bool,

    /// JSON file holding named text styles
    #[arg(long, global = true, env = "LAYOUT_STYLES")]
    pub styles: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "LAYOUT_LOG_JSON")]
    pub log_json: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List the built-in document presets
    Presets,

    /// Create an empty layout file from a preset
    New {
        /// Preset id, see `layout presets`
        #[arg(long)]
        preset: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Inspect an image, optionally placing it into a layout
    Ingest {
        /// Image file
        image: PathBuf,
        /// Layout file to add the image to
        #[arg(long)]
        into: Option<PathBuf>,
    },

    /// Export a layout file
    Export {
        /// Layout file
        layout: PathBuf,
        /// png, jpeg, pdf, svg or package
        #[arg(long)]
        format: ExportFormat,
        /// Resolution for raster and PDF output
        #[arg(long)]
        dpi: Option<f32>,
        /// JPEG quality between 0 and 1
        #[arg(long)]
        quality: Option<f32>,
        /// Draw crop marks (PDF)
        #[arg(long)]
        crop_marks: bool,
        /// Convert text to outlines
        #[arg(long)]
        outline: bool,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Manage named text styles
    Style {
        /// Style action
        #[command(subcommand)]
        action: StyleAction,
    },
}

/// Style subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum StyleAction {
    /// List saved style names
    List,
    /// Save the style of a text object under a name
    Save {
        /// Style name
        name: String,
        /// Layout file
        #[arg(long)]
        layout: PathBuf,
        /// Text object id
        #[arg(long)]
        object: String,
    },
    /// Apply a saved style to a text object
    Apply {
        /// Style name
        name: String,
        /// Layout file, rewritten in place
        #[arg(long)]
        layout: PathBuf,
        /// Text object id
        #[arg(long)]
        object: String,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Font sources for measurement, rasterising and outlining.
    pub fonts: FontConfig,
    /// Style store path.
    pub styles: Option<PathBuf>,
    /// Emit JSON logs.
    pub log_json: bool,
    /// Command to run.
    pub command: Commands,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            fonts: FontConfig {
                load_system_fonts: !args.no_system_fonts,
                font_dirs: args.fonts_dir.into_iter().collect(),
                default_family: None,
            },
            styles: args.styles,
            log_json: args.log_json,
            command: args.command,
        }
    }
}

/// Run the configured command, writing human output to `out`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, a layout is
/// invalid or an export fails.
pub fn run(config: &CliConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    match &config.command {
        Commands::Presets => list_presets(out),
        Commands::New { preset, out: path } => new_layout(preset, path.as_deref(), out),
        Commands::Ingest { image, into } => ingest_image(config, image, into.as_deref(), out),
        Commands::Export {
            layout,
            format,
            dpi,
            quality,
            crop_marks,
            outline,
            out: path,
        } => {
            let options = ExportOptions {
                dpi: *dpi,
                quality: *quality,
                crop_marks: *crop_marks,
                outline: *outline,
            };
            export_layout(config, layout, *format, &options, path, out)
        }
        Commands::Style { action } => style(config, action, out),
    }
}

fn list_presets(out: &mut dyn Write) -> anyhow::Result<()> {
    for preset in PresetCatalog::builtin().list() {
        writeln!(
            out,
            "{:<14} {:<16} {} x {} {} (bleed {}, safe {})",
            preset.id,
            preset.name,
            preset.width,
            preset.height,
            preset.unit.svg_suffix(),
            preset.bleed,
            preset.safe
        )?;
    }
    Ok(())
}

fn new_layout(preset: &str, path: Option<&Path>, out: &mut dyn Write) -> anyhow::Result<()> {
    let document = PresetCatalog::builtin().get_by_id(preset)?.document()?;
    let json = LayoutFile::new(DocumentModel::new(document)).to_json()?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Created {} from preset {preset}", path.display());
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

/// Read and validate a layout file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid layout.
pub fn load_layout(path: &Path) -> anyhow::Result<DocumentModel> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    LayoutFile::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn save_layout(path: &Path, engine: &Engine) -> anyhow::Result<()> {
    let json = LayoutFile::new(engine.model().clone()).to_json()?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Frame for a newly placed image: the safe area (or trim) narrowed to the
/// image's aspect ratio, anchored top left.
#[allow(clippy::cast_precision_loss)]
fn placement(document: &Document, data: &ImageData) -> Bounds {
    let area = document.safe_rect().unwrap_or_else(|| document.trim_rect());
    if data.width_px == 0 || data.height_px == 0 {
        return area;
    }
    let aspect = data.height_px as f32 / data.width_px as f32;
    let width = area.width.min(area.height / aspect);
    Bounds::new(area.x, area.y, width, width * aspect)
}

fn ingest_image(
    config: &CliConfig,
    image: &Path,
    into: Option<&Path>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let ingested = ingest_file(image)?;
    let data = &ingested.data;
    writeln!(
        out,
        "{}: {:?} {}x{} px, orientation {}, {}",
        image.display(),
        data.format,
        data.width_px,
        data.height_px,
        ingested
            .orientation
            .map_or_else(|| "none".to_string(), |o| o.to_string()),
        if ingested.normalized {
            "normalised"
        } else {
            "unchanged"
        }
    )?;

    if let Some(layout) = into {
        let (mut engine, _) = open_engine(config, layout)?;
        let bounds = placement(engine.document(), data);
        let id = engine.add_image(bounds, Arc::new(ingested.data));
        save_layout(layout, &engine)?;
        writeln!(out, "placed as {id}")?;
    }
    Ok(())
}

/// Load a layout into an engine measuring text with the configured fonts.
fn open_engine(config: &CliConfig, layout: &Path) -> anyhow::Result<(Engine, FontContext)> {
    let model = load_layout(layout)?;
    let fonts = FontContext::new(&config.fonts);
    let engine = Engine::with_config(model, EngineConfig::default(), Box::new(fonts.measure()));
    Ok((engine, fonts))
}

fn export_layout(
    config: &CliConfig,
    layout: &Path,
    format: ExportFormat,
    options: &ExportOptions,
    path: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let (engine, fonts) = open_engine(config, layout)?;
    let exporter = SceneExporter::with_fonts(
        ExportConfig {
            fonts: config.fonts.clone(),
            ..ExportConfig::default()
        },
        fonts,
    );

    let bytes = match exporter.export(&engine.view(), format, options) {
        Ok(bytes) => bytes,
        Err(e) => {
            TracingNotifier.notify(Notice::error(format!("{format} export failed: {e}")));
            return Err(e.into());
        }
    };
    fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    writeln!(out, "wrote {} ({} bytes)", path.display(), bytes.len())?;
    Ok(())
}

fn style_store(config: &CliConfig) -> anyhow::Result<Box<dyn StyleRepository>> {
    match &config.styles {
        Some(path) => Ok(Box::new(JsonStyleRepository::open(path)?)),
        None => bail!("no style store configured; pass --styles or set LAYOUT_STYLES"),
    }
}

fn style(config: &CliConfig, action: &StyleAction, out: &mut dyn Write) -> anyhow::Result<()> {
    match action {
        StyleAction::List => {
            for name in style_store(config)?.names() {
                writeln!(out, "{name}")?;
            }
        }
        StyleAction::Save {
            name,
            layout,
            object,
        } => {
            let mut editor = open_editor(config, layout)?;
            editor.save_style(name, parse_object(object)?)?;
            writeln!(out, "saved style {name}")?;
        }
        StyleAction::Apply {
            name,
            layout,
            object,
        } => {
            let mut editor = open_editor(config, layout)?;
            if !editor.apply_style(name, parse_object(object)?)? {
                bail!("object {object} is not a text object in {}", layout.display());
            }
            save_layout(layout, editor.engine())?;
            writeln!(out, "applied style {name} to {object}")?;
        }
    }
    Ok(())
}

fn open_editor(config: &CliConfig, layout: &Path) -> anyhow::Result<Editor> {
    let (engine, _) = open_engine(config, layout)?;
    Ok(Editor::new(engine, style_store(config)?))
}

fn parse_object(id: &str) -> anyhow::Result<ObjectId> {
    ObjectId::parse(id).with_context(|| format!("invalid object id {id}"))
}
