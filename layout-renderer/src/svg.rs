//! SVG serialisation of scene nodes.
//!
//! Every exporter goes through SVG: the raster and PDF paths hand it to
//! usvg/resvg, the SVG and package exports write it out directly.
//! [`SvgSurface`] is a [`SceneBackend`] that keeps one fragment per node so
//! an on-screen preview can be refreshed from the scene's change log.

use std::collections::HashMap;
use std::fmt::Write;

use layout_core::{
    Bounds, Color, Document, Layer, LayoutView, Node, NodeId, Primitive, SceneBackend,
    SceneChange, SceneGraph, TextStyle,
};

use crate::error::RenderResult;
use crate::fonts::FontContext;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// How image pixels are referenced from the SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRefs {
    /// Inline base64 `data:` URIs.
    Embedded,
    /// Relative `assets/<id>.<ext>` paths, as written into packages.
    Assets,
}

/// Root element geometry.
#[derive(Debug, Clone)]
pub(crate) struct SvgFrame {
    /// Area of the page shown, in document units.
    pub view_box: Bounds,
    /// `width` attribute, with unit suffix when physical.
    pub width: String,
    /// `height` attribute.
    pub height: String,
    /// Fill painted under the content.
    pub background: Option<Color>,
}

/// Escape special XML characters and drop characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Path of an object's image inside a package.
pub(crate) fn asset_path(owner: &str, extension: &str) -> String {
    format!("assets/{owner}.{extension}")
}

/// Presentation attributes shared by every `<text>` of a style.
pub(crate) fn text_attrs(style: &TextStyle, font_size: f32) -> String {
    let mut attrs = format!(
        "font-family=\"{}, sans-serif\" font-size=\"{font_size}\" font-weight=\"{}\" fill=\"{}\"",
        escape_xml(&style.font_family),
        style.font_weight,
        style.color.rgb_hex(),
    );
    if style.color.a < 255 {
        let _ = write!(attrs, " fill-opacity=\"{}\"", style.color.opacity());
    }
    let spacing = layout_core::text::tracking_offset(style, font_size);
    if spacing != 0.0 {
        let _ = write!(attrs, " letter-spacing=\"{spacing}\"");
    }
    attrs
}

fn fill_attrs(color: Color) -> String {
    if color.a == 255 {
        format!("fill=\"{}\"", color.rgb_hex())
    } else {
        format!(
            "fill=\"{}\" fill-opacity=\"{}\"",
            color.rgb_hex(),
            color.opacity()
        )
    }
}

fn node_key(node: &Node) -> String {
    node.owner
        .map_or_else(|| node.id.to_string(), |owner| owner.to_string())
}

/// Append the SVG markup for one node. Invisible nodes write nothing.
pub(crate) fn write_node(out: &mut String, node: &Node, images: ImageRefs) {
    match &node.primitive {
        Primitive::Rect {
            bounds,
            fill: Some(fill),
        } => {
            let _ = write!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}/>",
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                fill_attrs(*fill),
            );
        }
        Primitive::Rect { fill: None, .. } => {}
        Primitive::Outline {
            bounds,
            stroke,
            stroke_width,
            dashed,
        } => {
            let _ = write!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke_width}\"",
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                stroke.rgb_hex(),
            );
            if *dashed {
                let _ = write!(
                    out,
                    " stroke-dasharray=\"{} {}\"",
                    stroke_width * 4.0,
                    stroke_width * 2.0
                );
            }
            out.push_str("/>");
        }
        Primitive::Text {
            bounds,
            layout,
            style,
            ..
        } => {
            if layout.lines.iter().all(|l| l.text.is_empty()) {
                return;
            }
            let _ = write!(out, "<g {}>", text_attrs(style, layout.font_size));
            for line in layout.lines.iter().filter(|l| !l.text.is_empty()) {
                let _ = write!(
                    out,
                    "<text x=\"{}\" y=\"{}\">{}</text>",
                    bounds.x + line.offset_x,
                    bounds.y + line.baseline,
                    escape_xml(&line.text),
                );
            }
            out.push_str("</g>");
        }
        Primitive::Image {
            clip,
            content,
            data,
        } => {
            let key = node_key(node);
            let href = match images {
                ImageRefs::Embedded => data.data_uri(),
                ImageRefs::Assets => asset_path(&key, data.format.extension()),
            };
            let _ = write!(
                out,
                "<clipPath id=\"clip-{key}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
                clip.x, clip.y, clip.width, clip.height,
            );
            let _ = write!(
                out,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\" clip-path=\"url(#clip-{key})\"/>",
                content.x,
                content.y,
                content.width,
                content.height,
                escape_xml(&href),
            );
        }
    }
}

fn open_root(out: &mut String, frame: &SvgFrame) {
    let vb = frame.view_box;
    let _ = write!(
        out,
        "<svg xmlns=\"{SVG_NS}\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">",
        frame.width, frame.height, vb.x, vb.y, vb.width, vb.height,
    );
    if let Some(bg) = frame.background {
        let _ = write!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {}/>",
            vb.x,
            vb.y,
            vb.width,
            vb.height,
            fill_attrs(bg),
        );
    }
}

/// Serialise the content layer of a view.
///
/// With `outline`, every text node is replaced by glyph paths.
pub(crate) fn document_svg(
    view: &LayoutView<'_>,
    frame: &SvgFrame,
    images: ImageRefs,
    outline: Option<&FontContext>,
) -> RenderResult<String> {
    let mut svg = String::with_capacity(4096);
    open_root(&mut svg, frame);

    for node in view.scene.layer(Layer::Content) {
        match (outline, &node.primitive) {
            (Some(fonts), Primitive::Text { text, .. }) => {
                let mut fragment = String::new();
                write_node(&mut fragment, node, images);
                if fragment.is_empty() {
                    continue;
                }
                let prefix = format!("t{}-", node_key(node));
                svg.push_str(&fonts.outline_fragment(&fragment, &prefix, text)?);
            }
            _ => write_node(&mut svg, node, images),
        }
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// A [`SceneBackend`] that mirrors every node as an SVG fragment.
///
/// Unlike the exporters it keeps all layers, so selection handles, the edit
/// surface and the print guides show up in the preview.
#[derive(Debug, Default)]
pub struct SvgSurface {
    fragments: HashMap<NodeId, String>,
    applied: usize,
}

impl SvgSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently mirrored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Total number of changes applied so far.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// The mirrored fragment of a node.
    #[must_use]
    pub fn fragment(&self, id: NodeId) -> Option<&str> {
        self.fragments.get(&id).map(String::as_str)
    }

    /// Assemble the preview over the document's bleed box, in scene order.
    #[must_use]
    pub fn to_svg(&self, scene: &SceneGraph, document: &Document) -> String {
        let frame = SvgFrame {
            view_box: document.bleed_box(),
            width: format!("{}{}", document.bleed_box().width, document.unit().svg_suffix()),
            height: format!("{}{}", document.bleed_box().height, document.unit().svg_suffix()),
            background: Some(Color::WHITE),
        };
        let mut svg = String::with_capacity(4096);
        open_root(&mut svg, &frame);
        for node in scene.nodes() {
            if let Some(fragment) = self.fragments.get(&node.id) {
                svg.push_str(fragment);
            }
        }
        svg.push_str("</svg>");
        svg
    }
}

impl SceneBackend for SvgSurface {
    fn apply(&mut self, scene: &SceneGraph, changes: &[SceneChange]) {
        for change in changes {
            match *change {
                SceneChange::Created(id) | SceneChange::Updated(id) => {
                    if let Some(node) = scene.get(id) {
                        let mut fragment = String::new();
                        write_node(&mut fragment, node, ImageRefs::Embedded);
                        self.fragments.insert(id, fragment);
                    }
                }
                SceneChange::Removed(id) => {
                    self.fragments.remove(&id);
                }
            }
        }
        self.applied += changes.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout_core::{DocumentSpec, Engine, TextStyle};

    fn engine() -> Engine {
        Engine::new(
            Document::new(DocumentSpec {
                width: 100.0,
                height: 50.0,
                bleed: Some(2.0),
                ..DocumentSpec::default()
            })
            .expect("valid"),
        )
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_xml("A < B & \"C\""), "A &lt; B &amp; &quot;C&quot;");
    }

    #[test]
    fn test_escaping_drops_control_characters() {
        assert_eq!(escape_xml("Tab\u{1}bed\u{0}"), "Tabbed");
        assert_eq!(escape_xml("a\tb\nc\u{FFFE}d\u{1F600}"), "a\tb\ncd\u{1F600}");
    }

    #[test]
    fn test_surface_tracks_selection_nodes() {
        let mut engine = engine();
        let id = engine.add_rect(Bounds::new(10.0, 10.0, 20.0, 10.0), Some(Color::BLACK));
        let mut surface = SvgSurface::new();
        engine.flush(&mut surface);
        // Object plus trim and bleed guides.
        assert_eq!(surface.len(), 3);

        engine.select(id);
        engine.flush(&mut surface);
        assert_eq!(surface.len(), 8);

        engine.deselect();
        engine.flush(&mut surface);
        assert_eq!(surface.len(), 3);

        let node = engine.node_for(id).expect("node").id;
        assert!(surface
            .fragment(node)
            .expect("fragment")
            .contains("fill=\"#000000\""));
        let svg = surface.to_svg(engine.scene(), engine.document());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"-2 -2 104 54\""));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_text_fragment_positions_lines() {
        let mut engine = engine();
        let style = TextStyle {
            tracking: 100.0,
            ..TextStyle::default()
        };
        let id = engine.add_text(Bounds::new(5.0, 5.0, 80.0, 20.0), "Fish & Chips", style);
        let node = engine.node_for(id).expect("node");
        let mut out = String::new();
        write_node(&mut out, node, ImageRefs::Embedded);
        assert!(out.contains("Fish &amp; Chips"));
        assert!(out.contains("letter-spacing"));
        assert!(out.contains("<text x=\"5\""));
    }

    #[test]
    fn test_empty_text_writes_nothing() {
        let mut engine = engine();
        let id = engine.add_text(Bounds::new(5.0, 5.0, 80.0, 20.0), "", TextStyle::default());
        let mut out = String::new();
        write_node(&mut out, engine.node_for(id).expect("node"), ImageRefs::Embedded);
        assert!(out.is_empty());
    }
}
