//! Export: Scene → one self-contained static HTML document.
//!
//! Every element becomes an absolutely positioned wrapper inside a single
//! `.canvas-container`. Component style fragments are hoisted into the
//! document's top-level `<style>`, in scene order, without deduplication:
//! class-name uniqueness is part of the generator's output contract.

use crate::config::{ExportConfig, FONT_STYLESHEET};
use crate::markup::escape_attr;
use crate::model::{ElementKind, SceneElement};
use crate::scene::Scene;
use crate::style::{extract_style_text, inline_css, strip_style_fragment};
use std::fmt::Write;

/// Serialize the scene as a complete HTML document.
#[must_use]
pub fn export_static_document(scene: &Scene, config: &ExportConfig) -> String {
    let style_blocks = collect_style_blocks(scene);
    let body = scene
        .elements()
        .iter()
        .map(|el| wrap_element(el))
        .collect::<Vec<_>>()
        .join("\n    ");

    let mut out = String::with_capacity(1024 + style_blocks.len() + body.len());
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"{}\">", escape_attr(&config.lang));
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "  <meta charset=\"UTF-8\">");
    let _ = writeln!(
        out,
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    );
    let _ = writeln!(out, "  <title>{}</title>", escape_text(&config.title));
    let _ = writeln!(out, "  <link rel=\"preconnect\" href=\"https://fonts.googleapis.com\" />");
    let _ = writeln!(out, "  <link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" />");
    let _ = writeln!(out, "  <link href=\"{FONT_STYLESHEET}\" rel=\"stylesheet\" />");
    let _ = writeln!(out, "  <style>");
    let _ = writeln!(out, "    body {{");
    let _ = writeln!(out, "      font-family: {};", config.font.css_family());
    let _ = writeln!(out, "      background-color: {};", scene.background());
    let _ = writeln!(out, "      margin: 0;");
    let _ = writeln!(out, "      padding: 0;");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "    .canvas-container {{");
    let _ = writeln!(out, "      position: relative;");
    let _ = writeln!(out, "      width: 100%;");
    let _ = writeln!(out, "      min-height: 100vh;");
    let _ = writeln!(out, "      overflow: hidden;");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "    {style_blocks}");
    let _ = writeln!(out, "  </style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "  <div class=\"canvas-container\">");
    let _ = writeln!(out, "    {body}");
    let _ = writeln!(out, "  </div>");
    let _ = writeln!(out, "</body>");
    let _ = write!(out, "</html>");

    log::debug!(
        "exported {} elements ({} bytes)",
        scene.len(),
        out.len()
    );
    out.trim().to_string()
}

/// Inner text of every component's style fragment, joined with newlines.
fn collect_style_blocks(scene: &Scene) -> String {
    scene
        .elements()
        .iter()
        .filter(|el| el.kind == ElementKind::Component)
        .filter_map(|el| extract_style_text(&el.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inline style of an element's positioned wrapper.
fn wrapper_style(el: &SceneElement) -> String {
    format!(
        "position: absolute; top: {}px; left: {}px; {}",
        format_num(el.position.y),
        format_num(el.position.x),
        inline_css(&el.styles)
    )
}

fn wrap_element(el: &SceneElement) -> String {
    let style = escape_attr(&wrapper_style(el));
    let content = strip_style_fragment(&el.content);
    match el.kind {
        ElementKind::Heading => format!("<h2 style=\"{style}\">{content}</h2>"),
        ElementKind::Paragraph => format!("<p style=\"{style}\">{content}</p>"),
        ElementKind::Image => format!(
            "<img src=\"{}\" style=\"{style}\" alt=\"User content\" />",
            escape_attr(&content)
        ),
        ElementKind::Component => format!("<div style=\"{style}\">{}</div>", content.trim()),
    }
}

/// `10.0` → `10`, `10.5` → `10.5`, `-0.0` → `0`.
fn format_num(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;")
}
