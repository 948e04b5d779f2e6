//! Lint diagnostics for component templates.
//!
//! Checks that the property schema and the markup agree. Reports only;
//! nothing here modifies a template. Generated templates are linted before
//! they are offered for saving, and `webgenius lint` runs the same rules.

use crate::binding::MARKER_ATTR;
use crate::markup::Fragment;
use crate::model::{ComponentTemplate, PropertyKind};
use crate::style::{count_style_fragments, extract_style_text, find_ascii_ci, find_declaration};
use serde::Serialize;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely broken: an edit will not show up, or export will misbehave.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintDiagnostic {
    /// The property this refers to, if any.
    pub property_id: Option<String>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "missing-marker").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over a template.
#[must_use]
pub fn lint_template(template: &ComponentTemplate) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_style_fragments(template, &mut diags);
    lint_script_tags(template, &mut diags);
    lint_duplicate_properties(template, &mut diags);
    lint_markers(template, &mut diags);
    lint_custom_properties(template, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_style_fragments(template: &ComponentTemplate, diags: &mut Vec<LintDiagnostic>) {
    let count = count_style_fragments(&template.base_code);
    if count > 1 {
        diags.push(LintDiagnostic {
            property_id: None,
            message: format!(
                "{count} <style> blocks; only the first is kept when rendering and exporting."
            ),
            severity: LintSeverity::Warning,
            rule: "multiple-style-fragments",
        });
    }
}

fn lint_script_tags(template: &ComponentTemplate, diags: &mut Vec<LintDiagnostic>) {
    if find_ascii_ci(&template.base_code, "<script").is_some() {
        diags.push(LintDiagnostic {
            property_id: None,
            message: "Templates must not contain <script> tags.".to_string(),
            severity: LintSeverity::Warning,
            rule: "script-tag",
        });
    }
}

fn lint_duplicate_properties(template: &ComponentTemplate, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for prop in &template.properties {
        if !seen.insert((prop.id.as_str(), prop.kind)) {
            diags.push(LintDiagnostic {
                property_id: Some(prop.id.clone()),
                message: format!(
                    "Property `{}` of kind {} is declared more than once; edits reach only the first.",
                    prop.id, prop.kind
                ),
                severity: LintSeverity::Warning,
                rule: "duplicate-property",
            });
        }
    }
}

/// Every content property needs a `data-id` marker to bind to.
fn lint_markers(template: &ComponentTemplate, diags: &mut Vec<LintDiagnostic>) {
    let frag = Fragment::parse(&template.base_code);
    for prop in &template.properties {
        let tag = match prop.kind {
            PropertyKind::Color => continue,
            PropertyKind::Text => None,
            PropertyKind::ImageUrl => Some("img"),
            PropertyKind::LinkUrl => Some("a"),
        };
        let nodes = frag.find_by_attr(MARKER_ATTR, &prop.id);
        if nodes.is_empty() {
            diags.push(LintDiagnostic {
                property_id: Some(prop.id.clone()),
                message: format!("No element carries data-id=\"{}\".", prop.id),
                severity: LintSeverity::Warning,
                rule: "missing-marker",
            });
        } else if let Some(tag) = tag
            && !nodes.iter().any(|&n| frag.tag_name(n) == Some(tag))
        {
            diags.push(LintDiagnostic {
                property_id: Some(prop.id.clone()),
                message: format!(
                    "data-id=\"{}\" is never on an <{tag}>, so this {} property has no effect.",
                    prop.id, prop.kind
                ),
                severity: LintSeverity::Info,
                rule: "missing-marker",
            });
        }
    }
}

/// Color ids must be custom-property names declared in the style fragment.
fn lint_custom_properties(template: &ComponentTemplate, diags: &mut Vec<LintDiagnostic>) {
    let style = extract_style_text(&template.base_code).unwrap_or("");
    for prop in template.properties.iter().filter(|p| p.kind == PropertyKind::Color) {
        if !prop.id.starts_with("--") {
            diags.push(LintDiagnostic {
                property_id: Some(prop.id.clone()),
                message: format!(
                    "Color property `{}` should be a CSS custom property name like `--accent-color`.",
                    prop.id
                ),
                severity: LintSeverity::Warning,
                rule: "color-id-format",
            });
            continue;
        }
        let declaration = format!("{}: {}", prop.id, prop.value);
        if find_declaration(style, &prop.id, &prop.value).is_none() {
            let message = if style.contains(&format!("{}:", prop.id)) {
                format!(
                    "`{}` is declared, but not as `{declaration}`; color edits will not apply.",
                    prop.id
                )
            } else {
                format!("`{}` is not declared in the template's <style> block.", prop.id)
            };
            diags.push(LintDiagnostic {
                property_id: Some(prop.id.clone()),
                message,
                severity: LintSeverity::Warning,
                rule: "missing-custom-property",
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Property;

    fn rules(template: &ComponentTemplate) -> Vec<&'static str> {
        lint_template(template).into_iter().map(|d| d.rule).collect()
    }

    #[test]
    fn clean_template_has_no_findings() {
        let template = ComponentTemplate::new(
            "<style>.c { --accent-x1: #111111; }</style><a data-id=\"b1\" href=\"#\">Go</a>",
            vec![
                Property::new("b1", "Button", PropertyKind::Text, "Go"),
                Property::new("b1", "Button Link", PropertyKind::LinkUrl, "#"),
                Property::new("--accent-x1", "Accent", PropertyKind::Color, "#111111"),
            ],
        );
        assert!(lint_template(&template).is_empty());
    }

    #[test]
    fn missing_marker_and_wrong_tag() {
        let template = ComponentTemplate::new(
            "<span data-id=\"pic\">x</span>",
            vec![
                Property::new("ghost", "Ghost", PropertyKind::Text, ""),
                Property::new("pic", "Picture", PropertyKind::ImageUrl, "a.png"),
            ],
        );
        let diags = lint_template(&template);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].severity, LintSeverity::Warning);
        assert_eq!(diags[1].severity, LintSeverity::Info);
        assert!(diags.iter().all(|d| d.rule == "missing-marker"));
    }

    #[test]
    fn color_rules() {
        let template = ComponentTemplate::new(
            "<style>.c { --a: #fff; --b:#000; }</style><p>x</p>",
            vec![
                Property::new("--a", "A", PropertyKind::Color, "#fff"),
                Property::new("--b", "B", PropertyKind::Color, "#000"),
                Property::new("--c", "C", PropertyKind::Color, "#123"),
                Property::new("accent", "D", PropertyKind::Color, "#123"),
            ],
        );
        assert_eq!(
            rules(&template),
            vec!["missing-custom-property", "missing-custom-property", "color-id-format"]
        );
    }

    #[test]
    fn structural_rules() {
        let template = ComponentTemplate::new(
            "<style>a{}</style><style>b{}</style><p data-id=\"p\">x</p><script>1</script>",
            vec![
                Property::new("p", "P", PropertyKind::Text, "x"),
                Property::new("p", "P again", PropertyKind::Text, "x"),
            ],
        );
        assert_eq!(
            rules(&template),
            vec!["multiple-style-fragments", "script-tag", "duplicate-property"]
        );
    }
}
