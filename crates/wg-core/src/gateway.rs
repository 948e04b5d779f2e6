//! AI gateway contracts: request/response shapes, prompt text, and the
//! decoding and validation applied to raw model output.
//!
//! Transport is not modeled here. A [`ComponentGateway`] implementation
//! sends the prompt wherever it likes (HTTP, a JS `fetch` callback, a test
//! double) and hands back the raw text; [`decode_generate_output`] and
//! [`decode_improve_output`] turn it into checked values.

use crate::error::{GatewayError, ValidationError};
use crate::lint::{LintSeverity, lint_template};
use crate::model::ComponentTemplate;
use crate::style::{count_style_fragments, find_ascii_ci};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const GENERATE_PROMPT: &str = include_str!("prompts/generate.txt");
const IMPROVE_STYLE_PROMPT: &str = include_str!("prompts/improve_style.txt");

// ─── Contracts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub description: String,
}

impl GenerateRequest {
    /// Reject empty or whitespace-only descriptions.
    pub fn new(description: &str) -> Result<Self, ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError("Please enter a description for the component.".into()));
        }
        Ok(Self {
            description: description.to_string(),
        })
    }
}

/// Generation output: `{ code, properties }`.
pub type GenerateResponse = ComponentTemplate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveStyleRequest {
    pub component_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveStyleResponse {
    pub improved_component_code: String,
    pub explanation: String,
}

/// The invocation seam for both generation operations.
pub trait ComponentGateway {
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GatewayError>;

    fn improve_style(
        &self,
        request: &ImproveStyleRequest,
    ) -> Result<ImproveStyleResponse, GatewayError>;
}

// ─── Prompts ─────────────────────────────────────────────────────────────

/// Instruction text for a generate call.
pub fn generate_prompt(request: &GenerateRequest) -> String {
    GENERATE_PROMPT.replace("{{{description}}}", &request.description)
}

/// Instruction text for an improve-style call.
pub fn improve_style_prompt(request: &ImproveStyleRequest) -> String {
    IMPROVE_STYLE_PROMPT
        .replace("{{{componentCode}}}", &request.component_code)
        .replace(
            "{{{themeDescription}}}",
            request.theme_description.as_deref().unwrap_or(""),
        )
}

// ─── Decoding ────────────────────────────────────────────────────────────

/// Parse and validate raw generate output.
pub fn decode_generate_output(raw: &str) -> Result<GenerateResponse, GatewayError> {
    let response: GenerateResponse =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| GatewayError::Decode(e.to_string()))?;
    validate_generate_output(&response)?;
    Ok(response)
}

/// Parse and validate raw improve-style output.
pub fn decode_improve_output(raw: &str) -> Result<ImproveStyleResponse, GatewayError> {
    let response: ImproveStyleResponse =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| GatewayError::Decode(e.to_string()))?;
    validate_improve_output(&response)?;
    Ok(response)
}

/// Reject generate output that breaks the binding or export contract.
/// Softer findings are logged and let through.
pub fn validate_generate_output(response: &GenerateResponse) -> Result<(), GatewayError> {
    let code = &response.base_code;
    if code.trim().is_empty() {
        return Err(GatewayError::InvalidResponse("empty component code".into()));
    }
    let fragments = count_style_fragments(code);
    if fragments > 1 {
        return Err(GatewayError::InvalidResponse(format!(
            "{fragments} style blocks; at most one is allowed"
        )));
    }
    if find_ascii_ci(code, "<script").is_some() {
        return Err(GatewayError::InvalidResponse("component contains a <script> tag".into()));
    }

    let mut seen = HashSet::new();
    for prop in &response.properties {
        if !seen.insert((prop.id.as_str(), prop.kind)) {
            return Err(GatewayError::InvalidResponse(format!(
                "duplicate property '{}' of kind {}",
                prop.id, prop.kind
            )));
        }
    }

    for diag in lint_template(response) {
        match diag.severity {
            LintSeverity::Warning => log::warn!("generated template [{}]: {}", diag.rule, diag.message),
            LintSeverity::Info => log::debug!("generated template [{}]: {}", diag.rule, diag.message),
        }
    }
    Ok(())
}

/// Improved code must stay inline-styled: no style blocks, no scripts.
pub fn validate_improve_output(response: &ImproveStyleResponse) -> Result<(), GatewayError> {
    let code = &response.improved_component_code;
    if code.trim().is_empty() {
        return Err(GatewayError::InvalidResponse("empty improved code".into()));
    }
    if find_ascii_ci(code, "<style").is_some() {
        return Err(GatewayError::InvalidResponse("improved code contains a <style> block".into()));
    }
    if find_ascii_ci(code, "<script").is_some() {
        return Err(GatewayError::InvalidResponse("improved code contains a <script> tag".into()));
    }
    Ok(())
}

/// Drop a surrounding markdown fence (```` ```json ... ``` ````) if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyKind;

    const NAVBAR_OUTPUT: &str = r##"{
      "code": "<style>.navbar-f4j7 { display: flex; } .nav-link-a9b1:hover { color: var(--link-hover-color-p5q8); } .navbar-f4j7 { --link-hover-color-p5q8: #007bff; }</style><nav class=\"navbar-f4j7\"><a href=\"#\" data-id=\"logo-g8h2\">Logo</a></nav>",
      "properties": [
        { "id": "logo-g8h2", "label": "Logo Text", "type": "text", "value": "Logo" },
        { "id": "logo-g8h2", "label": "Logo Link", "type": "link_url", "value": "#" },
        { "id": "--link-hover-color-p5q8", "label": "Link Hover Color", "type": "color", "value": "#007bff" }
      ]
    }"##;

    #[test]
    fn empty_description_is_rejected() {
        assert!(GenerateRequest::new("   \n").is_err());
        assert_eq!(
            GenerateRequest::new("a pricing card").unwrap().description,
            "a pricing card"
        );
    }

    #[test]
    fn prompts_substitute_inputs() {
        let req = GenerateRequest::new("a hero section").unwrap();
        let prompt = generate_prompt(&req);
        assert!(prompt.contains("\"a hero section\""));
        assert!(!prompt.contains("{{{"));

        let improve = ImproveStyleRequest {
            component_code: "<div>x</div>".into(),
            theme_description: None,
        };
        let prompt = improve_style_prompt(&improve);
        assert!(prompt.contains("```\n<div>x</div>\n```"));
        assert!(!prompt.contains("{{{themeDescription}}}"));
    }

    #[test]
    fn decodes_plain_and_fenced_output() {
        let plain = decode_generate_output(NAVBAR_OUTPUT).unwrap();
        assert_eq!(plain.properties.len(), 3);
        assert_eq!(plain.properties[1].kind, PropertyKind::LinkUrl);

        let fenced = format!("```json\n{NAVBAR_OUTPUT}\n```");
        assert_eq!(decode_generate_output(&fenced).unwrap(), plain);
    }

    #[test]
    fn schema_mismatch_is_a_decode_error() {
        let err = decode_generate_output(r#"{"code": "<p></p>"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
        let err = decode_generate_output("Sure! Here is your component.").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn contract_violations_are_rejected() {
        let scripted = r#"{"code": "<p>x</p><SCRIPT>alert(1)</SCRIPT>", "properties": []}"#;
        assert!(matches!(
            decode_generate_output(scripted),
            Err(GatewayError::InvalidResponse(_))
        ));

        let two_styles = r#"{"code": "<style>a{}</style><style>b{}</style>", "properties": []}"#;
        assert!(matches!(
            decode_generate_output(two_styles),
            Err(GatewayError::InvalidResponse(_))
        ));

        let dup = r#"{"code": "<p data-id=\"a\">x</p>", "properties": [
            {"id":"a","label":"A","type":"text","value":"x"},
            {"id":"a","label":"A again","type":"text","value":"x"}]}"#;
        assert!(matches!(
            decode_generate_output(dup),
            Err(GatewayError::InvalidResponse(_))
        ));

        let empty = r#"{"code": "  ", "properties": []}"#;
        assert!(matches!(
            decode_generate_output(empty),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn improve_output_must_be_inline_styled() {
        let ok = r#"{"improvedComponentCode": "<div style=\"padding: 1rem\">x</div>", "explanation": "More padding."}"#;
        let response = decode_improve_output(ok).unwrap();
        assert_eq!(response.explanation, "More padding.");

        let styled = r#"{"improvedComponentCode": "<style>p{}</style><p>x</p>", "explanation": ""}"#;
        assert!(matches!(
            decode_improve_output(styled),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn improve_request_wire_shape() {
        let req = ImproveStyleRequest {
            component_code: "<p>x</p>".into(),
            theme_description: Some("dark, neon".into()),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["componentCode"], "<p>x</p>");
        assert_eq!(v["themeDescription"], "dark, neon");
    }
}
