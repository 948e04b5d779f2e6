//! WASM bridge for WebGenius: exposes the editor engine to the builder page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the UI and the
//! model transport; everything stateful lives in [`WebBuilder`]. Structured
//! values cross the boundary as JSON strings, errors as `Error` objects.
//!
//! Generation is split around the page's `fetch`: `begin_generation`
//! returns the prompt to send, `finish_generation` takes the model's raw
//! reply (or `fail_generation` the transport error).

mod console;
mod local_storage;

pub use local_storage::LocalStorage;

use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;
use wg_core::gateway::{
    decode_generate_output, decode_improve_output, generate_prompt, improve_style_prompt,
    validate_improve_output,
};
use wg_core::lint::lint_template;
use wg_core::{
    ComponentTemplate, ElementId, ElementKind, ExportConfig, GatewayError, PropertyKind,
    StyleOverrides,
};
use wg_editor::{Editor, EditorError, GeneratorSession, SceneMutation};

/// The page-facing editor handle.
#[wasm_bindgen]
pub struct WebBuilder {
    editor: Editor<LocalStorage>,
    generator: GeneratorSession,
}

#[wasm_bindgen]
impl WebBuilder {
    /// Load the project from `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console::set_panic_hook();
        init_logging();
        Self {
            editor: Editor::load(LocalStorage::open()),
            generator: GeneratorSession::new(),
        }
    }

    // ─── State ───────────────────────────────────────────────────────────

    /// Placed elements in paint order, storage JSON shape.
    pub fn elements_json(&self) -> String {
        to_json(self.editor.scene().elements(), "[]")
    }

    /// Saved components, storage JSON shape.
    pub fn library_json(&self) -> String {
        to_json(self.editor.library().templates(), "[]")
    }

    pub fn background(&self) -> String {
        self.editor.scene().background().to_string()
    }

    /// Selected element id, or `""`.
    pub fn selected_id(&self) -> String {
        self.editor
            .selected()
            .map(|el| el.id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Select by id; `""` clears the selection.
    pub fn select(&mut self, id: &str) -> Result<(), JsValue> {
        let id = (!id.is_empty()).then(|| ElementId::intern(id));
        self.editor.select(id).map_err(js_error)
    }

    // ─── Scene edits ─────────────────────────────────────────────────────

    /// Add a heading, paragraph, or image. Returns the new id.
    pub fn add_element(&mut self, kind: &str) -> Result<String, JsValue> {
        let kind = parse_element_kind(kind).map_err(js_error)?;
        self.apply_creating(SceneMutation::AddElement { kind })
    }

    /// Place a saved component. Returns the new id.
    pub fn add_component(&mut self, template_id: &str) -> Result<String, JsValue> {
        self.apply_creating(SceneMutation::AddComponent {
            template_id: ElementId::intern(template_id),
        })
    }

    pub fn delete_element(&mut self, id: &str) -> Result<(), JsValue> {
        self.apply(SceneMutation::Delete {
            id: ElementId::intern(id),
        })
    }

    /// Merge a JSON object of camelCase style overrides.
    pub fn update_style(&mut self, id: &str, styles_json: &str) -> Result<(), JsValue> {
        let styles: StyleOverrides = serde_json::from_str(styles_json).map_err(js_error)?;
        self.apply(SceneMutation::UpdateStyle {
            id: ElementId::intern(id),
            styles,
        })
    }

    pub fn update_content(&mut self, id: &str, content: &str) -> Result<(), JsValue> {
        self.apply(SceneMutation::UpdateContent {
            id: ElementId::intern(id),
            content: content.to_string(),
        })
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), JsValue> {
        self.apply(SceneMutation::Rename {
            id: ElementId::intern(id),
            name: name.to_string(),
        })
    }

    /// Edit a component property. `kind` is `text`, `image_url`,
    /// `link_url`, or `color`.
    pub fn update_property(
        &mut self,
        id: &str,
        prop_id: &str,
        kind: &str,
        value: &str,
    ) -> Result<(), JsValue> {
        let prop_kind = parse_property_kind(kind).map_err(js_error)?;
        self.apply(SceneMutation::UpdateProperty {
            id: ElementId::intern(id),
            prop_id: prop_id.to_string(),
            prop_kind,
            value: value.to_string(),
        })
    }

    /// Apply a drag delta.
    pub fn move_element(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.apply(SceneMutation::Move {
            id: ElementId::intern(id),
            dx,
            dy,
        })
    }

    pub fn set_background(&mut self, color: &str) -> Result<(), JsValue> {
        self.apply(SceneMutation::SetBackground {
            color: color.to_string(),
        })
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Start a generation. Returns the prompt for the model.
    pub fn begin_generation(&mut self, description: &str) -> Result<String, JsValue> {
        let request = self.generator.begin(description).map_err(js_error)?;
        Ok(generate_prompt(&request))
    }

    /// Complete the generation with the model's raw reply. Returns the
    /// checked `{ code, properties }` JSON.
    pub fn finish_generation(&mut self, raw_output: &str) -> Result<String, JsValue> {
        let result = self
            .generator
            .finish(decode_generate_output(raw_output))
            .map_err(js_error)?;
        Ok(to_json(&result, "null"))
    }

    /// Complete the generation with a transport failure.
    pub fn fail_generation(&mut self, message: &str) -> Result<(), JsValue> {
        match self
            .generator
            .finish(Err(GatewayError::Transport(message.to_string())))
        {
            Err(EditorError::Gateway(_)) => Ok(()),
            Err(e) => Err(js_error(e)),
            Ok(_) => Ok(()),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generator.is_pending()
    }

    /// Save the generated component under `name`. Returns its library id.
    pub fn save_generated(&mut self, name: &str) -> Result<String, JsValue> {
        self.editor
            .save_generated(&mut self.generator, name)
            .map(|id| id.as_str().to_string())
            .map_err(js_error)
    }

    pub fn delete_saved_component(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor
            .delete_saved_component(ElementId::intern(id))
            .map(|_| ())
            .map_err(js_error)
    }

    // ─── Style suggestions ───────────────────────────────────────────────

    /// Prompt asking the model to restyle a placed component.
    pub fn improve_style_prompt(&self, id: &str, theme: &str) -> Result<String, JsValue> {
        let request = self
            .editor
            .improve_request(ElementId::intern(id), Some(theme))
            .map_err(js_error)?;
        Ok(improve_style_prompt(&request))
    }

    /// Apply the model's restyle reply to the component. Returns the
    /// model's explanation.
    pub fn accept_improved_style(&mut self, id: &str, raw_output: &str) -> Result<String, JsValue> {
        let response = decode_improve_output(raw_output).map_err(js_error)?;
        validate_improve_output(&response).map_err(js_error)?;
        self.apply(SceneMutation::ReplaceComponentCode {
            id: ElementId::intern(id),
            code: response.improved_component_code,
        })?;
        Ok(response.explanation)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Export the page. `config_json` may be `""` or a partial
    /// `{ title, lang, font, fileName }` object.
    pub fn export_html(&self, config_json: &str) -> Result<String, JsValue> {
        let config = parse_export_config(config_json).map_err(js_error)?;
        Ok(self.editor.export(&config))
    }
}

impl Default for WebBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebBuilder {
    fn apply(&mut self, mutation: SceneMutation) -> Result<(), JsValue> {
        self.editor.apply_mutation(mutation).map(|_| ()).map_err(js_error)
    }

    fn apply_creating(&mut self, mutation: SceneMutation) -> Result<String, JsValue> {
        match self.editor.apply_mutation(mutation).map_err(js_error)? {
            Some(id) => Ok(id.as_str().to_string()),
            None => Err(js_error("mutation created no element")),
        }
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Lint a `{ code, properties }` template. Returns a JSON array of findings.
#[wasm_bindgen]
pub fn lint(template_json: &str) -> Result<String, JsValue> {
    let template: ComponentTemplate = serde_json::from_str(template_json).map_err(js_error)?;
    Ok(to_json(&lint_template(&template), "[]"))
}

/// File name the exported page should be downloaded as.
#[wasm_bindgen]
pub fn export_file_name(config_json: &str) -> Result<String, JsValue> {
    let config = parse_export_config(config_json).map_err(js_error)?;
    Ok(config.file_name)
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Send `log` output to the browser console. Later calls are no-ops.
fn init_logging() {
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("console logger already installed");
    }
}

fn js_error(e: impl Display) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serializing for JS: {e}");
        fallback.to_string()
    })
}

fn parse_element_kind(kind: &str) -> Result<ElementKind, String> {
    ElementKind::parse(kind).ok_or_else(|| format!("unknown element kind '{kind}'"))
}

fn parse_property_kind(kind: &str) -> Result<PropertyKind, String> {
    PropertyKind::parse(kind).ok_or_else(|| format!("unknown property kind '{kind}'"))
}

fn parse_export_config(json: &str) -> Result<ExportConfig, String> {
    if json.trim().is_empty() {
        return Ok(ExportConfig::default());
    }
    serde_json::from_str(json).map_err(|e| format!("invalid export config: {e}"))
}
