//! The editor: authoritative scene, library, and selection, persisted after
//! every change.
//!
//! All canvas edits go through [`Editor::apply_mutation`]. Each mutation
//! replaces the scene snapshot and writes the affected storage entry
//! synchronously; a failed mutation leaves both untouched.

use crate::error::EditorError;
use crate::generator::GeneratorSession;
use crate::library::Library;
use wg_core::gateway::{ImproveStyleRequest, ImproveStyleResponse, validate_improve_output};
use wg_core::storage::{self, KeyValueStore};
use wg_core::{
    BindingError, ComponentGateway, ElementDefaults, ElementId, ElementKind, ExportConfig,
    PropertyKind, SavedComponentTemplate, Scene, SceneElement, StyleOverrides,
};

/// A single canvas edit.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    AddElement {
        kind: ElementKind,
    },
    /// Place a library template on the canvas.
    AddComponent {
        template_id: ElementId,
    },
    Delete {
        id: ElementId,
    },
    /// Shallow-merge style overrides.
    UpdateStyle {
        id: ElementId,
        styles: StyleOverrides,
    },
    /// Text or URL of a basic element.
    UpdateContent {
        id: ElementId,
        content: String,
    },
    Rename {
        id: ElementId,
        name: String,
    },
    UpdateProperty {
        id: ElementId,
        prop_id: String,
        prop_kind: PropertyKind,
        value: String,
    },
    /// Drag delta.
    Move {
        id: ElementId,
        dx: f64,
        dy: f64,
    },
    /// Replace a component's markup, keeping its properties.
    ReplaceComponentCode {
        id: ElementId,
        code: String,
    },
    SetBackground {
        color: String,
    },
}

pub struct Editor<S: KeyValueStore> {
    scene: Scene,
    library: Library,
    selected: Option<ElementId>,
    defaults: ElementDefaults,
    store: S,
}

impl<S: KeyValueStore> Editor<S> {
    /// Rehydrate from `store`. Malformed entries fall back to defaults.
    pub fn load(store: S) -> Self {
        let state = storage::load_state(&store);
        Self {
            scene: state.scene,
            library: Library::new(state.library),
            selected: None,
            defaults: ElementDefaults::default(),
            store,
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: ElementDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn element(&self, id: ElementId) -> Option<&SceneElement> {
        self.scene.get(id).map(|el| &**el)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an element, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), EditorError> {
        if let Some(id) = id
            && !self.scene.contains(id)
        {
            return Err(EditorError::ElementNotFound(id));
        }
        self.selected = id;
        Ok(())
    }

    pub fn selected(&self) -> Option<&SceneElement> {
        self.selected.and_then(|id| self.element(id))
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation and persist. Returns the id of a newly created
    /// element, if the mutation created one.
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> Result<Option<ElementId>, EditorError> {
        log::debug!("apply {mutation:?}");
        let mut created = None;
        let scene = match mutation {
            SceneMutation::AddElement { kind } => {
                let (scene, id) = self.scene.add_basic_element(kind, &self.defaults)?;
                created = Some(id);
                scene
            }
            SceneMutation::AddComponent { template_id } => {
                let template = self
                    .library
                    .get(template_id)
                    .ok_or(EditorError::TemplateNotFound(template_id))?;
                let (scene, id) = self.scene.instantiate_template(template, &self.defaults);
                created = Some(id);
                scene
            }
            SceneMutation::Delete { id } => {
                let scene = self.scene.delete_element(id)?;
                if self.selected == Some(id) {
                    self.selected = None;
                }
                scene
            }
            SceneMutation::UpdateStyle { id, styles } => self.scene.update_style(id, &styles)?,
            SceneMutation::UpdateContent { id, content } => self.scene.update_content(id, &content)?,
            SceneMutation::Rename { id, name } => self.scene.rename(id, &name)?,
            SceneMutation::UpdateProperty {
                id,
                prop_id,
                prop_kind,
                value,
            } => match self.scene.update_property(id, &prop_id, prop_kind, &value) {
                Ok(scene) => scene,
                Err(e) => {
                    let e = EditorError::from(e);
                    if let EditorError::Binding(BindingError::PropertyNotFound { .. }) = &e {
                        log::warn!("edit on {id:?} dropped: {e}");
                    }
                    return Err(e);
                }
            },
            SceneMutation::Move { id, dx, dy } => self.scene.reposition(id, dx, dy)?,
            SceneMutation::ReplaceComponentCode { id, code } => {
                self.scene.replace_component_code(id, &code)?
            }
            SceneMutation::SetBackground { color } => {
                self.scene = self.scene.set_background(&color);
                self.persist_background();
                return Ok(None);
            }
        };

        self.scene = scene;
        self.persist_elements();
        Ok(created)
    }

    // ─── Library ─────────────────────────────────────────────────────────

    /// Save the session's generated component under `name`.
    pub fn save_generated(
        &mut self,
        session: &mut GeneratorSession,
        name: &str,
    ) -> Result<ElementId, EditorError> {
        let template = session.savable()?.clone();
        let id = self.library.save(name, template)?;
        session.mark_saved();
        self.persist_library();
        Ok(id)
    }

    pub fn delete_saved_component(&mut self, id: ElementId) -> Result<SavedComponentTemplate, EditorError> {
        let removed = self.library.delete(id)?;
        self.persist_library();
        Ok(removed)
    }

    // ─── Style improvement ───────────────────────────────────────────────

    /// Build the improve-style request for a component instance.
    pub fn improve_request(
        &self,
        id: ElementId,
        theme_description: Option<&str>,
    ) -> Result<ImproveStyleRequest, EditorError> {
        let el = self.element(id).ok_or(EditorError::ElementNotFound(id))?;
        if el.kind != ElementKind::Component {
            return Err(BindingError::NotAComponent(id).into());
        }
        Ok(ImproveStyleRequest {
            component_code: el.content.clone(),
            theme_description: theme_description
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        })
    }

    /// Ask the gateway for a restyled version of a component. Nothing is
    /// applied; pass the code to [`SceneMutation::ReplaceComponentCode`]
    /// to accept it.
    pub fn suggest_style<G: ComponentGateway + ?Sized>(
        &self,
        gateway: &G,
        id: ElementId,
        theme_description: Option<&str>,
    ) -> Result<ImproveStyleResponse, EditorError> {
        let request = self.improve_request(id, theme_description)?;
        let response = gateway.improve_style(&request)?;
        validate_improve_output(&response)?;
        Ok(response)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    pub fn export(&self, config: &ExportConfig) -> String {
        wg_core::export_static_document(&self.scene, config)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    fn persist_elements(&mut self) {
        if let Err(e) = storage::save_elements(&mut self.store, &self.scene) {
            log::error!("persisting elements: {e}");
        }
    }

    fn persist_library(&mut self) {
        if let Err(e) = storage::save_library(&mut self.store, self.library.templates()) {
            log::error!("persisting library: {e}");
        }
    }

    fn persist_background(&mut self) {
        if let Err(e) = storage::save_background(&mut self.store, self.scene.background()) {
            log::error!("persisting background: {e}");
        }
    }
}
