//! The saved-component library.
//!
//! Entries are created from generation results and deleted explicitly.
//! They are never edited: placing one on the canvas deep-copies it.

use crate::error::EditorError;
use wg_core::{ComponentTemplate, ElementId, SavedComponentTemplate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    templates: Vec<SavedComponentTemplate>,
}

impl Library {
    pub fn new(templates: Vec<SavedComponentTemplate>) -> Self {
        Self { templates }
    }

    /// Entries in the order they were saved.
    pub fn templates(&self) -> &[SavedComponentTemplate] {
        &self.templates
    }

    pub fn get(&self, id: ElementId) -> Option<&SavedComponentTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Add a named template. The name must not be blank.
    pub fn save(&mut self, name: &str, template: ComponentTemplate) -> Result<ElementId, EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::validation("Please enter a name for the component."));
        }
        let id = ElementId::fresh("comp", |candidate| self.get(candidate).is_some());
        self.templates.push(SavedComponentTemplate {
            id,
            name: name.to_string(),
            template,
        });
        log::debug!("saved component {id:?} as \"{name}\"");
        Ok(id)
    }

    pub fn delete(&mut self, id: ElementId) -> Result<SavedComponentTemplate, EditorError> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(EditorError::TemplateNotFound(id))?;
        Ok(self.templates.remove(pos))
    }
}
