//! Immutable scene snapshots.
//!
//! Every operation returns a new `Scene` whose element array shares all
//! untouched elements with the old one. Elements are never mutated in place,
//! so `Arc::ptr_eq` on an element tells a renderer whether it changed.

use crate::binding::apply_property_edit;
use crate::config::ElementDefaults;
use crate::error::{BindingError, SceneError};
use crate::id::ElementId;
use crate::model::{ElementKind, PropertyKind, SavedComponentTemplate, SceneElement, StyleOverrides};
use std::sync::Arc;

/// Canvas background used when nothing has been stored.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Placed elements in paint order plus the canvas background color.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    elements: Arc<[Arc<SceneElement>]>,
    background: String,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_BACKGROUND)
    }
}

impl Scene {
    pub fn new(elements: Vec<SceneElement>, background: impl Into<String>) -> Self {
        Self {
            elements: elements.into_iter().map(Arc::new).collect(),
            background: background.into(),
        }
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[Arc<SceneElement>] {
        &self.elements
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Arc<SceneElement>> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    // ─── Operations ──────────────────────────────────────────────────────

    /// Append a heading, paragraph, or image with default content.
    pub fn add_basic_element(
        &self,
        kind: ElementKind,
        defaults: &ElementDefaults,
    ) -> Result<(Scene, ElementId), SceneError> {
        let (content, styles) = match kind {
            ElementKind::Heading => (defaults.heading_text.clone(), StyleOverrides::new()),
            ElementKind::Paragraph => (defaults.paragraph_text.clone(), StyleOverrides::new()),
            ElementKind::Image => (defaults.image_url.clone(), defaults.image_styles()),
            ElementKind::Component => return Err(SceneError::NotBasicKind(kind)),
        };
        let id = self.fresh_id(kind);
        let mut el = SceneElement::new(id, kind, content);
        el.styles = styles;
        el.position = defaults.position;
        Ok((self.appended(el), id))
    }

    /// Append a component instance of a library template.
    pub fn instantiate_template(
        &self,
        saved: &SavedComponentTemplate,
        defaults: &ElementDefaults,
    ) -> (Scene, ElementId) {
        let id = self.fresh_id(ElementKind::Component);
        let mut el = SceneElement::from_template(id, saved);
        el.position = defaults.position;
        (self.appended(el), id)
    }

    pub fn delete_element(&self, id: ElementId) -> Result<Scene, SceneError> {
        if !self.contains(id) {
            return Err(SceneError::ElementNotFound(id));
        }
        Ok(Scene {
            elements: self.elements.iter().filter(|el| el.id != id).cloned().collect(),
            background: self.background.clone(),
        })
    }

    /// Shallow-merge `partial` into the element's style overrides.
    pub fn update_style(&self, id: ElementId, partial: &StyleOverrides) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            Ok(SceneElement {
                styles: el.styles.merged(partial),
                ..el.clone()
            })
        })
    }

    /// Set the literal text or URL of a basic element.
    pub fn update_content(&self, id: ElementId, content: &str) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            if !el.kind.is_basic() {
                return Err(SceneError::ContentOnComponent(id));
            }
            Ok(SceneElement {
                content: content.to_string(),
                ..el.clone()
            })
        })
    }

    pub fn rename(&self, id: ElementId, name: &str) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            Ok(SceneElement {
                name: Some(name.to_string()),
                ..el.clone()
            })
        })
    }

    /// Edit one property of a component instance and re-render it.
    pub fn update_property(
        &self,
        id: ElementId,
        prop_id: &str,
        prop_kind: PropertyKind,
        value: &str,
    ) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            let (base_code, properties) = el
                .component_parts()
                .ok_or(BindingError::NotAComponent(id))?;
            let edit = apply_property_edit(base_code, properties, prop_id, prop_kind, value)?;
            Ok(SceneElement {
                content: edit.rendered,
                base_code: Some(edit.base_code),
                properties: Some(edit.properties),
                ..el.clone()
            })
        })
    }

    /// Swap a component's base code (e.g. an accepted restyle) and re-render
    /// it with the instance's current property values.
    pub fn replace_component_code(&self, id: ElementId, code: &str) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            let (_, properties) = el
                .component_parts()
                .ok_or(BindingError::NotAComponent(id))?;
            Ok(SceneElement {
                content: crate::binding::render(code, properties),
                base_code: Some(code.to_string()),
                ..el.clone()
            })
        })
    }

    /// Move an element by a drag delta.
    pub fn reposition(&self, id: ElementId, dx: f64, dy: f64) -> Result<Scene, SceneError> {
        self.replace_with(id, |el| {
            Ok(SceneElement {
                position: el.position.offset(dx, dy),
                ..el.clone()
            })
        })
    }

    pub fn set_background(&self, color: &str) -> Scene {
        Scene {
            elements: Arc::clone(&self.elements),
            background: color.to_string(),
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn fresh_id(&self, kind: ElementKind) -> ElementId {
        ElementId::fresh(kind.as_str(), |candidate| self.contains(candidate))
    }

    fn appended(&self, el: SceneElement) -> Scene {
        let mut elements: Vec<Arc<SceneElement>> = self.elements.to_vec();
        elements.push(Arc::new(el));
        Scene {
            elements: elements.into(),
            background: self.background.clone(),
        }
    }

    /// Copy the element array, swapping in `f(element)` for `id`.
    fn replace_with(
        &self,
        id: ElementId,
        f: impl FnOnce(&SceneElement) -> Result<SceneElement, SceneError>,
    ) -> Result<Scene, SceneError> {
        let pos = self
            .elements
            .iter()
            .position(|el| el.id == id)
            .ok_or(SceneError::ElementNotFound(id))?;
        let replacement = Arc::new(f(&self.elements[pos])?);
        let elements: Arc<[Arc<SceneElement>]> = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, el)| {
                if i == pos {
                    Arc::clone(&replacement)
                } else {
                    Arc::clone(el)
                }
            })
            .collect();
        Ok(Scene {
            elements,
            background: self.background.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentTemplate, Position, Property};

    fn saved_hero() -> SavedComponentTemplate {
        SavedComponentTemplate {
            id: ElementId::intern("comp-hero"),
            name: "Hero".into(),
            template: ComponentTemplate::new(
                "<h1 data-id=\"h1x\">Welcome</h1>",
                vec![Property::new("h1x", "Headline", PropertyKind::Text, "Welcome")],
            ),
        }
    }

    #[test]
    fn add_basic_elements_use_defaults() {
        let defaults = ElementDefaults::default();
        let (scene, heading) = Scene::default()
            .add_basic_element(ElementKind::Heading, &defaults)
            .unwrap();
        let (scene, image) = scene.add_basic_element(ElementKind::Image, &defaults).unwrap();

        let h = scene.get(heading).unwrap();
        assert_eq!(h.content, "Headline Text");
        assert_eq!(h.position, Position::new(50.0, 50.0));

        let img = scene.get(image).unwrap();
        assert_eq!(img.content, "https://placehold.co/600x400.png");
        assert_eq!(img.styles.get("width"), Some("300px"));
        assert_eq!(img.styles.get("height"), Some("200px"));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.background(), "#FFFFFF");
    }

    #[test]
    fn component_kind_is_not_basic() {
        let err = Scene::default()
            .add_basic_element(ElementKind::Component, &ElementDefaults::default())
            .unwrap_err();
        assert_eq!(err, SceneError::NotBasicKind(ElementKind::Component));
    }

    #[test]
    fn untouched_elements_are_shared() {
        let defaults = ElementDefaults::default();
        let (s1, a) = Scene::default()
            .add_basic_element(ElementKind::Heading, &defaults)
            .unwrap();
        let (s2, b) = s1.add_basic_element(ElementKind::Paragraph, &defaults).unwrap();
        let s3 = s2.reposition(b, 5.0, -60.0).unwrap();

        assert!(Arc::ptr_eq(s2.get(a).unwrap(), s3.get(a).unwrap()));
        assert!(!Arc::ptr_eq(s2.get(b).unwrap(), s3.get(b).unwrap()));
        // Unclamped.
        assert_eq!(s3.get(b).unwrap().position, Position::new(55.0, -10.0));
        // Old snapshot unchanged.
        assert_eq!(s2.get(b).unwrap().position, Position::new(50.0, 50.0));
    }

    #[test]
    fn update_content_rejects_components() {
        let (scene, id) = Scene::default().instantiate_template(&saved_hero(), &ElementDefaults::default());
        assert_eq!(
            scene.update_content(id, "<p>hack</p>").unwrap_err(),
            SceneError::ContentOnComponent(id)
        );
    }

    #[test]
    fn update_property_writes_back_all_fields() {
        let (scene, id) = Scene::default().instantiate_template(&saved_hero(), &ElementDefaults::default());
        let scene = scene
            .update_property(id, "h1x", PropertyKind::Text, "Hello")
            .unwrap();
        let el = scene.get(id).unwrap();
        assert_eq!(el.content, "<h1 data-id=\"h1x\">Hello</h1>");
        assert_eq!(el.base_code.as_deref(), Some("<h1 data-id=\"h1x\">Welcome</h1>"));
        assert_eq!(el.properties.as_ref().unwrap()[0].value, "Hello");
        assert_eq!(el.name.as_deref(), Some("Hero"));
    }

    #[test]
    fn update_property_on_basic_element_fails() {
        let (scene, id) = Scene::default()
            .add_basic_element(ElementKind::Paragraph, &ElementDefaults::default())
            .unwrap();
        assert_eq!(
            scene
                .update_property(id, "x", PropertyKind::Text, "y")
                .unwrap_err(),
            SceneError::Binding(BindingError::NotAComponent(id))
        );
    }

    #[test]
    fn missing_ids_are_reported() {
        let ghost = ElementId::intern("ghost");
        let scene = Scene::default();
        assert_eq!(scene.delete_element(ghost).unwrap_err(), SceneError::ElementNotFound(ghost));
        assert_eq!(
            scene.rename(ghost, "x").unwrap_err(),
            SceneError::ElementNotFound(ghost)
        );
    }

    #[test]
    fn delete_and_style_merge() {
        let defaults = ElementDefaults::default();
        let (scene, a) = Scene::default()
            .add_basic_element(ElementKind::Image, &defaults)
            .unwrap();
        let partial: StyleOverrides = [("height", "80px"), ("borderRadius", "8px")]
            .into_iter()
            .collect();
        let scene = scene.update_style(a, &partial).unwrap();
        let pairs: Vec<_> = scene.get(a).unwrap().styles.iter().collect();
        assert_eq!(
            pairs,
            vec![("width", "300px"), ("height", "80px"), ("borderRadius", "8px")]
        );
        let scene = scene.delete_element(a).unwrap();
        assert!(scene.is_empty());
    }

    #[test]
    fn generated_ids_skip_rehydrated_ones() {
        let defaults = ElementDefaults::default();
        let (probe, probe_id) = Scene::default()
            .add_basic_element(ElementKind::Heading, &defaults)
            .unwrap();
        let n: u64 = probe_id.as_str()["heading_".len()..].parse().unwrap();
        // Pretend storage already holds the next counter value.
        let stored = SceneElement::new(
            ElementId::intern(&format!("heading_{}", n + 1)),
            ElementKind::Heading,
            "Old",
        );
        let scene = Scene::new(vec![stored, (*probe.elements()[0]).clone()], "#000");
        let (scene, fresh) = scene.add_basic_element(ElementKind::Heading, &defaults).unwrap();
        assert_eq!(scene.elements().iter().filter(|el| el.id == fresh).count(), 1);
    }
}
