//! Core data model for WebGenius projects.
//!
//! A project is a flat, ordered list of placed elements (paint order) plus a
//! canvas background color. Component elements carry their own copy of the
//! template they were instantiated from: the marker-annotated `base_code` and
//! the property schema bound to it. `content` is always the rendered output.
//!
//! The serde shapes match the browser storage format, so state written by
//! earlier builds of the page rehydrates unchanged.

use crate::id::ElementId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

// ─── Properties ──────────────────────────────────────────────────────────

/// What an editable property controls. Decides the editor widget and how
/// the binding engine applies the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Inner markup of every node carrying the marker.
    Text,
    /// `src` of every marked `<img>`.
    ImageUrl,
    /// `href` of every marked `<a>`.
    LinkUrl,
    /// A CSS custom property declared in the template's style fragment.
    Color,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Text => "text",
            PropertyKind::ImageUrl => "image_url",
            PropertyKind::LinkUrl => "link_url",
            PropertyKind::Color => "color",
        }
    }

    /// Parse the storage/wire spelling (`"image_url"` etc.).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(PropertyKind::Text),
            "image_url" => Some(PropertyKind::ImageUrl),
            "link_url" => Some(PropertyKind::LinkUrl),
            "color" => Some(PropertyKind::Color),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable property of a component template.
///
/// For `Color`, `id` is the literal custom-property name including the
/// leading `--`. For every other kind it is the value of a `data-id` marker.
/// Two properties may share an `id` when their kinds differ, so lookups are
/// always keyed by `(id, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: String,
}

impl Property {
    pub fn new(id: &str, label: &str, kind: PropertyKind, value: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            value: value.to_string(),
        }
    }

    pub fn matches(&self, id: &str, kind: PropertyKind) -> bool {
        self.kind == kind && self.id == id
    }
}

/// Find the property keyed by `(id, kind)`.
pub fn find_property<'a>(
    properties: &'a [Property],
    id: &str,
    kind: PropertyKind,
) -> Option<&'a Property> {
    properties.iter().find(|p| p.matches(id, kind))
}

/// Find the property keyed by `(id, kind)` mutably.
pub fn find_property_mut<'a>(
    properties: &'a mut [Property],
    id: &str,
    kind: PropertyKind,
) -> Option<&'a mut Property> {
    properties.iter_mut().find(|p| p.matches(id, kind))
}

// ─── Templates ───────────────────────────────────────────────────────────

/// Marker-annotated markup plus the property schema bound to it.
///
/// Serializes as `{ "code", "properties" }`, which is also the shape the
/// generator returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    #[serde(rename = "code")]
    pub base_code: String,
    pub properties: Vec<Property>,
}

impl ComponentTemplate {
    pub fn new(base_code: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            base_code: base_code.into(),
            properties,
        }
    }

    /// An independent copy of the schema for a new placed instance.
    pub fn instantiate_properties(&self) -> Vec<Property> {
        self.properties.clone()
    }
}

/// A named template in the component library. Never edited in place:
/// edits happen on placed instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedComponentTemplate {
    pub id: ElementId,
    pub name: String,
    #[serde(flatten)]
    pub template: ComponentTemplate,
}

// ─── Style overrides ─────────────────────────────────────────────────────

/// Per-element inline style overrides, keyed by camelCase style property
/// (`fontSize`, `backgroundColor`). Keeps insertion order, which is also the
/// order declarations are written on export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverrides(SmallVec<[(String, String); 4]>);

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a value, keeping the key's original position if it already exists.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    /// Shallow merge: keys in `partial` overwrite, everything else is kept.
    #[must_use]
    pub fn merged(&self, partial: &StyleOverrides) -> StyleOverrides {
        let mut out = self.clone();
        for (k, v) in partial.iter() {
            out.set(k, v);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for StyleOverrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut out = StyleOverrides::new();
        for (k, v) in iter {
            out.set(k.as_ref(), v.as_ref());
        }
        out
    }
}

impl Serialize for StyleOverrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StyleOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StyleOverridesVisitor)
    }
}

struct StyleOverridesVisitor;

impl<'de> Visitor<'de> for StyleOverridesVisitor {
    type Value = StyleOverrides;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of style properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = StyleOverrides::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            // Older saves may hold bare numbers (`fontSize: 16`); null means unset.
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            out.set(&key, &value);
        }
        Ok(out)
    }
}

// ─── Scene elements ──────────────────────────────────────────────────────

/// The kinds of element that can be placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Heading,
    Paragraph,
    Image,
    Component,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Heading => "heading",
            ElementKind::Paragraph => "paragraph",
            ElementKind::Image => "image",
            ElementKind::Component => "component",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "heading" => Some(ElementKind::Heading),
            "paragraph" => Some(ElementKind::Paragraph),
            "image" => Some(ElementKind::Image),
            "component" => Some(ElementKind::Component),
            _ => None,
        }
    }

    /// Kinds whose `content` is literal text or a URL.
    pub fn is_basic(self) -> bool {
        !matches!(self, ElementKind::Component)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas position of an element's top-left corner, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unclamped: the canvas grows, so negative or huge positions are kept.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A placed instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    pub id: ElementId,

    #[serde(rename = "type")]
    pub kind: ElementKind,

    /// Rendered markup for components; literal text or URL otherwise.
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub styles: StyleOverrides,

    pub position: Position,

    /// Component elements only: this instance's own property values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,

    /// Component elements only: the marker-annotated template markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_code: Option<String>,
}

impl SceneElement {
    pub fn new(id: ElementId, kind: ElementKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            name: None,
            styles: StyleOverrides::new(),
            position: Position::default(),
            properties: None,
            base_code: None,
        }
    }

    /// Build a component instance from a library entry. The property list is
    /// a deep copy, so editing this instance never reaches the library or any
    /// sibling instance.
    pub fn from_template(id: ElementId, saved: &SavedComponentTemplate) -> Self {
        let mut el = Self::new(id, ElementKind::Component, saved.template.base_code.clone());
        el.name = Some(saved.name.clone());
        el.base_code = Some(saved.template.base_code.clone());
        el.properties = Some(saved.template.instantiate_properties());
        el
    }

    /// `(base_code, properties)` for component elements carrying both.
    pub fn component_parts(&self) -> Option<(&str, &[Property])> {
        match (self.kind, &self.base_code, &self.properties) {
            (ElementKind::Component, Some(code), Some(props)) => Some((code, props)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_kind_wire_names() {
        for kind in [
            PropertyKind::Text,
            PropertyKind::ImageUrl,
            PropertyKind::LinkUrl,
            PropertyKind::Color,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(PropertyKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn lookup_is_keyed_by_id_and_kind() {
        let props = vec![
            Property::new("cta-1", "Button Text", PropertyKind::Text, "Buy"),
            Property::new("cta-1", "Button Link", PropertyKind::LinkUrl, "#buy"),
        ];
        assert_eq!(
            find_property(&props, "cta-1", PropertyKind::LinkUrl).map(|p| p.value.as_str()),
            Some("#buy")
        );
        assert_eq!(
            find_property(&props, "cta-1", PropertyKind::Text).map(|p| p.value.as_str()),
            Some("Buy")
        );
        assert!(find_property(&props, "cta-1", PropertyKind::Color).is_none());
    }

    #[test]
    fn style_overrides_merge_is_shallow_and_ordered() {
        let base: StyleOverrides = [("width", "300px"), ("height", "200px")]
            .into_iter()
            .collect();
        let partial: StyleOverrides = [("height", "120px"), ("color", "#333")]
            .into_iter()
            .collect();
        let merged = base.merged(&partial);
        let pairs: Vec<_> = merged.iter().collect();
        assert_eq!(
            pairs,
            vec![("width", "300px"), ("height", "120px"), ("color", "#333")]
        );
        // Original untouched.
        assert_eq!(base.get("height"), Some("200px"));
    }

    #[test]
    fn style_overrides_json_keeps_order_and_tolerates_numbers() {
        let json = r#"{"zIndex":3,"fontSize":"24px","color":null,"alignItems":"center"}"#;
        let styles: StyleOverrides = serde_json::from_str(json).unwrap();
        let pairs: Vec<_> = styles.iter().collect();
        assert_eq!(
            pairs,
            vec![("zIndex", "3"), ("fontSize", "24px"), ("alignItems", "center")]
        );
        assert_eq!(
            serde_json::to_string(&styles).unwrap(),
            r#"{"zIndex":"3","fontSize":"24px","alignItems":"center"}"#
        );
    }

    #[test]
    fn scene_element_storage_shape() {
        let json = r##"{
            "id": "component-1719400000000",
            "type": "component",
            "content": "<h2 data-id=\"t1\">Hi</h2>",
            "baseCode": "<h2 data-id=\"t1\">Hi</h2>",
            "name": "Hero",
            "properties": [{"id":"t1","label":"Title","type":"text","value":"Hi"}],
            "styles": {},
            "position": {"x": 50, "y": 50}
        }"##;
        let el: SceneElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.kind, ElementKind::Component);
        assert_eq!(el.position, Position::new(50.0, 50.0));
        let (code, props) = el.component_parts().unwrap();
        assert_eq!(code, "<h2 data-id=\"t1\">Hi</h2>");
        assert_eq!(props[0].kind, PropertyKind::Text);

        let back = serde_json::to_value(&el).unwrap();
        assert_eq!(back["baseCode"], "<h2 data-id=\"t1\">Hi</h2>");
        assert_eq!(back["type"], "component");
    }

    #[test]
    fn basic_elements_omit_component_fields() {
        let el = SceneElement::new(ElementId::intern("h"), ElementKind::Heading, "Hi");
        let v = serde_json::to_value(&el).unwrap();
        assert!(v.get("baseCode").is_none());
        assert!(v.get("properties").is_none());
        assert!(v.get("name").is_none());
        assert!(el.component_parts().is_none());
    }

    #[test]
    fn saved_template_flattens_code() {
        let saved = SavedComponentTemplate {
            id: ElementId::intern("comp-1"),
            name: "Card".into(),
            template: ComponentTemplate::new("<div></div>", Vec::new()),
        };
        let v = serde_json::to_value(&saved).unwrap();
        assert_eq!(v["code"], "<div></div>");
        assert_eq!(v["name"], "Card");
        let back: SavedComponentTemplate = serde_json::from_value(v).unwrap();
        assert_eq!(back, saved);
    }

    #[test]
    fn instances_own_their_properties() {
        let saved = SavedComponentTemplate {
            id: ElementId::intern("comp-2"),
            name: "Card".into(),
            template: ComponentTemplate::new(
                "<p data-id=\"a\">x</p>",
                vec![Property::new("a", "A", PropertyKind::Text, "x")],
            ),
        };
        let mut a = SceneElement::from_template(ElementId::intern("i1"), &saved);
        let b = SceneElement::from_template(ElementId::intern("i2"), &saved);
        a.properties.as_mut().unwrap()[0].value = "changed".into();
        assert_eq!(b.properties.as_ref().unwrap()[0].value, "x");
        assert_eq!(saved.template.properties[0].value, "x");
        assert_eq!(a.content, saved.template.base_code);
    }
}
