//! Template binding engine: property values → rendered markup.
//!
//! Content properties (`Text`, `ImageUrl`, `LinkUrl`) are applied to a
//! parsed copy of the base code on every render, so `base_code` keeps its
//! authored values and rendering is a pure function of `(base_code,
//! properties)`. Color properties are the exception: they live as
//! custom-property declarations inside the style fragment, and an edit
//! rewrites that declaration text in `base_code` itself.
//!
//! Text values are inserted as markup, not escaped. Templates and their
//! values come from the page owner, so rich text like `<b>Sale</b>` is
//! allowed; nothing here sanitizes it.

use crate::error::BindingError;
use crate::markup::Fragment;
use crate::model::{Property, PropertyKind, find_property, find_property_mut};
use crate::style;

/// Marker attribute binding a node to a content property.
pub const MARKER_ATTR: &str = "data-id";

/// Result of a single property edit. Replaces all three fields of the
/// component element together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEdit {
    pub base_code: String,
    pub properties: Vec<Property>,
    pub rendered: String,
}

/// Render `base_code` with every content property applied.
///
/// The output is the style fragment (verbatim) followed by the body markup
/// with its style fragment removed and surrounding whitespace trimmed.
pub fn render(base_code: &str, properties: &[Property]) -> String {
    let mut frag = Fragment::parse(base_code);
    for prop in properties {
        apply_to_fragment(&mut frag, prop);
    }

    let body = style::strip_style_fragment(&frag.to_markup());
    let style_block = style::style_fragment(base_code).unwrap_or("");
    log::trace!(
        "rendered template: {} properties, {} bytes",
        properties.len(),
        style_block.len() + body.len()
    );
    format!("{style_block}{}", body.trim())
}

/// Apply one property edit and re-render.
///
/// Unknown `(target_id, target_kind)` pairs fail with
/// [`BindingError::PropertyNotFound`] and leave the inputs untouched.
pub fn apply_property_edit(
    base_code: &str,
    properties: &[Property],
    target_id: &str,
    target_kind: PropertyKind,
    new_value: &str,
) -> Result<PropertyEdit, BindingError> {
    let old = find_property(properties, target_id, target_kind).ok_or_else(|| {
        BindingError::PropertyNotFound {
            id: target_id.to_string(),
            kind: target_kind,
        }
    })?;

    let base_code = match target_kind {
        PropertyKind::Color => replace_custom_property(base_code, target_id, &old.value, new_value),
        PropertyKind::Text | PropertyKind::ImageUrl | PropertyKind::LinkUrl => {
            base_code.to_string()
        }
    };

    let mut properties = properties.to_vec();
    if let Some(prop) = find_property_mut(&mut properties, target_id, target_kind) {
        prop.value = new_value.to_string();
    }

    let rendered = render(&base_code, &properties);
    Ok(PropertyEdit {
        base_code,
        properties,
        rendered,
    })
}

/// Rewrite `"<name>: <old>"` to `"<name>: <new>"` at its first occurrence
/// inside the style fragment.
///
/// This is a byte-exact text match: it only finds declarations written with
/// exactly one space after the colon and the value this engine last wrote,
/// ending at a value boundary (see [`style::find_declaration`]). Anything
/// else leaves `base_code` unchanged.
pub fn replace_custom_property(base_code: &str, name: &str, old: &str, new: &str) -> String {
    let Some(range) = style::find_style_fragment(base_code) else {
        log::trace!("no style fragment; {name} left as is");
        return base_code.to_string();
    };
    let Some(at) = style::find_declaration(&base_code[range.clone()], name, old) else {
        log::trace!("declaration '{name}: {old}' not found; left as is");
        return base_code.to_string();
    };

    let start = range.start + at;
    let end = start + name.len() + 2 + old.len();
    let mut out = String::with_capacity(base_code.len() + new.len());
    out.push_str(&base_code[..start]);
    out.push_str(name);
    out.push_str(": ");
    out.push_str(new);
    out.push_str(&base_code[end..]);
    out
}

fn apply_to_fragment(frag: &mut Fragment, prop: &Property) {
    match prop.kind {
        PropertyKind::Color => {}
        PropertyKind::Text => {
            for node in frag.find_by_attr(MARKER_ATTR, &prop.id) {
                // A marker nested inside another text marker was replaced
                // along with its parent's children.
                if frag.is_attached(node) {
                    frag.set_inner_markup(node, &prop.value);
                }
            }
        }
        PropertyKind::ImageUrl => set_marked_attribute(frag, prop, "img", "src"),
        PropertyKind::LinkUrl => set_marked_attribute(frag, prop, "a", "href"),
    }
}

fn set_marked_attribute(frag: &mut Fragment, prop: &Property, tag: &str, attr: &str) {
    for node in frag.find_by_attr(MARKER_ATTR, &prop.id) {
        if frag.is_attached(node) && frag.tag_name(node) == Some(tag) {
            frag.set_attribute(node, attr, &prop.value);
        }
    }
}
