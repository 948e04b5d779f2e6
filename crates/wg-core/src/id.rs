use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for element and template IDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A lightweight, interned identifier for canvas elements and library entries.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate an ID with a kind prefix (e.g. `heading_1`, `component_2`).
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Generate a prefixed ID that `taken` does not already claim.
    ///
    /// IDs rehydrated from storage were minted by an earlier session whose
    /// counter started at zero too, so a fresh counter value can collide.
    pub fn fresh(prefix: &str, taken: impl Fn(ElementId) -> bool) -> Self {
        loop {
            let id = Self::with_prefix(prefix);
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("heading-1719400000000");
        let b = ElementId::intern("heading-1719400000000");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "heading-1719400000000");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ElementId::with_prefix("image");
        let b = ElementId::with_prefix("image");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("image_"));
    }

    #[test]
    fn fresh_skips_taken_ids() {
        let first = ElementId::with_prefix("paragraph");
        // Claim the next few counter values so `fresh` has to walk past them.
        let n: u64 = first.as_str()["paragraph_".len()..].parse().unwrap();
        let taken: Vec<ElementId> = (n + 1..n + 4)
            .map(|i| ElementId::intern(&format!("paragraph_{i}")))
            .collect();
        let id = ElementId::fresh("paragraph", |candidate| taken.contains(&candidate));
        assert!(!taken.contains(&id));
    }

    #[test]
    fn serde_as_plain_string() {
        let id = ElementId::intern("component-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"component-42\"");
        let back: ElementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
