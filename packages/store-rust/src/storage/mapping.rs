//! Key mapping strategies: logical `(context, key)` to physical location.
//!
//! Two layouts exist behind one capability: one collection per context, or a
//! single shared collection with composite keys. The storage service is
//! written once against [`KeyMapping`]; nothing is duplicated per variant.

use sessiongrid_core::GridKey;

use super::grid::KeyFilter;

/// Resolves a logical `(context, key)` pair onto a physical grid location.
///
/// Used as `Arc<dyn KeyMapping>`.
pub trait KeyMapping: Send + Sync {
    /// The physical collection holding the context's records.
    fn collection(&self, context: &str) -> String;

    /// The physical key for a logical pair.
    fn physical_key(&self, context: &str, key: &str) -> GridKey;

    /// Predicate carving this context out of its collection.
    ///
    /// `None` means the collection holds exactly this context, so a
    /// context-wide operation may scan (or clear) the whole collection.
    fn context_filter(&self, context: &str) -> Option<KeyFilter>;
}

/// One physical collection per context.
///
/// Context isolation is structural: `delete_context` clears one collection,
/// a context scan iterates one collection. Numerous contexts mean numerous
/// physical collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerContextKeyMapping;

impl KeyMapping for PerContextKeyMapping {
    fn collection(&self, context: &str) -> String {
        context.to_string()
    }

    fn physical_key(&self, _context: &str, key: &str) -> GridKey {
        GridKey::plain(key)
    }

    fn context_filter(&self, _context: &str) -> Option<KeyFilter> {
        None
    }
}

/// One fixed collection shared by all contexts, addressed by composite keys.
///
/// Context-wide operations filter the shared collection by context equality
/// on the composite key.
#[derive(Debug, Clone)]
pub struct SharedKeyMapping {
    map_name: String,
}

impl SharedKeyMapping {
    /// Creates a mapping that stores every context in `map_name`.
    #[must_use]
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            map_name: map_name.into(),
        }
    }
}

impl KeyMapping for SharedKeyMapping {
    fn collection(&self, _context: &str) -> String {
        self.map_name.clone()
    }

    fn physical_key(&self, context: &str, key: &str) -> GridKey {
        GridKey::composite(context, key)
    }

    fn context_filter(&self, context: &str) -> Option<KeyFilter> {
        Some(KeyFilter::ContextEquals(context.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_context_uses_context_as_collection() {
        let mapping = PerContextKeyMapping;
        assert_eq!(mapping.collection("session-ctx"), "session-ctx");
        assert_eq!(mapping.physical_key("session-ctx", "k1"), GridKey::plain("k1"));
        assert!(mapping.context_filter("session-ctx").is_none());
    }

    #[test]
    fn shared_uses_fixed_collection_and_composite_keys() {
        let mapping = SharedKeyMapping::new("sessions");
        assert_eq!(mapping.collection("ctx-a"), "sessions");
        assert_eq!(mapping.collection("ctx-b"), "sessions");
        assert_eq!(
            mapping.physical_key("ctx-a", "k1"),
            GridKey::composite("ctx-a", "k1")
        );
        assert_eq!(
            mapping.context_filter("ctx-a"),
            Some(KeyFilter::ContextEquals("ctx-a".to_string()))
        );
    }

    #[test]
    fn shared_keys_do_not_collide_across_contexts() {
        let mapping = SharedKeyMapping::new("sessions");
        assert_ne!(
            mapping.physical_key("a:b", "c"),
            mapping.physical_key("a", "b:c")
        );
    }
}
