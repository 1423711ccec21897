//! Feature-flag snapshot consulted by binders, the dispatch cache and the
//! evaluator.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Well-known flag names.
pub mod flags {
    /// Forbid `+`, `|` and `.union()` on depsets.
    pub const INCOMPATIBLE_DEPSET_UNION: &str = "incompatible_depset_union";
    /// Forbid iterating a depset without `to_list()`.
    pub const INCOMPATIBLE_DEPSET_IS_NOT_ITERABLE: &str = "incompatible_depset_is_not_iterable";
    /// Forbid `/` on integers.
    pub const INCOMPATIBLE_DISALLOW_SLASH_OPERATOR: &str = "incompatible_disallow_slash_operator";
    /// Remove the `items` parameter of `depset()`.
    pub const INCOMPATIBLE_DISABLE_DEPSET_ITEMS: &str = "incompatible_disable_depset_items";
    /// Enable `str.removeprefix` and `str.removesuffix`.
    pub const EXPERIMENTAL_STRING_PREFIX_METHODS: &str = "experimental_string_prefix_methods";
}

/// An immutable set of named boolean flags.
///
/// Cheap to clone and usable as a hash key, so a snapshot can identify a
/// dispatch table in the shared cache. Only enabled flags are stored, so
/// snapshots that agree on every flag compare equal.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Semantics {
    enabled: Arc<BTreeSet<String>>,
}

impl Semantics {
    pub fn builder() -> SemanticsBuilder {
        SemanticsBuilder::default()
    }

    /// Whether `flag` is on.
    pub fn flag(&self, flag: &str) -> bool {
        self.enabled.contains(flag)
    }
}

impl fmt::Debug for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.enabled.iter()).finish()
    }
}

#[derive(Default)]
pub struct SemanticsBuilder {
    enabled: BTreeSet<String>,
}

impl SemanticsBuilder {
    #[must_use]
    pub fn set(mut self, flag: &str, value: bool) -> Self {
        if value {
            self.enabled.insert(flag.to_string());
        } else {
            self.enabled.remove(flag);
        }
        self
    }

    pub fn build(self) -> Semantics {
        Semantics {
            enabled: Arc::new(self.enabled),
        }
    }
}
