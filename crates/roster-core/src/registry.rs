//! Existence checks against a fixed set of known person ids.

use std::collections::BTreeSet;

/// Read-only membership test. Implementations must be safe to share across
/// request tasks without locking.
pub trait Registry: Send + Sync {
  fn exists(&self, id: i64) -> bool;
}

/// An immutable set of known ids, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRegistry {
  ids: BTreeSet<i64>,
}

impl PersonRegistry {
  pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
    Self { ids: ids.into_iter().collect() }
  }

  pub fn len(&self) -> usize { self.ids.len() }

  pub fn is_empty(&self) -> bool { self.ids.is_empty() }
}

impl Default for PersonRegistry {
  /// The stand-in "database": ids 1 through 5.
  fn default() -> Self { Self::new(1..=5) }
}

impl Registry for PersonRegistry {
  fn exists(&self, id: i64) -> bool { self.ids.contains(&id) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_fixture() {
    let r = PersonRegistry::default();
    assert_eq!(r.len(), 5);
    assert!(r.exists(1));
    assert!(r.exists(5));
    assert!(!r.exists(0));
    assert!(!r.exists(999));
  }

  #[test]
  fn custom_ids() {
    let r = PersonRegistry::new([42, 7, 42]);
    assert_eq!(r.len(), 2);
    assert!(r.exists(7));
    assert!(!r.exists(1));
  }
}
