//! Pool configuration

/// How a free descriptor is chosen for an allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
  /// First free run, in address order, that is large enough.
  #[default]
  FirstFit,
  /// Smallest free run that is large enough; ties go to the lower address.
  BestFit,
}

/// Configuration for a [`Pool`](crate::Pool)
#[derive(Debug, Clone)]
pub struct PoolConfig {
  /// Free-block search strategy
  pub search: SearchMode,

  /// Fill pattern byte for newly allocated blocks (for debugging)
  pub alloc_pattern: Option<u8>,
  /// Fill pattern byte for freed blocks (for debugging)
  pub dealloc_pattern: Option<u8>,

  /// Walk the whole block list after every alloc/free and fail with
  /// `Corruption` if the partition is broken
  pub verify_invariants: bool,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      search: SearchMode::FirstFit,
      alloc_pattern: if cfg!(debug_assertions) { Some(0xBB) } else { None },
      dealloc_pattern: if cfg!(debug_assertions) { Some(0xDD) } else { None },
      verify_invariants: cfg!(debug_assertions),
    }
  }
}

impl PoolConfig {
  /// No fill patterns, no verification
  #[must_use]
  pub fn production() -> Self {
    Self {
      search: SearchMode::FirstFit,
      alloc_pattern: None,
      dealloc_pattern: None,
      verify_invariants: false,
    }
  }

  /// Fill patterns and verification on, regardless of build profile
  #[must_use]
  pub fn debug() -> Self {
    Self {
      search: SearchMode::FirstFit,
      alloc_pattern: Some(0xBB),
      dealloc_pattern: Some(0xDD),
      verify_invariants: true,
    }
  }

  #[must_use]
  pub fn with_search(
    mut self,
    search: SearchMode,
  ) -> Self {
    self.search = search;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_presets() {
    let production = PoolConfig::production();
    assert_eq!(production.alloc_pattern, None);
    assert!(!production.verify_invariants);

    let debug = PoolConfig::debug().with_search(SearchMode::BestFit);
    assert_eq!(debug.dealloc_pattern, Some(0xDD));
    assert_eq!(debug.search, SearchMode::BestFit);
  }
}
