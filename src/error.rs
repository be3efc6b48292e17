//! Error types for pool operations.

use std::io;

use thiserror::Error;

use crate::address::Address;

/// Result alias used throughout the crate.
pub type PoolResult<T> = Result<T, PoolError>;

/// Everything that can go wrong while managing a pool.
///
/// Apart from [`PoolError::BackingStore`], every variant is recoverable and
/// is returned before any descriptor is touched.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
  #[error("no pool has been created")]
  NotInitialized,

  #[error("pool capacity must be at least one byte")]
  ZeroCapacity,

  #[error("allocation size must be at least one byte")]
  ZeroSize,

  #[error("request of {requested} bytes exceeds pool capacity of {capacity} bytes")]
  OutOfRange { requested: usize, capacity: usize },

  #[error("no free run of {requested} bytes (largest free run: {largest_free} bytes)")]
  OutOfMemory { requested: usize, largest_free: usize },

  #[error("{address} is not an allocated block of this pool")]
  InvalidAddress { address: Address },

  #[error("could not map {size} bytes of backing memory")]
  BackingStore {
    size: usize,
    #[source]
    source: io::Error,
  },

  #[error("block list corrupted: {details}")]
  Corruption { details: String },
}

impl PoolError {
  /// Stable category string, handy for log fields and metrics labels.
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::NotInitialized => "POOL:STATE:UNINIT",
      Self::ZeroCapacity => "POOL:CREATE:ZERO",
      Self::ZeroSize => "POOL:ALLOC:ZERO",
      Self::OutOfRange { .. } => "POOL:ALLOC:RANGE",
      Self::OutOfMemory { .. } => "POOL:ALLOC:EXHAUSTED",
      Self::InvalidAddress { .. } => "POOL:FREE:INVALID",
      Self::BackingStore { .. } => "POOL:CREATE:MMAP",
      Self::Corruption { .. } => "POOL:STATE:CORRUPT",
    }
  }

  /// Whether the same request may succeed after other blocks are freed.
  #[must_use]
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::OutOfMemory { .. })
  }

  pub(crate) fn corruption(details: impl Into<String>) -> Self {
    Self::Corruption {
      details: details.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_out_of_memory_is_retryable() {
    let exhausted = PoolError::OutOfMemory {
      requested: 64,
      largest_free: 32,
    };
    let range = PoolError::OutOfRange {
      requested: 2048,
      capacity: 1024,
    };

    assert!(exhausted.is_retryable());
    assert!(!range.is_retryable());
    assert!(!PoolError::NotInitialized.is_retryable());
  }

  #[test]
  fn test_messages_carry_sizes() {
    let err = PoolError::OutOfMemory {
      requested: 210,
      largest_free: 200,
    };

    assert_eq!(
      err.to_string(),
      "no free run of 210 bytes (largest free run: 200 bytes)"
    );
    assert_eq!(err.code(), "POOL:ALLOC:EXHAUSTED");
  }

  #[test]
  fn test_backing_store_exposes_source() {
    use std::error::Error as _;

    let err = PoolError::BackingStore {
      size: 4096,
      source: io::Error::from_raw_os_error(libc::ENOMEM),
    };

    assert!(err.source().is_some());
    assert_eq!(err.code(), "POOL:CREATE:MMAP");
  }
}
