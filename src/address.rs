use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pool.
///
/// Every pool gets a fresh id, so an [`Address`] issued by a destroyed pool
/// is never mistaken for a block of its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
  pub(crate) fn next() -> Self {
    Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for PoolId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "pool#{}", self.0)
  }
}

/// Opaque handle to an allocated block.
///
/// It is only meaningful to the pool that returned it, and only until the
/// block is freed or the pool is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
  pool: PoolId,
  offset: usize,
}

impl Address {
  pub(crate) fn new(
    pool: PoolId,
    offset: usize,
  ) -> Self {
    Self { pool, offset }
  }

  /// Byte offset of the block from the start of the backing buffer.
  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn pool_id(&self) -> PoolId {
    self.pool
  }
}

impl fmt::Display for Address {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}+{:#x}", self.pool, self.offset)
  }
}
