use tracing::{debug, warn};

use crate::address::Address;
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::pool::Pool;

/// Holds at most one live [`Pool`] and exposes the classic
/// `create_pool` / `allocate` / `deallocate` / `destroy_pool` surface.
///
/// Recreating a pool releases the previous one first, and any address it
/// issued is rejected afterwards.
#[derive(Debug, Default)]
pub struct PoolAllocator {
  pool: Option<Pool>,
  config: PoolConfig,
}

impl PoolAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every pool created through this allocator uses `config`.
  pub fn with_config(config: PoolConfig) -> Self {
    Self { pool: None, config }
  }

  pub fn create_pool(
    &mut self,
    capacity: usize,
  ) -> PoolResult<()> {
    let pool = Pool::with_config(capacity, self.config.clone())?;

    if let Some(previous) = self.pool.replace(pool) {
      warn!(
        previous = %previous.id(),
        live = previous.stats().live_allocations(),
        "create_pool called while a pool is live; releasing it"
      );
    }

    Ok(())
  }

  pub fn allocate(
    &mut self,
    size: usize,
  ) -> PoolResult<Address> {
    self.pool_mut()?.allocate(size)
  }

  pub fn deallocate(
    &mut self,
    address: Address,
  ) -> PoolResult<()> {
    self.pool_mut()?.deallocate(address)
  }

  /// Releases the live pool. Returns `false` (and logs a warning) if there
  /// was none.
  pub fn destroy_pool(&mut self) -> bool {
    match self.pool.take() {
      Some(pool) => {
        debug!(pool = %pool.id(), "destroying pool");
        pool.destroy();
        true
      }
      None => {
        warn!("destroy_pool called but no pool was created");
        false
      }
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.pool.is_some()
  }

  pub fn pool(&self) -> PoolResult<&Pool> {
    self.pool.as_ref().ok_or(PoolError::NotInitialized)
  }

  pub fn pool_mut(&mut self) -> PoolResult<&mut Pool> {
    self.pool.as_mut().ok_or(PoolError::NotInitialized)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_operations_require_a_pool() {
    let mut allocator = PoolAllocator::new();

    assert!(matches!(
      allocator.allocate(10),
      Err(PoolError::NotInitialized)
    ));
    assert!(!allocator.is_initialized());
    assert!(allocator.pool().is_err());
  }

  #[test]
  fn test_deallocate_without_pool() {
    let mut allocator = PoolAllocator::new();
    allocator.create_pool(100).unwrap();
    let address = allocator.allocate(10).unwrap();
    assert!(allocator.destroy_pool());

    assert!(matches!(
      allocator.deallocate(address),
      Err(PoolError::NotInitialized)
    ));
  }

  #[test]
  fn test_destroy_without_pool_is_a_noop() {
    let mut allocator = PoolAllocator::new();

    assert!(!allocator.destroy_pool());
    assert!(!allocator.destroy_pool());
  }

  #[test]
  fn test_recreate_replaces_pool_and_invalidates_addresses() {
    let mut allocator = PoolAllocator::new();
    allocator.create_pool(100).unwrap();
    let stale = allocator.allocate(10).unwrap();
    let first_id = allocator.pool().unwrap().id();

    allocator.create_pool(200).unwrap();

    let pool = allocator.pool().unwrap();
    assert_ne!(pool.id(), first_id);
    assert_eq!(pool.capacity(), 200);
    assert!(matches!(
      allocator.deallocate(stale),
      Err(PoolError::InvalidAddress { .. })
    ));
  }

  #[test]
  fn test_failed_create_keeps_previous_pool() {
    let mut allocator = PoolAllocator::new();
    allocator.create_pool(100).unwrap();

    assert!(matches!(
      allocator.create_pool(0),
      Err(PoolError::ZeroCapacity)
    ));
    assert_eq!(allocator.pool().unwrap().capacity(), 100);
  }

  #[test]
  fn test_config_applies_to_created_pools() {
    let mut allocator = PoolAllocator::with_config(PoolConfig::production());
    allocator.create_pool(32).unwrap();

    assert_eq!(allocator.pool().unwrap().config().alloc_pattern, None);
  }
}
