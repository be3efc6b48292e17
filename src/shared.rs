//! A [`PoolAllocator`] behind one coarse lock.
//!
//! Every operation takes the same mutex and runs to completion under it, so
//! concurrent callers observe exactly the single-threaded semantics.

use parking_lot::Mutex;

use crate::address::Address;
use crate::allocator::PoolAllocator;
use crate::config::PoolConfig;
use crate::error::PoolResult;
use crate::stats::PoolStats;

#[derive(Debug, Default)]
pub struct SharedPool {
  inner: Mutex<PoolAllocator>,
}

impl SharedPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: PoolConfig) -> Self {
    Self {
      inner: Mutex::new(PoolAllocator::with_config(config)),
    }
  }

  pub fn create_pool(
    &self,
    capacity: usize,
  ) -> PoolResult<()> {
    self.inner.lock().create_pool(capacity)
  }

  pub fn allocate(
    &self,
    size: usize,
  ) -> PoolResult<Address> {
    self.inner.lock().allocate(size)
  }

  pub fn deallocate(
    &self,
    address: Address,
  ) -> PoolResult<()> {
    self.inner.lock().deallocate(address)
  }

  pub fn destroy_pool(&self) -> bool {
    self.inner.lock().destroy_pool()
  }

  pub fn stats(&self) -> PoolResult<PoolStats> {
    Ok(self.inner.lock().pool()?.stats())
  }

  /// Runs `f` over the bytes of the block at `address` with the lock held.
  pub fn with_bytes<R>(
    &self,
    address: Address,
    f: impl FnOnce(&[u8]) -> R,
  ) -> PoolResult<R> {
    let guard = self.inner.lock();
    Ok(f(guard.pool()?.bytes(address)?))
  }

  pub fn with_bytes_mut<R>(
    &self,
    address: Address,
    f: impl FnOnce(&mut [u8]) -> R,
  ) -> PoolResult<R> {
    let mut guard = self.inner.lock();
    Ok(f(guard.pool_mut()?.bytes_mut(address)?))
  }

  pub fn into_inner(self) -> PoolAllocator {
    self.inner.into_inner()
  }
}
