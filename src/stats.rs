use std::fmt;

/// Point-in-time view of a pool's occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoolStats {
  pub capacity: usize,
  pub used_bytes: usize,
  pub free_bytes: usize,
  /// Size of the largest single free run
  pub largest_free: usize,
  pub block_count: usize,
  pub free_blocks: usize,
  pub allocations: u64,
  pub deallocations: u64,
  pub failed_allocations: u64,
}

impl PoolStats {
  /// Share of free space that is not part of the largest free run.
  ///
  /// `0.0` means all free space is contiguous (or there is none).
  pub fn fragmentation(&self) -> f64 {
    if self.free_bytes == 0 {
      return 0.0;
    }
    1.0 - self.largest_free as f64 / self.free_bytes as f64
  }

  pub fn live_allocations(&self) -> u64 {
    self.allocations - self.deallocations
  }
}

impl fmt::Display for PoolStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{}/{} bytes used, {} blocks ({} free), largest free run {}, fragmentation {:.1}%",
      self.used_bytes,
      self.capacity,
      self.block_count,
      self.free_blocks,
      self.largest_free,
      self.fragmentation() * 100.0
    )
  }
}
