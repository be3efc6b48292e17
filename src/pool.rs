use std::fmt;

use tracing::{debug, trace};

use crate::address::{Address, PoolId};
use crate::block::{Block, BlockId, BlockInfo, BlockList};
use crate::buffer::Buffer;
use crate::config::{PoolConfig, SearchMode};
use crate::error::{PoolError, PoolResult};
use crate::stats::PoolStats;

/// A fixed-capacity buffer carved into variable-size blocks.
///
/// Blocks are handed out first-fit (by default) in address order. A free
/// run larger than the request is split, with the used part taken from its
/// low end. Freed blocks are merged with free neighbours immediately, so two
/// adjacent descriptors are never both free.
pub struct Pool {
  id: PoolId,
  buffer: Buffer,
  blocks: BlockList,
  config: PoolConfig,
  allocations: u64,
  deallocations: u64,
  failed_allocations: u64,
}

impl Pool {
  /// Maps `capacity` bytes and covers them with a single free block.
  pub fn create(capacity: usize) -> PoolResult<Self> {
    Self::with_config(capacity, PoolConfig::default())
  }

  pub fn with_config(
    capacity: usize,
    config: PoolConfig,
  ) -> PoolResult<Self> {
    if capacity == 0 {
      return Err(PoolError::ZeroCapacity);
    }

    let pool = Self {
      id: PoolId::next(),
      buffer: Buffer::map(capacity)?,
      blocks: BlockList::new(capacity),
      config,
      allocations: 0,
      deallocations: 0,
      failed_allocations: 0,
    };

    debug!(pool = %pool.id, capacity, search = ?pool.config.search, "created pool");
    Ok(pool)
  }

  pub fn id(&self) -> PoolId {
    self.id
  }

  pub fn capacity(&self) -> usize {
    self.buffer.len()
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  fn find_free_block(
    &self,
    size: usize,
  ) -> Option<BlockId> {
    let mut fits = self.blocks.ids().filter(|&id| {
      let block = self.blocks.get(id);
      block.is_free && block.size >= size
    });

    match self.config.search {
      SearchMode::FirstFit => fits.next(),
      SearchMode::BestFit => fits.min_by_key(|&id| self.blocks.get(id).size),
    }
  }

  /// Reserves `size` bytes and returns the address of the new block.
  ///
  /// Every rejected request, including a zero-size one, counts towards
  /// `failed_allocations`. If invariant verification is enabled and reports
  /// [`PoolError::Corruption`], the block has already been carved out and
  /// stays marked used.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> PoolResult<Address> {
    if size == 0 {
      self.failed_allocations += 1;
      return Err(PoolError::ZeroSize);
    }

    if size > self.capacity() {
      self.failed_allocations += 1;
      return Err(PoolError::OutOfRange {
        requested: size,
        capacity: self.capacity(),
      });
    }

    let Some(free) = self.find_free_block(size) else {
      self.failed_allocations += 1;
      let largest_free = self.largest_free();
      trace!(pool = %self.id, size, largest_free, "no free run large enough");
      return Err(PoolError::OutOfMemory {
        requested: size,
        largest_free,
      });
    };

    let id = self.split(free, size);
    let block = *self.blocks.get(id);

    if let Some(pattern) = self.config.alloc_pattern {
      self.buffer.as_mut_slice()[block.offset..block.end()].fill(pattern);
    }

    self.allocations += 1;
    trace!(pool = %self.id, offset = block.offset, size, "allocated block");

    self.verify()?;
    Ok(Address::new(self.id, block.offset))
  }

  /// Marks `size` bytes at the start of free block `id` as used and returns
  /// the descriptor covering them.
  fn split(
    &mut self,
    id: BlockId,
    size: usize,
  ) -> BlockId {
    let free = self.blocks.get_mut(id);

    if free.size == size {
      free.is_free = false;
      return id;
    }

    let offset = free.offset;
    free.offset += size;
    free.size -= size;
    trace!(pool = %self.id, offset, size, remainder = free.size, "split free block");

    self.blocks.insert_before(id, Block::new(offset, size, false))
  }

  /// Returns the block at `address` to the pool.
  ///
  /// Fails with [`PoolError::InvalidAddress`] without touching any block if
  /// `address` is not currently allocated here, which covers double frees
  /// and addresses issued by another pool. A [`PoolError::Corruption`] from
  /// invariant verification is reported after the block was already freed
  /// and merged.
  pub fn deallocate(
    &mut self,
    address: Address,
  ) -> PoolResult<()> {
    let id = self.find_used_block(address)?;

    let block = self.blocks.get_mut(id);
    block.is_free = true;
    let (offset, end) = (block.offset, block.end());

    if let Some(pattern) = self.config.dealloc_pattern {
      self.buffer.as_mut_slice()[offset..end].fill(pattern);
    }

    self.deallocations += 1;
    trace!(pool = %self.id, offset, size = end - offset, "freed block");

    self.coalesce(id);
    self.verify()
  }

  fn find_used_block(
    &self,
    address: Address,
  ) -> PoolResult<BlockId> {
    if address.pool_id() != self.id {
      return Err(PoolError::InvalidAddress { address });
    }

    self
      .blocks
      .ids()
      .take_while(|&id| self.blocks.get(id).offset <= address.offset())
      .find(|&id| {
        let block = self.blocks.get(id);
        block.offset == address.offset() && !block.is_free
      })
      .ok_or(PoolError::InvalidAddress { address })
  }

  /// Merges the free block `id` with a free predecessor and a free successor.
  fn coalesce(
    &mut self,
    mut id: BlockId,
  ) {
    let prev = self.blocks.get(id).prev;
    if let Some(prev) = prev.filter(|&prev| self.blocks.get(prev).is_free) {
      let absorbed = self.blocks.remove(id);
      self.blocks.get_mut(prev).size += absorbed.size;
      trace!(pool = %self.id, into = self.blocks.get(prev).offset, from = absorbed.offset, "merged with predecessor");
      id = prev;
    }

    let next = self.blocks.get(id).next;
    if let Some(next) = next.filter(|&next| self.blocks.get(next).is_free) {
      let absorbed = self.blocks.remove(next);
      self.blocks.get_mut(id).size += absorbed.size;
      trace!(pool = %self.id, into = self.blocks.get(id).offset, from = absorbed.offset, "merged with successor");
    }
  }

  /// Contents of the allocated block at `address`.
  pub fn bytes(
    &self,
    address: Address,
  ) -> PoolResult<&[u8]> {
    let block = self.blocks.get(self.find_used_block(address)?);
    Ok(&self.buffer.as_slice()[block.offset..block.end()])
  }

  pub fn bytes_mut(
    &mut self,
    address: Address,
  ) -> PoolResult<&mut [u8]> {
    let block = *self.blocks.get(self.find_used_block(address)?);
    Ok(&mut self.buffer.as_mut_slice()[block.offset..block.end()])
  }

  /// Releases the backing memory. Every address handed out becomes invalid.
  pub fn destroy(self) {
    drop(self);
  }

  /// Descriptors in address order.
  pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
    self.blocks.iter().map(BlockInfo::from)
  }

  pub fn largest_free(&self) -> usize {
    self
      .blocks
      .iter()
      .filter(|block| block.is_free)
      .map(|block| block.size)
      .max()
      .unwrap_or(0)
  }

  pub fn stats(&self) -> PoolStats {
    let mut stats = PoolStats {
      capacity: self.capacity(),
      allocations: self.allocations,
      deallocations: self.deallocations,
      failed_allocations: self.failed_allocations,
      ..PoolStats::default()
    };

    for block in self.blocks.iter() {
      stats.block_count += 1;
      if block.is_free {
        stats.free_blocks += 1;
        stats.free_bytes += block.size;
        stats.largest_free = stats.largest_free.max(block.size);
      } else {
        stats.used_bytes += block.size;
      }
    }

    stats
  }

  /// Checks that the descriptors partition `[0, capacity)` exactly, that the
  /// back links agree with the forward links, and that no two neighbours
  /// are both free.
  pub fn check_invariants(&self) -> PoolResult<()> {
    let mut expected_offset = 0;
    let mut prev: Option<BlockId> = None;
    let mut prev_free = false;
    let mut count = 0;

    for id in self.blocks.ids() {
      let block = self.blocks.get(id);
      count += 1;

      if count > self.blocks.len() {
        return Err(PoolError::corruption("block list contains a cycle"));
      }
      if block.prev != prev {
        return Err(PoolError::corruption(format!(
          "block at {} has a stale back link",
          block.offset
        )));
      }
      if block.offset != expected_offset {
        return Err(PoolError::corruption(format!(
          "block at {} should start at {expected_offset}",
          block.offset
        )));
      }
      if block.size == 0 {
        return Err(PoolError::corruption(format!(
          "empty block at {}",
          block.offset
        )));
      }
      if prev_free && block.is_free {
        return Err(PoolError::corruption(format!(
          "free block at {} follows another free block",
          block.offset
        )));
      }

      expected_offset = block.end();
      prev = Some(id);
      prev_free = block.is_free;
    }

    if count != self.blocks.len() {
      return Err(PoolError::corruption(format!(
        "{count} blocks reachable, {} tracked",
        self.blocks.len()
      )));
    }
    if prev != Some(self.blocks.tail()) {
      return Err(PoolError::corruption("tail does not end the list"));
    }
    if expected_offset != self.capacity() {
      return Err(PoolError::corruption(format!(
        "blocks cover {expected_offset} of {} bytes",
        self.capacity()
      )));
    }

    Ok(())
  }

  fn verify(&self) -> PoolResult<()> {
    if self.config.verify_invariants {
      self.check_invariants()
    } else {
      Ok(())
    }
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    debug!(
      pool = %self.id,
      capacity = self.capacity(),
      live = self.allocations - self.deallocations,
      "released pool"
    );
  }
}

impl fmt::Display for Pool {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(
      f,
      "{} ({} bytes, {} blocks)",
      self.id,
      self.capacity(),
      self.blocks.len()
    )?;
    for block in self.blocks.iter() {
      writeln!(
        f,
        "  [{:#06x}, {:#06x}) {:>6} {}",
        block.offset,
        block.end(),
        block.size,
        if block.is_free { "free" } else { "used" }
      )?;
    }
    Ok(())
  }
}

impl fmt::Debug for Pool {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Pool")
      .field("id", &self.id)
      .field("capacity", &self.capacity())
      .field("blocks", &self.blocks().collect::<Vec<_>>())
      .field("config", &self.config)
      .finish()
  }
}
