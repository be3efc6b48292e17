//! # rpool - A First-Fit Memory Pool Allocator
//!
//! This crate provides a **pool allocator**: it maps one fixed-size buffer up
//! front and then hands out and reclaims variable-size sub-ranges of it,
//! without going back to the system allocator for individual requests.
//!
//! ## Overview
//!
//! The pool is partitioned by an ordered list of block descriptors. Every
//! byte belongs to exactly one block, and each block is either free or used:
//!
//! ```text
//!   Pool of 1000 bytes after five 200-byte allocations and one free:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        BACKING BUFFER (mmap)                         │
//!   │                                                                      │
//!   │   ┌────────────┬────────────┬────────────┬────────────┬────────────┐ │
//!   │   │   used     │   used     │   free     │   used     │   used     │ │
//!   │   │   200      │   200      │   200      │   200      │   200      │ │
//!   │   └────────────┴────────────┴────────────┴────────────┴────────────┘ │
//!   │   0           200          400          600          800       1000  │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rpool
//!   ├── address    - Opaque block handles and pool identities
//!   ├── allocator  - PoolAllocator: create/allocate/deallocate/destroy facade
//!   ├── block      - Block descriptors and the index-linked list (internal)
//!   ├── buffer     - mmap-backed storage (internal)
//!   ├── config     - PoolConfig and SearchMode
//!   ├── error      - PoolError
//!   ├── pool       - Pool: search, split, coalesce
//!   ├── shared     - SharedPool: a PoolAllocator behind a mutex
//!   └── stats      - PoolStats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpool::{Pool, PoolResult};
//!
//! fn main() -> PoolResult<()> {
//!     let mut pool = Pool::create(1000)?;
//!
//!     let greeting = pool.allocate(5)?;
//!     pool.bytes_mut(greeting)?.copy_from_slice(b"hello");
//!     assert_eq!(pool.bytes(greeting)?, b"hello");
//!
//!     pool.deallocate(greeting)?;
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Allocation walks the blocks in address order and takes the first free one
//! that is large enough. When it is larger than the request, it is split and
//! the used part is taken from its low end:
//!
//! ```text
//!   allocate(150) against a free block of 200:
//!
//!   before   ┌──────────────────────────────┐
//!            │          free 200            │
//!            └──────────────────────────────┘
//!            400                            600
//!
//!   after    ┌──────────────────────┬───────┐
//!            │      used 150        │free 50│
//!            └──────────────────────┴───────┘
//!            400                    550     600
//!                                   ▲
//!                                   └── free block shrinks in place
//! ```
//!
//! Deallocation flips a used block back to free and immediately merges it
//! with a free predecessor and a free successor, so two neighbouring blocks
//! are never both free:
//!
//! ```text
//!   deallocate(B):
//!
//!   ┌────────┬────────┬────────┐        ┌──────────────────────────┐
//!   │ free A │ used B │ free C │  ───▶  │         free A+B+C       │
//!   └────────┴────────┴────────┘        └──────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Explicit pools**: each [`Pool`] is an ordinary value; any number can
//!   coexist
//! - **Checked frees**: double frees, interior addresses, and addresses from
//!   another pool are rejected with [`PoolError::InvalidAddress`]
//! - **Diagnostics**: [`Pool::stats`], [`Pool::blocks`], [`Pool::check_invariants`]
//!   and a `Display` block map
//! - **Optional locking**: [`SharedPool`] serializes access for multiple threads
//!
//! ## Limitations
//!
//! - **Byte granularity**: blocks carry no alignment guarantee
//! - **Linear scans**: allocation and deallocation are O(number of blocks)
//! - **Fixed capacity**: a pool never grows
//! - **Unix-only**: backing memory comes from `mmap(2)` via `libc`

mod address;
mod allocator;
mod block;
mod buffer;
mod config;
mod error;
mod pool;
mod shared;
mod stats;

pub use address::{Address, PoolId};
pub use allocator::PoolAllocator;
pub use block::BlockInfo;
pub use config::{PoolConfig, SearchMode};
pub use error::{PoolError, PoolResult};
pub use pool::Pool;
pub use shared::SharedPool;
pub use stats::PoolStats;
