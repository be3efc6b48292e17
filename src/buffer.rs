use std::{io, ptr::{self, NonNull}, slice};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};
use tracing::warn;

use crate::error::{PoolError, PoolResult};

/// Backing memory for one pool: an anonymous private mapping, zero-filled by
/// the kernel and unmapped on drop.
pub(crate) struct Buffer {
  ptr: NonNull<u8>,
  len: usize,
}

// SAFETY: the mapping is uniquely owned by `Buffer`; no thread-local state is
// attached to it, so ownership can move between threads.
unsafe impl Send for Buffer {}

// SAFETY: `&Buffer` only hands out `&[u8]`; writes require `&mut Buffer`.
unsafe impl Sync for Buffer {}

impl Buffer {
  pub fn map(len: usize) -> PoolResult<Self> {
    // SAFETY: anonymous mapping with no fixed address; the kernel picks the
    // placement and the result is checked against MAP_FAILED.
    let address = unsafe {
      mmap(
        ptr::null_mut(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(PoolError::BackingStore {
        size: len,
        source: io::Error::last_os_error(),
      });
    }

    let ptr = NonNull::new(address.cast::<u8>()).ok_or_else(|| PoolError::BackingStore {
      size: len,
      source: io::Error::other("mmap returned a null mapping"),
    })?;

    Ok(Self { ptr, len })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn as_slice(&self) -> &[u8] {
    // SAFETY: `ptr` points at `len` readable bytes for as long as `self` lives.
    unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [u8] {
    // SAFETY: as above, and `&mut self` guarantees exclusive access.
    unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
  }
}

impl Drop for Buffer {
  fn drop(&mut self) {
    // SAFETY: `ptr`/`len` describe exactly the mapping created in `map`.
    let rc = unsafe { munmap(self.ptr.as_ptr().cast::<c_void>(), self.len) };
    if rc != 0 {
      warn!(
        len = self.len,
        error = %io::Error::last_os_error(),
        "failed to unmap pool backing memory"
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mapping_is_zeroed_and_writable() {
    let mut buffer = Buffer::map(4096).unwrap();

    assert_eq!(buffer.len(), 4096);
    assert!(buffer.as_slice().iter().all(|&byte| byte == 0));

    buffer.as_mut_slice()[4095] = 0x7F;
    assert_eq!(buffer.as_slice()[4095], 0x7F);
  }

  #[test]
  fn test_odd_sized_mapping() {
    let buffer = Buffer::map(1000).unwrap();

    assert_eq!(buffer.as_slice().len(), 1000);
  }
}
