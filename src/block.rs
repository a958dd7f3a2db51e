use std::ptr::NonNull;

use libc::c_void;

use crate::{align, arena::AllocError};

/// Capacity of every block created for requests of up to this many bytes.
pub const DEFAULT_CAPACITY: usize = 256 * 1024;

/// Oversize block capacities are rounded up to a whole number of KiB.
const CAPACITY_ROUND: usize = 1024;

/// One link in the arena's chain: a malloc'd buffer and the cursor marking
/// its first free byte. Buffers are never resized or moved, so regions
/// handed out from them stay valid until the arena goes away.
pub struct Block {
  pub buf: NonNull<u8>,
  pub capacity: usize,
  pub cursor: usize,
  pub next: Option<Box<Block>>,
}

impl Block {
  /// The single construction path, used both when the arena is created and
  /// when the chain grows on demand.
  pub fn boxed(capacity: usize) -> Result<Box<Block>, AllocError> {
    let address = unsafe { libc::malloc(capacity) };

    let buf = NonNull::new(address as *mut u8).ok_or(AllocError {
      requested: capacity,
    })?;

    Ok(Box::new(Block {
      buf,
      capacity,
      cursor: 0,
      next: None,
    }))
  }

  /// Capacity for a block appended to satisfy a request of `size` bytes:
  /// the default capacity, or for oversize requests `size` rounded up to
  /// the next KiB so the request never spans two blocks.
  pub fn grown_capacity(size: usize) -> usize {
    if size <= DEFAULT_CAPACITY {
      DEFAULT_CAPACITY
    } else {
      // A size too large to round is handed to the system allocator
      // unrounded; it refuses it and that surfaces as AllocError.
      size.checked_next_multiple_of(CAPACITY_ROUND).unwrap_or(size)
    }
  }

  pub fn remaining(&self) -> usize {
    self.capacity - self.cursor
  }

  /// Hands out the region at the cursor and advances it by the
  /// word-rounded size. The caller has already checked the fit; capacity
  /// and cursor are both word multiples, so the rounded advance fits too.
  pub fn bump(
    &mut self,
    size: usize,
  ) -> NonNull<u8> {
    debug_assert!(size <= self.remaining());

    let region = unsafe { NonNull::new_unchecked(self.buf.as_ptr().add(self.cursor)) };
    self.cursor += align!(size);

    debug_assert!(self.cursor <= self.capacity);

    region
  }
}

impl Drop for Block {
  fn drop(&mut self) {
    unsafe { libc::free(self.buf.as_ptr() as *mut c_void) }
  }
}
