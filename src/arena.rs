use std::{iter, ptr, ptr::NonNull};

use log::trace;
use thiserror::Error;

use crate::block::{Block, DEFAULT_CAPACITY};

/// The system allocator refused to supply memory for a block buffer.
///
/// This is the only failure the arena knows: it is not retried and nothing
/// is rolled back, because a failed block is never linked into the chain in
/// the first place.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("system allocator refused {requested} bytes")]
pub struct AllocError {
  pub requested: usize,
}

/// A monotonic region allocator.
///
/// Memory is handed out from a chain of pre-allocated blocks by advancing a
/// cursor, and released all at once when the arena is dropped. Regions
/// returned by [`alloc`](Arena::alloc) and [`strdup`](Arena::strdup) stay
/// valid and keep their address for the arena's remaining lifetime; they
/// are never freed individually.
///
/// The arena holds raw pointers and is neither `Send` nor `Sync`; use one
/// arena per thread or serialize access externally.
pub struct Arena {
  head: Box<Block>,
}

impl Arena {
  /// Creates an arena with a single block of [`DEFAULT_CAPACITY`] bytes.
  pub fn new() -> Result<Self, AllocError> {
    Ok(Self {
      head: Block::boxed(DEFAULT_CAPACITY)?,
    })
  }

  /// Returns a region of at least `size` writable bytes from the first
  /// block in the chain that has room, appending a new block when none
  /// does. The region starts on a word-aligned address.
  ///
  /// A request for zero bytes returns the current cursor position without
  /// advancing it.
  pub fn alloc(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    // The scan restarts at the head on every call, so allocation is
    // linear in the number of blocks. Chains stay short in practice: one
    // block until 256 KiB of cumulative demand, one more per 256 KiB
    // after that.
    let mut block = &mut self.head;

    loop {
      if size <= block.remaining() {
        return Ok(block.bump(size));
      }

      match block.next {
        Some(ref mut next) => block = next,
        None => {
          let capacity = Block::grown_capacity(size);

          trace!("no room for {size} bytes, appending a {capacity} byte block");

          // The fresh block is sized to fit the request, so it can serve
          // the region before being linked in. A failed construction
          // propagates here and leaves the chain untouched.
          let mut fresh = Block::boxed(capacity)?;
          let region = fresh.bump(size);
          block.next = Some(fresh);

          return Ok(region);
        }
      }
    }
  }

  /// Copies `s` into the arena followed by a NUL terminator and returns
  /// the start of the copy, `s.len() + 1` bytes long. Interior NUL bytes
  /// are copied verbatim.
  pub fn strdup(
    &mut self,
    s: &str,
  ) -> Result<NonNull<u8>, AllocError> {
    let region = self.alloc(s.len() + 1)?;

    unsafe {
      ptr::copy_nonoverlapping(s.as_ptr(), region.as_ptr(), s.len());
      region.as_ptr().add(s.len()).write(0);
    }

    Ok(region)
  }

  /// Number of blocks in the chain.
  pub fn block_count(&self) -> usize {
    self.blocks().count()
  }

  /// Total buffer bytes owned across all blocks.
  pub fn capacity(&self) -> usize {
    self.blocks().map(|block| block.capacity).sum()
  }

  /// Bytes consumed across all blocks, alignment padding included.
  pub fn allocated_bytes(&self) -> usize {
    self.blocks().map(|block| block.cursor).sum()
  }

  fn blocks(&self) -> impl Iterator<Item = &Block> {
    iter::successors(Some(&*self.head), |block| block.next.as_deref())
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    // Unlink the chain iteratively, head to tail, so a long chain cannot
    // recurse through nested box drops. Each block frees its own buffer.
    let mut next = self.head.next.take();

    while let Some(mut block) = next {
      next = block.next.take();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{ffi::CStr, mem, slice};

  use super::*;
  use crate::align;

  #[test]
  fn test_new_arena_has_one_default_block() {
    let arena = Arena::new().unwrap();

    assert_eq!(1, arena.block_count());
    assert_eq!(DEFAULT_CAPACITY, arena.capacity());
    assert_eq!(0, arena.allocated_bytes());
  }

  #[test]
  fn test_regions_are_disjoint_and_writable() {
    let mut arena = Arena::new().unwrap();
    let sizes = [1usize, 7, 8, 16, 100, 3];

    let regions: Vec<NonNull<u8>> = sizes
      .iter()
      .map(|&size| arena.alloc(size).unwrap())
      .collect();

    // Fill each region with its own marker, then check every byte after
    // all the writes: an overlap would have clobbered an earlier marker.
    for (index, (&region, &size)) in regions.iter().zip(sizes.iter()).enumerate() {
      unsafe { ptr::write_bytes(region.as_ptr(), index as u8 + 1, size) };
    }

    for (index, (&region, &size)) in regions.iter().zip(sizes.iter()).enumerate() {
      let bytes = unsafe { slice::from_raw_parts(region.as_ptr(), size) };

      assert!(bytes.iter().all(|&byte| byte == index as u8 + 1));
    }
  }

  #[test]
  fn test_regions_are_word_aligned() {
    let mut arena = Arena::new().unwrap();

    for size in [1usize, 2, 3, 9, 17, 100] {
      let region = arena.alloc(size).unwrap();

      assert_eq!(0, region.as_ptr() as usize % mem::size_of::<usize>());
    }
  }

  #[test]
  fn test_small_allocations_stay_in_one_block() {
    let mut arena = Arena::new().unwrap();

    // 64 KiB of cumulative demand, well under one block.
    for _ in 0..1024 {
      arena.alloc(64).unwrap();
    }

    assert_eq!(1, arena.block_count());
    assert_eq!(64 * 1024, arena.allocated_bytes());
  }

  #[test]
  fn test_growth_happens_exactly_at_the_boundary() {
    let mut arena = Arena::new().unwrap();
    let chunk = 1024;

    for _ in 0..DEFAULT_CAPACITY / chunk {
      arena.alloc(chunk).unwrap();

      assert_eq!(1, arena.block_count());
    }

    // The head block is now exactly full; the next request opens a second.
    arena.alloc(chunk).unwrap();

    assert_eq!(2, arena.block_count());
    assert_eq!(2 * DEFAULT_CAPACITY, arena.capacity());
  }

  #[test]
  fn test_oversize_request_gets_a_rounded_block() {
    let mut arena = Arena::new().unwrap();

    arena.alloc(10).unwrap();
    arena.alloc(300_000).unwrap();

    assert_eq!(2, arena.block_count());

    // The head block keeps its default capacity with one word-rounded
    // allocation consumed; the 300000 byte request got its own block
    // rounded up to the next KiB.
    assert_eq!(DEFAULT_CAPACITY, arena.head.capacity);
    assert_eq!(align!(10), arena.head.cursor);
    assert_eq!(300_032, arena.head.next.as_ref().unwrap().capacity);
  }

  #[test]
  fn test_scan_restarts_from_head() {
    let mut arena = Arena::new().unwrap();

    let first = arena.alloc(16).unwrap();
    arena.alloc(300_000).unwrap();

    // The head block still has room, so a small request lands right
    // after the first one even though the chain has grown past it.
    let second = arena.alloc(16).unwrap();

    assert_eq!(2, arena.block_count());
    assert_eq!(16, second.as_ptr() as usize - first.as_ptr() as usize);
  }

  #[test]
  fn test_regions_survive_chain_growth() {
    let mut arena = Arena::new().unwrap();

    let region = arena.strdup("stable").unwrap();

    for _ in 0..4 {
      arena.alloc(DEFAULT_CAPACITY).unwrap();
    }

    assert_eq!(5, arena.block_count());

    let bytes = unsafe { slice::from_raw_parts(region.as_ptr(), 7) };

    assert_eq!(&b"stable\0"[..], bytes);
  }

  #[test]
  fn test_strdup_round_trips() {
    let mut arena = Arena::new().unwrap();

    let region = arena.strdup("hello").unwrap();
    let bytes = unsafe { slice::from_raw_parts(region.as_ptr(), 6) };

    assert_eq!(&b"hello\0"[..], bytes);

    let text = unsafe { CStr::from_ptr(region.as_ptr().cast()) };

    assert_eq!("hello", text.to_str().unwrap());
    assert_eq!(align!(6), arena.allocated_bytes());
  }

  #[test]
  fn test_strdup_empty_string() {
    let mut arena = Arena::new().unwrap();

    let region = arena.strdup("").unwrap();

    assert_eq!(0, unsafe { region.as_ptr().read() });
  }

  #[test]
  fn test_strdup_keeps_interior_nul_bytes() {
    let mut arena = Arena::new().unwrap();

    let region = arena.strdup("a\0b").unwrap();
    let bytes = unsafe { slice::from_raw_parts(region.as_ptr(), 4) };

    assert_eq!(&b"a\0b\0"[..], bytes);
  }

  #[test]
  fn test_zero_size_alloc_does_not_advance() {
    let mut arena = Arena::new().unwrap();

    let first = arena.alloc(0).unwrap();
    let second = arena.alloc(0).unwrap();

    assert_eq!(first, second);
    assert_eq!(0, arena.allocated_bytes());

    // The next real allocation starts where the zero-size ones pointed.
    let third = arena.alloc(8).unwrap();

    assert_eq!(first, third);
    assert_eq!(8, arena.allocated_bytes());
  }

  #[test]
  fn test_impossible_request_reports_failure() {
    let mut arena = Arena::new().unwrap();

    let error = arena.alloc(usize::MAX / 2).unwrap_err();

    assert!(error.requested >= usize::MAX / 2);

    // The failed block was never linked in; the arena is still usable.
    assert_eq!(1, arena.block_count());
    assert!(arena.alloc(16).is_ok());
  }

  #[test]
  fn test_alloc_error_message_names_the_request() {
    let error = AllocError { requested: 4096 };

    assert_eq!("system allocator refused 4096 bytes", error.to_string());
  }

  #[test]
  fn test_teardown_releases_a_grown_chain() {
    let mut arena = Arena::new().unwrap();

    for _ in 0..8 {
      arena.strdup("short lived").unwrap();
      arena.alloc(DEFAULT_CAPACITY).unwrap();
    }

    assert!(arena.block_count() > 1);

    drop(arena);
  }
}
