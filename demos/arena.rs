use std::{ptr, slice};

use rarena::{Arena, DEFAULT_CAPACITY};

/// Prints the arena's chain state: how many blocks it owns, how much buffer
/// space they add up to, and how much of it has been consumed.
fn print_chain(
  label: &str,
  arena: &Arena,
) {
  println!(
    "[{}] blocks = {}, capacity = {} bytes, allocated = {} bytes",
    label,
    arena.block_count(),
    arena.capacity(),
    arena.allocated_bytes(),
  );
}

fn main() -> Result<(), rarena::AllocError> {
  // Run with RUST_LOG=trace to watch the chain grow block by block.
  env_logger::init();

  let mut arena = Arena::new()?;
  print_chain("start", &arena);

  // --------------------------------------------------------------------
  // 1) A handful of small allocations. They all land in the head block;
  //    each one just advances the cursor by its word-rounded size.
  // --------------------------------------------------------------------
  println!("\n[1] Allocate a few small regions");

  for size in [4usize, 12, 100] {
    let region = arena.alloc(size)?;

    unsafe { ptr::write_bytes(region.as_ptr(), 0xAB, size) };

    println!("[1] {size:>3} bytes at {:?}", region.as_ptr());
  }

  print_chain("after small allocations", &arena);

  // --------------------------------------------------------------------
  // 2) Duplicate a string into the arena. The copy is NUL-terminated and
  //    lives exactly as long as the arena does.
  // --------------------------------------------------------------------
  println!("\n[2] Duplicate a string");

  let greeting = arena.strdup("hello, region")?;
  let bytes = unsafe { slice::from_raw_parts(greeting.as_ptr(), "hello, region".len()) };

  println!(
    "[2] copied {:?} to {:?}",
    String::from_utf8_lossy(bytes),
    greeting.as_ptr(),
  );

  // --------------------------------------------------------------------
  // 3) A request larger than the default block capacity. It gets a block
  //    of its own, rounded up to a whole number of KiB.
  // --------------------------------------------------------------------
  println!("\n[3] Allocate 300000 bytes (more than one default block holds)");

  let big = arena.alloc(300_000)?;

  println!("[3] large region at {:?}", big.as_ptr());
  print_chain("after oversize allocation", &arena);

  // --------------------------------------------------------------------
  // 4) Small requests keep landing in the head block: the scan restarts
  //    there on every call, and it still has room.
  // --------------------------------------------------------------------
  println!("\n[4] Allocate 8 more bytes (served from the head block again)");

  let small = arena.alloc(8)?;

  println!("[4] small region at {:?}", small.as_ptr());

  // --------------------------------------------------------------------
  // 5) A request none of the existing blocks can hold forces another
  //    default-sized block onto the chain.
  // --------------------------------------------------------------------
  println!("\n[5] Allocate {DEFAULT_CAPACITY} bytes to force another block");

  arena.alloc(DEFAULT_CAPACITY)?;
  print_chain("after forced growth", &arena);

  // --------------------------------------------------------------------
  // 6) End of demo. Dropping the arena releases every block in one sweep;
  //    all the regions printed above die with it.
  // --------------------------------------------------------------------
  println!("\n[6] Dropping the arena releases everything at once.");

  Ok(())
}
