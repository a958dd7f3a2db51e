//! # rarena - A Monotonic Region Allocator
//!
//! This crate provides a **region allocator** (also known as an arena): memory
//! is handed out from pre-allocated blocks by advancing a cursor, and all of it
//! is released at once when the arena is dropped.
//!
//! ## Overview
//!
//! The arena owns a chain of blocks. Each allocation bumps the cursor of the
//! first block with enough room; when no block has room, a new one is appended
//! at the tail:
//!
//! ```text
//!   Region Allocator Concept:
//!
//!   Arena
//!     │ head
//!     ▼
//!   ┌────────────────────────────────┐  next  ┌────────────────────────────┐
//!   │ Block (256 KiB)                │ ─────▶ │ Block (256 KiB)            │
//!   │ ┌────┬────┬────┬────────────┐  │        │ ┌────┬─────────────────┐   │
//!   │ │ A1 │ A2 │ A3 │    free    │  │        │ │ A4 │      free       │   │
//!   │ └────┴────┴────┴────────────┘  │        │ └────┴─────────────────┘   │
//!   │                 ▲              │        │       ▲                    │
//!   │               cursor           │        │     cursor                 │
//!   └────────────────────────────────┘        └────────────────────────────┘
//!
//!   Each allocation bumps a cursor forward; nothing is ever handed back
//!   until the whole arena is dropped.
//! ```
//!
//! This suits programs that build up many small, short-lived objects (string
//! fragments, parse nodes) whose lifetimes all end together with one logical
//! phase: pay one `malloc` per 256 KiB instead of one per object, then tear
//! the whole phase down in a single sweep.
//!
//! ## Crate Structure
//!
//! ```text
//!   rarena
//!   ├── align      - Word-alignment macro (align!)
//!   ├── block      - Block record and chain growth policy (internal)
//!   └── arena      - Arena implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rarena::Arena;
//!
//! fn main() -> Result<(), rarena::AllocError> {
//!     let mut arena = Arena::new()?;
//!
//!     // Raw scratch space, valid as long as the arena lives.
//!     let scratch = arena.alloc(64)?;
//!     unsafe { std::ptr::write_bytes(scratch.as_ptr(), 0, 64) };
//!
//!     // A NUL-terminated copy of a string, same lifetime.
//!     let name = arena.strdup("parse node")?;
//!     let text = unsafe { std::ffi::CStr::from_ptr(name.as_ptr().cast()) };
//!     assert_eq!("parse node", text.to_str().unwrap());
//!
//!     Ok(())
//! } // arena drops here; scratch and name are gone with it
//! ```
//!
//! ## How It Works
//!
//! Every block buffer comes from one `malloc` call. Requests of up to 256 KiB
//! are served from blocks of exactly 256 KiB; a larger request gets a block of
//! its own, rounded up to a whole number of KiB, so a single allocation never
//! straddles two blocks:
//!
//! ```text
//!   Growth Policy:
//!
//!   request ≤ 256 KiB                 request > 256 KiB
//!   ┌──────────────────────┐          ┌───────────────────────────┐
//!   │  new 256 KiB block   │          │  new block of exactly     │
//!   │  (amortizes many     │          │  ceil(size / 1 KiB) KiB   │
//!   │   small requests)    │          │  (holds this one request) │
//!   └──────────────────────┘          └───────────────────────────┘
//! ```
//!
//! Cursors only ever advance, in multiples of the machine word, so every
//! region starts word-aligned. No stronger alignment is guaranteed.
//!
//! ## Limitations
//!
//! - **No individual deallocation**: regions die with the arena, never alone
//! - **Single-threaded only**: no internal locking; the arena is not `Send`
//!   or `Sync`
//! - **Unbounded growth**: the chain grows until the system allocator refuses
//! - **Linear scan**: every allocation walks the chain from the head, which
//!   is linear in the number of blocks; chains stay short in practice
//!
//! ## Safety
//!
//! Allocation itself is safe; the returned regions are raw pointers, and
//! writing through them or reading them back requires `unsafe`. A region must
//! not be touched after its arena is dropped.

pub mod align;
mod arena;
mod block;

pub use arena::{AllocError, Arena};
pub use block::DEFAULT_CAPACITY;
