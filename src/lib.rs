//! linked-rc: a single-threaded shared-ownership pointer that tracks its
//! co-owners in a doubly-linked chain instead of a reference count.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: deterministic "destroy exactly when the last owner leaves"
//!   semantics without a control block, built in small layers so each piece
//!   can be reasoned about independently.
//! - Layers:
//!   - chain: structural layer. A thread-local slotmap arena stores the
//!     `prev`/`next` links of every live chain node; a `ChainNode` owns one
//!     slot. Stable generational keys stand in for raw back-pointers, so
//!     moving a handle never invalidates a neighbor's link.
//!   - destroy: type-erased destruction strategies. One-method trait plus a
//!     generic adapter over any callable; the adapter captures the pointer
//!     as typed at construction.
//!   - LinkedRc<T>: public handle owning a raw pointer, one chain node and
//!     an optional shared strategy; all clone/move/reset/swap/compare edge
//!     cases live here.
//!
//! Constraints
//! - Single-threaded: handles are `!Send`/`!Sync` (no atomics); the arena is
//!   `thread_local!`.
//! - Group membership is the ownership record: a node with no neighbors is
//!   the sole owner. There is no count to overflow.
//! - O(1) link/unlink/uniqueness checks; group-size queries walk the chain.
//! - Sharing happens only through `Clone`/`share_as`; wrapping one pointer
//!   twice is a documented `from_raw` contract violation, not detectable at
//!   runtime.
//!
//! Why this split?
//! - Localize invariants: the chain layer guarantees link consistency, the
//!   handle layer guarantees exactly-once destruction on top of it.
//! - Minimize unsafe: all raw-pointer dereferencing and `Box::from_raw`
//!   reconstruction is confined to `linked_rc` and `destroy`; link
//!   bookkeeping is safe slotmap indexing.
//!
//! Reentrancy and user code
//! - The arena is only borrowed for bounded link edits and is released
//!   before any user code (pointee destructors, custom strategies) runs, so
//!   destructors may freely create, clone and drop other handles.
//!
//! Notes and non-goals
//! - No weak handles.
//! - No cycle detection: a cycle of pointees each holding a handle to the
//!   next leaks, exactly as with `Rc`.
//! - Equality, ordering and hashing are pointer-identity, never pointee
//!   content; see `LinkedRc`'s docs.
//! - Public API surface is `LinkedRc`; lower layers are implementation
//!   details.

mod chain;
mod destroy;
mod linked_rc;

// Public surface
pub use linked_rc::LinkedRc;
