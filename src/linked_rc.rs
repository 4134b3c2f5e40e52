//! `LinkedRc`: the owning handle.
//!
//! Every handle embeds one [`ChainNode`]; all handles aliasing one pointee
//! are linked into one chain, and the pointee is destroyed exactly when the
//! last of them resets or drops. Unlike `Rc`, comparison, ordering and
//! hashing are by pointer identity, never by pointee content, so handles
//! behave as identities in ordered and hashed containers.

use crate::chain::ChainNode;
use crate::destroy::{self, Destroy};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem;
use core::ops::Deref;
use core::ptr::NonNull;

/// A single-threaded shared-ownership pointer whose co-owners form a linked
/// chain instead of sharing a reference count.
///
/// Either the handle is empty (`target` absent, chain node unlinked, no
/// strategy), or `target` is present and the node belongs to exactly the
/// group of handles aliasing that pointer value. Cloning joins the group;
/// dropping or [`reset`](LinkedRc::reset) leaves it, destroying the pointee
/// if no other owner remains.
///
/// `PartialEq`, `Ord` and `Hash` compare the pointer value, never the
/// pointee, which differs from `Rc`.
pub struct LinkedRc<T: ?Sized> {
    target: Option<NonNull<T>>,
    node: ChainNode,
    strategy: Option<NonNull<dyn Destroy>>,
    // !Send + !Sync like Rc; the chain arena is thread-local.
    _nosend: PhantomData<*mut ()>,
}

impl<T> LinkedRc<T> {
    /// Box `value` and become its sole owner.
    pub fn new(value: T) -> Self {
        let target = NonNull::from(Box::leak(Box::new(value)));
        Self {
            target: Some(target),
            node: ChainNode::solo(),
            strategy: None,
            _nosend: PhantomData,
        }
    }

    /// Box `value` and become its sole owner, with a custom destruction
    /// strategy. When the last owner leaves the group, `destroy` is called
    /// exactly once with the pointer (obtained from `Box::into_raw`) and is
    /// responsible for releasing it.
    pub fn new_with<F>(value: T, destroy: F) -> Self
    where
        T: 'static,
        F: FnOnce(*mut T) + 'static,
    {
        let target = NonNull::from(Box::leak(Box::new(value)));
        Self {
            target: Some(target),
            node: ChainNode::solo(),
            strategy: Some(destroy::erase(target, destroy)),
            _nosend: PhantomData,
        }
    }
}

impl<T: ?Sized> LinkedRc<T> {
    /// Empty handle: no pointee, sole, no strategy.
    pub fn empty() -> Self {
        Self {
            target: None,
            node: ChainNode::solo(),
            strategy: None,
            _nosend: PhantomData,
        }
    }

    /// Adopt a pre-existing raw pointer as sole owner. A null `ptr` yields
    /// an empty handle.
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `Box::into_raw` (the default strategy
    /// reconstructs the box), and the caller must not release it elsewhere
    /// nor wrap it into a second, independent handle; two groups over one
    /// pointer release it twice.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self {
            target: NonNull::new(ptr),
            node: ChainNode::solo(),
            strategy: None,
            _nosend: PhantomData,
        }
    }

    /// Adopt a pre-existing raw pointer as sole owner, with a custom
    /// destruction strategy. A null `ptr` yields an empty handle and drops
    /// `destroy` uninvoked.
    ///
    /// # Safety
    ///
    /// The caller must not release `ptr` elsewhere nor wrap it into a second,
    /// independent handle. `destroy` is called exactly once with `ptr` when
    /// the last owner leaves the group and must release it.
    pub unsafe fn from_raw_with<F>(ptr: *mut T, destroy: F) -> Self
    where
        T: 'static,
        F: FnOnce(*mut T) + 'static,
    {
        match NonNull::new(ptr) {
            Some(target) => Self {
                target: Some(target),
                node: ChainNode::solo(),
                strategy: Some(destroy::erase(target, destroy)),
                _nosend: PhantomData,
            },
            None => Self::empty(),
        }
    }

    /// Borrow the pointee, or `None` for an empty handle.
    pub fn get(&self) -> Option<&T> {
        // Safety: the target is alive while any group member holds it, and
        // this member cannot leave the group while `&self` is borrowed
        // (the same liveness argument as `Rc::deref`).
        self.target.map(|p| unsafe { p.as_ref() })
    }

    /// Mutably borrow the pointee, only when this handle is the sole owner
    /// (otherwise other handles could observe the pointee concurrently).
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.target.is_some() && self.node.is_sole() {
            // Safety: sole owner plus `&mut self` means exclusive access,
            // under the `from_raw` no-second-group contract.
            self.target.as_mut().map(|p| unsafe { p.as_mut() })
        } else {
            None
        }
    }

    /// The pointee's address, without transferring ownership.
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.target
    }

    /// True iff this handle has no pointee. An empty handle is also
    /// [`is_unique`](LinkedRc::is_unique) by invariant.
    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    /// True iff no other handle shares this handle's pointee. O(1).
    pub fn is_unique(&self) -> bool {
        self.node.is_sole()
    }

    /// Number of handles in this handle's group, including itself; 1 for an
    /// empty handle. Walks the chain, O(owners).
    pub fn owner_count(&self) -> usize {
        self.node.chain_len()
    }

    /// Leave the group. If this handle was the sole owner, the pointee is
    /// destroyed through the group's strategy (or by dropping the
    /// reconstructed box if none was set) and the strategy is destroyed with
    /// it; otherwise the remaining owners are untouched. Afterwards the
    /// handle is empty with no strategy. Dropping a handle does the same.
    pub fn reset(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };
        let strategy = self.strategy.take();
        if self.node.is_sole() {
            // Chain bookkeeping is already consistent here, so the pointee's
            // destructor may freely create and drop other handles.
            match strategy {
                // Safety: sole owner, so this is the one consumption of the
                // group's strategy box.
                Some(s) => unsafe { Box::from_raw(s.as_ptr()).destroy() },
                // Safety: sole owner of a pointer that came from
                // `Box::into_raw` (constructor or `from_raw` contract).
                None => unsafe { drop(Box::from_raw(target.as_ptr())) },
            }
        } else {
            self.node.unlink();
        }
    }

    /// `reset()`, then adopt `ptr` as a fresh sole owner.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](LinkedRc::from_raw).
    pub unsafe fn reset_raw(&mut self, ptr: *mut T) {
        self.reset();
        self.target = NonNull::new(ptr);
    }

    /// `reset()`, then adopt `ptr` with a custom strategy as a fresh sole
    /// owner. The strategy is typed exactly as at construction.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw_with`](LinkedRc::from_raw_with).
    pub unsafe fn reset_raw_with<F>(&mut self, ptr: *mut T, destroy: F)
    where
        T: 'static,
        F: FnOnce(*mut T) + 'static,
    {
        self.reset();
        if let Some(target) = NonNull::new(ptr) {
            self.target = Some(target);
            self.strategy = Some(destroy::erase(target, destroy));
        }
    }

    /// Move this handle's ownership slot out, leaving `self` empty, sole and
    /// strategy-free. The returned handle occupies exactly the chain position
    /// `self` occupied, so the group's size is unchanged.
    pub fn take(&mut self) -> Self {
        let mut out = Self::empty();
        out.swap(self);
        out
    }

    /// Exchange pointee, chain membership and strategy with `other` as one
    /// unit. When both handles already alias the same pointer (which covers
    /// two members of one group, and two empty handles) this is a no-op, so
    /// neither group's composition changes.
    pub fn swap(&mut self, other: &mut Self) {
        if self.thin() == other.thin() {
            return;
        }
        mem::swap(&mut self.target, &mut other.target);
        self.node.swap_membership(&other.node);
        mem::swap(&mut self.strategy, &mut other.strategy);
    }

    /// Copy this handle into one aliasing the same pointee under a wider
    /// type, e.g. `|x| x as &dyn Trait`. The new handle joins this handle's
    /// group and shares its strategy; destruction still happens exactly once,
    /// whichever handle leaves last.
    ///
    /// # Safety
    ///
    /// `widen` must return the pointee itself re-viewed as `U` (an unsizing
    /// upcast), never a field or another object: the group's default
    /// destruction path releases whatever address the last owner holds.
    pub unsafe fn share_as<U, F>(&self, widen: F) -> LinkedRc<U>
    where
        U: ?Sized,
        F: FnOnce(&T) -> &U,
    {
        let Some(p) = self.target else {
            return LinkedRc::empty();
        };
        // Safety: group liveness, as in `get`.
        let wide = NonNull::from(widen(unsafe { p.as_ref() }));
        debug_assert_eq!(
            wide.as_ptr() as *const (),
            p.as_ptr() as *const (),
            "share_as must re-view the pointee itself",
        );
        let node = ChainNode::solo();
        node.join(&self.node);
        LinkedRc {
            target: Some(wide),
            node,
            strategy: self.strategy,
            _nosend: PhantomData,
        }
    }

    /// Thin address for identity comparisons; null when empty.
    fn thin(&self) -> *const () {
        match self.target {
            Some(p) => p.as_ptr() as *const (),
            None => core::ptr::null(),
        }
    }
}

impl<T: ?Sized> Clone for LinkedRc<T> {
    /// Join the source's group, sharing its pointee and strategy. Cloning an
    /// empty handle yields an independent empty handle.
    fn clone(&self) -> Self {
        let node = ChainNode::solo();
        if self.target.is_some() {
            node.join(&self.node);
        } else {
            debug_assert!(self.strategy.is_none());
        }
        Self {
            target: self.target,
            node,
            strategy: self.strategy,
            _nosend: PhantomData,
        }
    }

    /// Assignment: a no-op when both sides already alias the same pointer,
    /// otherwise clone-then-swap, so the previous state of `self` is released
    /// through the ordinary drop path of the temporary.
    fn clone_from(&mut self, source: &Self) {
        if self.thin() == source.thin() {
            return;
        }
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<T: ?Sized> Default for LinkedRc<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Drop for LinkedRc<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

/// Conversion from the unique-ownership source type, consuming it. The box's
/// allocation is adopted as-is; no strategy is installed.
impl<T: ?Sized> From<Box<T>> for LinkedRc<T> {
    fn from(boxed: Box<T>) -> Self {
        Self {
            target: Some(NonNull::from(Box::leak(boxed))),
            node: ChainNode::solo(),
            strategy: None,
            _nosend: PhantomData,
        }
    }
}

impl<T: ?Sized> Deref for LinkedRc<T> {
    type Target = T;

    /// Panics on an empty handle; check with
    /// [`is_empty`](LinkedRc::is_empty) or use [`get`](LinkedRc::get).
    fn deref(&self) -> &T {
        match self.get() {
            Some(r) => r,
            None => panic!("dereferenced an empty LinkedRc"),
        }
    }
}

// Identity comparisons: the pointer value, never the pointee. All members of
// one group compare equal; empty handles compare equal to each other.
impl<T: ?Sized> PartialEq for LinkedRc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.thin() == other.thin()
    }
}

impl<T: ?Sized> Eq for LinkedRc<T> {}

impl<T: ?Sized> PartialOrd for LinkedRc<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for LinkedRc<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.thin().cmp(&other.thin())
    }
}

impl<T: ?Sized> Hash for LinkedRc<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.thin() as usize).hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for LinkedRc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(p) => write!(f, "LinkedRc({:p})", p),
            None => f.write_str("LinkedRc(empty)"),
        }
    }
}
