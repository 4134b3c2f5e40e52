//! Chain registry: the structural layer behind ownership groups.
//!
//! Every live [`ChainNode`] owns one slot in a thread-local slotmap arena;
//! the slot stores the node's `prev`/`next` links as generational keys.
//! Neighbors reference keys, never addresses, so moving a `ChainNode` (or
//! the handle embedding it) never invalidates anyone's links. No user code
//! runs while the arena is borrowed.

use core::cell::RefCell;
use core::marker::PhantomData;
use slotmap::{DefaultKey, SlotMap};

#[derive(Copy, Clone, Debug, Default)]
struct Links {
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

thread_local! {
    static CHAINS: RefCell<SlotMap<DefaultKey, Links>> = RefCell::new(SlotMap::new());
}

fn with_chains<R>(f: impl FnOnce(&mut SlotMap<DefaultKey, Links>) -> R) -> R {
    CHAINS.with(|c| f(&mut *c.borrow_mut()))
}

/// Splice `node` immediately before `target`, leaving its current chain
/// first. `node == target` is a no-op.
fn join_keys(chains: &mut SlotMap<DefaultKey, Links>, node: DefaultKey, target: DefaultKey) {
    if node == target {
        return;
    }
    unlink_key(chains, node);
    let target_prev = chains[target].prev;
    chains[node] = Links {
        prev: target_prev,
        next: Some(target),
    };
    if let Some(p) = target_prev {
        debug_assert_eq!(chains[p].next, Some(target));
        chains[p].next = Some(node);
    }
    chains[target].prev = Some(node);
}

/// Bridge neighbors around `node` and clear its own links. Idempotent.
fn unlink_key(chains: &mut SlotMap<DefaultKey, Links>, node: DefaultKey) {
    let Links { prev, next } = chains[node];
    if let Some(p) = prev {
        debug_assert_eq!(chains[p].next, Some(node));
        chains[p].next = next;
    }
    if let Some(n) = next {
        debug_assert_eq!(chains[n].prev, Some(node));
        chains[n].prev = prev;
    }
    chains[node] = Links::default();
}

/// One membership slot in an ownership chain.
///
/// A node with both links absent is the sole member of its chain. Joining is
/// an explicit operation; `ChainNode` deliberately has no `Clone` impl, so a
/// node cannot enter a chain through a generic copy path.
#[derive(Debug)]
pub(crate) struct ChainNode {
    key: DefaultKey,
    // !Send + !Sync: keys only mean something in this thread's arena.
    _nosend: PhantomData<*mut ()>,
}

impl ChainNode {
    /// Fresh unlinked node.
    pub(crate) fn solo() -> Self {
        let key = with_chains(|chains| chains.insert(Links::default()));
        Self {
            key,
            _nosend: PhantomData,
        }
    }

    /// Join `other`'s chain, splicing in immediately before it. Leaves the
    /// current chain first; joining a node to itself is a no-op.
    pub(crate) fn join(&self, other: &ChainNode) {
        with_chains(|chains| join_keys(chains, self.key, other.key));
    }

    /// Leave the chain, bridging neighbors around this node. Idempotent.
    pub(crate) fn unlink(&self) {
        with_chains(|chains| unlink_key(chains, self.key));
    }

    /// True iff this node is the sole member of its chain. O(1); answers
    /// exactly what `count == 1` would in a count-based design.
    pub(crate) fn is_sole(&self) -> bool {
        with_chains(|chains| {
            let links = chains[self.key];
            links.prev.is_none() && links.next.is_none()
        })
    }

    /// Number of nodes in this node's chain, including itself. O(chain).
    pub(crate) fn chain_len(&self) -> usize {
        with_chains(|chains| {
            let mut n = 1usize;
            let mut cur = chains[self.key].prev;
            while let Some(k) = cur {
                n += 1;
                cur = chains[k].prev;
            }
            cur = chains[self.key].next;
            while let Some(k) = cur {
                n += 1;
                cur = chains[k].next;
            }
            n
        })
    }

    /// Exchange chain membership with `other`: each node's former neighbors
    /// end up referring to the other node. Self-swap is a no-op; swapping two
    /// members of one chain leaves membership unchanged.
    ///
    /// Implemented as two leave-and-rejoin passes: park a marker beside each
    /// node, then rejoin each node at the other's marker. Every intermediate
    /// state keeps all live links pointing at arena-resident slots, so the
    /// algorithm is also correct when the two nodes are adjacent.
    pub(crate) fn swap_membership(&self, other: &ChainNode) {
        if self.key == other.key {
            return;
        }
        with_chains(|chains| {
            let mark_a = chains.insert(Links::default());
            join_keys(chains, mark_a, self.key);
            let mark_b = chains.insert(Links::default());
            join_keys(chains, mark_b, other.key);

            join_keys(chains, self.key, mark_b);
            join_keys(chains, other.key, mark_a);

            unlink_key(chains, mark_a);
            chains.remove(mark_a);
            unlink_key(chains, mark_b);
            chains.remove(mark_b);
        });
    }
}

impl Drop for ChainNode {
    fn drop(&mut self) {
        // try_with: during thread teardown the arena may already be gone,
        // and with it every link this node could dangle from.
        let _ = CHAINS.try_with(|c| {
            let mut chains = c.borrow_mut();
            unlink_key(&mut chains, self.key);
            chains.remove(self.key);
        });
    }
}
