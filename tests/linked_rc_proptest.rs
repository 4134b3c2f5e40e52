use linked_rc::LinkedRc;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

// Model operations on a pool of handles and assert group bookkeeping matches
// pointer-identity aliasing plus per-object destruction counters.
proptest! {
    #[test]
    fn prop_linked_rc_group_tracking(
        ops in proptest::collection::vec((0u8..=6u8, 0usize..100, 0usize..100), 1..120),
    ) {
        let destroyed: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let mut handles: Vec<LinkedRc<usize>> = Vec::new();

        for (op, raw_i, raw_j) in ops {
            match op {
                // Create a fresh sole owner with a counting strategy
                0 => {
                    let id = destroyed.borrow().len();
                    destroyed.borrow_mut().push(0);
                    let tally = destroyed.clone();
                    handles.push(LinkedRc::new_with(id, move |p| {
                        tally.borrow_mut()[id] += 1;
                        // Safety: `p` came from new_with's box; released here once.
                        unsafe { drop(Box::from_raw(p)) };
                    }));
                }
                // Clone an existing handle
                1 => {
                    if !handles.is_empty() {
                        let i = raw_i % handles.len();
                        let cloned = handles[i].clone();
                        handles.push(cloned);
                    }
                }
                // Drop an existing handle
                2 => {
                    if !handles.is_empty() {
                        let i = raw_i % handles.len();
                        drop(handles.swap_remove(i));
                    }
                }
                // Reset in place; the emptied handle stays in the pool
                3 => {
                    if !handles.is_empty() {
                        let i = raw_i % handles.len();
                        handles[i].reset();
                    }
                }
                // Swap two handles
                4 => {
                    if handles.len() >= 2 {
                        let i = raw_i % handles.len();
                        let j = raw_j % handles.len();
                        if i != j {
                            let (lo, hi) = (i.min(j), i.max(j));
                            let (left, right) = handles.split_at_mut(hi);
                            left[lo].swap(&mut right[0]);
                        }
                    }
                }
                // Take: move the slot out, leaving an empty handle behind
                5 => {
                    if !handles.is_empty() {
                        let i = raw_i % handles.len();
                        let taken = handles[i].take();
                        prop_assert!(handles[i].is_empty());
                        handles.push(taken);
                    }
                }
                // Assignment via clone_from
                6 => {
                    if handles.len() >= 2 {
                        let i = raw_i % handles.len();
                        let j = raw_j % handles.len();
                        if i != j {
                            let src = handles[j].clone();
                            handles[i].clone_from(&src);
                        }
                    }
                }
                _ => unreachable!(),
            }

            // Invariants after each step.
            for h in &handles {
                match h.as_ptr() {
                    None => prop_assert!(h.is_unique()),
                    Some(p) => {
                        let aliases = handles
                            .iter()
                            .filter(|o| o.as_ptr() == Some(p))
                            .count();
                        prop_assert_eq!(h.owner_count(), aliases);
                        prop_assert_eq!(h.is_unique(), aliases == 1);
                    }
                }
            }
            let tallies = destroyed.borrow();
            for (id, count) in tallies.iter().enumerate() {
                let live = handles.iter().any(|h| h.get() == Some(&id));
                prop_assert_eq!(*count, if live { 0 } else { 1 });
            }
        }

        // Teardown: every object destroyed exactly once.
        handles.clear();
        let tallies = destroyed.borrow();
        for count in tallies.iter() {
            prop_assert_eq!(*count, 1);
        }
    }
}
