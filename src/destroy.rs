//! Type-erased destruction strategies.
//!
//! A group that was given a custom destructor shares one boxed strategy; the
//! last owner consumes it, which releases the pointee and the strategy box in
//! one step. The adapter captures the pointer as it was typed at
//! construction, so destruction never depends on the (possibly widened) type
//! of whichever handle happens to be last.

use core::ptr::NonNull;

/// One-shot capability that releases a group's pointee.
pub(crate) trait Destroy {
    /// Consume the strategy and release the target it captured.
    fn destroy(self: Box<Self>);
}

/// Adapter invoking an arbitrary callable on the captured pointer.
struct FnDestroy<T: ?Sized, F: FnOnce(*mut T)> {
    target: NonNull<T>,
    f: F,
}

impl<T: ?Sized, F: FnOnce(*mut T)> Destroy for FnDestroy<T, F> {
    fn destroy(self: Box<Self>) {
        let FnDestroy { target, f } = *self;
        f(target.as_ptr());
    }
}

/// Box a callable together with its target and erase both types.
pub(crate) fn erase<T, F>(target: NonNull<T>, f: F) -> NonNull<dyn Destroy>
where
    T: ?Sized + 'static,
    F: FnOnce(*mut T) + 'static,
{
    let boxed: Box<dyn Destroy> = Box::new(FnDestroy { target, f });
    // Box::into_raw never returns null.
    unsafe { NonNull::new_unchecked(Box::into_raw(boxed)) }
}

#[cfg(test)]
mod tests {
    use super::erase;
    use core::ptr::NonNull;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn erased_strategy_fires_once_with_captured_target() {
        let fired = Rc::new(Cell::new(0u32));
        let value = Box::into_raw(Box::new(7i32));
        let target = NonNull::new(value).unwrap();

        let seen = fired.clone();
        let strategy = erase(target, move |p: *mut i32| {
            seen.set(seen.get() + 1);
            // Safety: `p` is the pointer boxed above, released exactly here.
            unsafe { drop(Box::from_raw(p)) };
        });

        // Safety: `strategy` came from `erase` and is consumed exactly once.
        unsafe { Box::from_raw(strategy.as_ptr()).destroy() };
        assert_eq!(fired.get(), 1);
    }
}
