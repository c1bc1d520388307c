//! Debug-only reentrancy detection.
//!
//! The engine calls into user code (`K: Hash`, `K: Eq`) while its arrays
//! may be mid-update. A key whose `Eq` or `Hash` reaches back into the same
//! map would observe that state, so debug builds panic on nested entry.
//! Release builds carry no field and no check.

#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

/// Per-map tracker. Guard each engine entry point with
/// `let _section = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
        }
    }

    /// Mark the start of a critical section; the returned guard ends it.
    #[inline]
    #[track_caller]
    pub(crate) fn enter(&self) -> Section<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant call into a Dict from its own key's Hash or Eq"
            );
            Section { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Section { _owner: PhantomData }
        }
    }
}

// A fresh map starts outside any section, whatever the source's state.
impl Clone for ReentrancyCheck {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`ReentrancyCheck::enter`].
pub(crate) struct Section<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ReentrancyCheck>,
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
