#![forbid(unsafe_code)]

//! A disposal bin for deferred cleanup callbacks.
//!
//! [`Disposal`] collects zero-argument callbacks — typically the detach
//! closures of [`listen_to`](crate::listen_to) registrations — and flushes
//! them all at once when the owning scope winds down.
//!
//! # Invariants
//!
//! 1. `empty()` invokes every stored callback exactly once, in insertion
//!    order, and leaves the bin empty.
//! 2. The flush is best-effort: a panicking callback does not prevent the
//!    remaining callbacks from running. The first captured panic is resumed
//!    once the flush has finished.
//! 3. Callbacks added *during* a flush (by a running callback) land in the
//!    emptied bin and are not run by the in-flight flush.
//!
//! # Example
//!
//! ```
//! use eventwire::{Disposal, listen_to};
//! use eventwire_dom::{Document, ListenerOptions};
//!
//! let document = Document::new();
//! let mut disposal = Disposal::new();
//!
//! let clicks = listen_to(document.window().as_target(), "click", |_| {}, ListenerOptions::default());
//! let resizes = listen_to(document.window().as_target(), "resize", |_| {}, ListenerOptions::default());
//! disposal.add(move || clicks.off());
//! disposal.add(move || resizes.off());
//!
//! // Flush all cleanup callbacks.
//! disposal.empty();
//! assert!(disposal.is_empty());
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

type Callback = Box<dyn FnOnce()>;

/// An ordered, flush-once-at-a-time collection of cleanup callbacks.
#[derive(Default)]
pub struct Disposal {
    callbacks: Vec<Callback>,
}

impl Disposal {
    /// Create an empty bin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cleanup callback.
    pub fn add(&mut self, callback: impl FnOnce() + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Number of callbacks currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether the bin holds no callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every stored callback in insertion order and clear the bin.
    ///
    /// The bin is drained before the first callback runs, so re-entrant
    /// `add` calls accumulate for a later flush instead of extending this
    /// one. A panicking callback does not stop the flush; the first panic
    /// payload is resumed after every callback has run.
    pub fn empty(&mut self) {
        let callbacks = std::mem::take(&mut self.callbacks);
        let mut first_panic = None;
        for callback in callbacks {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(callback)) {
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }
        if let Some(payload) = first_panic {
            resume_unwind(payload);
        }
    }
}

impl std::fmt::Debug for Disposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposal").field("len", &self.callbacks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn empty_runs_in_insertion_order_and_clears() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut disposal = Disposal::new();
        for i in 0..5 {
            let log = Rc::clone(&order);
            disposal.add(move || log.borrow_mut().push(i));
        }
        assert_eq!(disposal.len(), 5);

        disposal.empty();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
        assert!(disposal.is_empty());
    }

    #[test]
    fn each_callback_runs_exactly_once() {
        let count = Rc::new(RefCell::new(0));
        let mut disposal = Disposal::new();
        let c = Rc::clone(&count);
        disposal.add(move || *c.borrow_mut() += 1);

        disposal.empty();
        disposal.empty(); // bin already empty, nothing re-runs
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn empty_on_fresh_bin_is_noop() {
        let mut disposal = Disposal::new();
        disposal.empty();
        assert!(disposal.is_empty());
    }

    #[test]
    fn panicking_callback_does_not_stop_the_flush() {
        let ran = Rc::new(RefCell::new(false));
        let mut disposal = Disposal::new();
        disposal.add(|| panic!("cleanup failed"));
        let flag = Rc::clone(&ran);
        disposal.add(move || *flag.borrow_mut() = true);

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| disposal.empty()));
        assert!(result.is_err(), "first panic is resumed after the flush");
        assert!(*ran.borrow(), "later callbacks still ran");
        assert!(disposal.is_empty());
    }

    #[test]
    fn reentrant_add_lands_in_next_flush() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let disposal = Rc::new(RefCell::new(Disposal::new()));

        let log = Rc::clone(&order);
        let bin = Rc::clone(&disposal);
        disposal.borrow_mut().add(move || {
            log.borrow_mut().push("first");
            let inner_log = Rc::clone(&log);
            bin.borrow_mut().add(move || inner_log.borrow_mut().push("late"));
        });

        // `empty` drains before running, so the borrow is released while the
        // callback re-enters.
        let mut drained = std::mem::take(&mut *disposal.borrow_mut());
        drained.empty();
        assert_eq!(*order.borrow(), vec!["first"], "re-entrant add is deferred");
        assert_eq!(disposal.borrow().len(), 1);

        let mut rest = std::mem::take(&mut *disposal.borrow_mut());
        rest.empty();
        assert_eq!(*order.borrow(), vec!["first", "late"]);
    }
}
