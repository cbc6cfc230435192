#![forbid(unsafe_code)]

//! Event values and their dispatch-time state.
//!
//! An [`Event`] couples an event-type string with an optional detail payload
//! and a set of dispatch flags ([`EventInit`]). The propagation state that
//! handlers may mutate mid-dispatch (`stop_propagation`,
//! `stop_immediate_propagation`, `prevent_default`) lives in interior-mutable
//! cells so handlers can observe and update it through a shared `&Event`.
//!
//! # Invariants
//!
//! 1. The event type, detail, and `EventInit` flags are fixed at
//!    construction; only propagation state changes during dispatch.
//! 2. `prevent_default()` has an effect only when the event is cancelable
//!    and the currently running listener is not passive.
//! 3. `target` is set once when dispatch begins; `current_target` tracks the
//!    node whose listeners are currently being invoked.
//! 4. An event is consumed by `dispatch_event`, so a single `Event` value
//!    can never be mid-flight twice.
//!
//! # Example
//!
//! ```
//! use eventwire_dom::{Event, EventInit};
//!
//! let init = EventInit { bubbles: true, cancelable: true, composed: false };
//! let event = Event::with_detail("fruitPicked", String::from("apples"), init);
//!
//! assert_eq!(event.event_type(), "fruitPicked");
//! assert_eq!(event.detail::<String>().map(String::as_str), Some("apples"));
//! assert!(event.bubbles());
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bitflags::bitflags;

use crate::target::EventTarget;

/// Dispatch flags fixed at event construction.
///
/// Mirrors the standard event-init shape: `bubbles` lets the event propagate
/// to ancestors after the target phase, `cancelable` allows
/// [`Event::prevent_default`] to flip the dispatch verdict, and `composed`
/// lets the propagation path cross shadow boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventInit {
    /// Propagate through ancestors after the target phase.
    pub bubbles: bool,
    /// Allow `prevent_default` to flip the dispatch verdict.
    pub cancelable: bool,
    /// Cross shadow boundaries during propagation.
    pub composed: bool,
}

/// Per-registration listener configuration.
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Deliver during the capture phase (ancestors before the target)
    /// instead of the bubble phase.
    pub capture: bool,
    /// The listener promises not to cancel the event; `prevent_default`
    /// calls made while it runs are ignored.
    pub passive: bool,
    /// Remove the registration after the first delivery.
    pub once: bool,
}

bitflags! {
    /// Propagation state mutated during dispatch.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    struct PropFlags: u8 {
        const STOP            = 1 << 0;
        const STOP_IMMEDIATE  = 1 << 1;
        const PREVENTED       = 1 << 2;
        /// Set while a passive listener is running.
        const IN_PASSIVE      = 1 << 3;
    }
}

/// A dispatchable event: type string, optional detail payload, flags, and
/// interior-mutable propagation state.
///
/// The detail is stored type-erased; [`Event::detail`] recovers it by
/// downcast, returning `None` on a type mismatch (a mismatch is a caller
/// error, not a fault).
pub struct Event {
    event_type: String,
    detail: Option<Rc<dyn Any>>,
    init: EventInit,
    flags: Cell<PropFlags>,
    target: RefCell<Option<EventTarget>>,
    current_target: RefCell<Option<EventTarget>>,
}

impl Event {
    /// Create an event with no detail payload.
    #[must_use]
    pub fn new(event_type: impl Into<String>, init: EventInit) -> Self {
        Self {
            event_type: event_type.into(),
            detail: None,
            init,
            flags: Cell::new(PropFlags::empty()),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
        }
    }

    /// Create an event carrying `detail` as its payload.
    #[must_use]
    pub fn with_detail<T: 'static>(event_type: impl Into<String>, detail: T, init: EventInit) -> Self {
        let mut event = Self::new(event_type, init);
        event.detail = Some(Rc::new(detail));
        event
    }

    /// The event-type string this event was constructed with.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The detail payload, downcast to `T`.
    ///
    /// Returns `None` when the event carries no detail or the detail is of a
    /// different type.
    #[must_use]
    pub fn detail<T: 'static>(&self) -> Option<&T> {
        self.detail.as_deref().and_then(|detail| detail.downcast_ref::<T>())
    }

    /// Whether the event propagates past the target phase.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.init.bubbles
    }

    /// Whether `prevent_default` can flip the dispatch verdict.
    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.init.cancelable
    }

    /// Whether the propagation path crosses shadow boundaries.
    #[must_use]
    pub fn composed(&self) -> bool {
        self.init.composed
    }

    /// The node the event was dispatched from. `None` before dispatch.
    #[must_use]
    pub fn target(&self) -> Option<EventTarget> {
        self.target.borrow().clone()
    }

    /// The node whose listeners are currently being invoked.
    /// `None` outside dispatch.
    #[must_use]
    pub fn current_target(&self) -> Option<EventTarget> {
        self.current_target.borrow().clone()
    }

    /// Stop delivery to any further nodes on the path. Listeners already
    /// queued on the current node still run.
    pub fn stop_propagation(&self) {
        self.set_flag(PropFlags::STOP);
    }

    /// Stop delivery immediately: no further listener runs, on this node or
    /// any other.
    pub fn stop_immediate_propagation(&self) {
        self.set_flag(PropFlags::STOP | PropFlags::STOP_IMMEDIATE);
    }

    /// Request cancellation of the event's default outcome.
    ///
    /// Ignored when the event is not cancelable, or when called from a
    /// passive listener.
    pub fn prevent_default(&self) {
        if !self.init.cancelable {
            return;
        }
        if self.flags.get().contains(PropFlags::IN_PASSIVE) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                event_type = %self.event_type,
                "prevent_default ignored inside passive listener"
            );
            return;
        }
        self.set_flag(PropFlags::PREVENTED);
    }

    /// Whether a listener successfully called `prevent_default`.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.flags.get().contains(PropFlags::PREVENTED)
    }

    // ---- dispatch-internal state, used by the dispatcher only ----

    pub(crate) fn begin_dispatch(&self, target: EventTarget) {
        *self.target.borrow_mut() = Some(target);
    }

    pub(crate) fn set_current_target(&self, node: EventTarget) {
        *self.current_target.borrow_mut() = Some(node);
    }

    pub(crate) fn finish_dispatch(&self) {
        *self.current_target.borrow_mut() = None;
    }

    pub(crate) fn set_in_passive(&self, in_passive: bool) {
        let mut flags = self.flags.get();
        flags.set(PropFlags::IN_PASSIVE, in_passive);
        self.flags.set(flags);
    }

    pub(crate) fn propagation_stopped(&self) -> bool {
        self.flags.get().contains(PropFlags::STOP)
    }

    pub(crate) fn immediate_propagation_stopped(&self) -> bool {
        self.flags.get().contains(PropFlags::STOP_IMMEDIATE)
    }

    fn set_flag(&self, flag: PropFlags) {
        self.flags.set(self.flags.get() | flag);
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("has_detail", &self.detail.is_some())
            .field("init", &self.init)
            .field("default_prevented", &self.default_prevented())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_flags_fixed_at_construction() {
        let init = EventInit { bubbles: true, cancelable: false, composed: true };
        let event = Event::new("resize", init);
        assert_eq!(event.event_type(), "resize");
        assert!(event.bubbles());
        assert!(!event.cancelable());
        assert!(event.composed());
    }

    #[test]
    fn detail_downcast() {
        let event = Event::with_detail("personEvent", 7_u32, EventInit::default());
        assert_eq!(event.detail::<u32>(), Some(&7));
        assert_eq!(event.detail::<String>(), None, "wrong type yields None");
    }

    #[test]
    fn no_detail_yields_none() {
        let event = Event::new("click", EventInit::default());
        assert_eq!(event.detail::<u32>(), None);
    }

    #[test]
    fn prevent_default_requires_cancelable() {
        let event = Event::new("x", EventInit { cancelable: false, ..EventInit::default() });
        event.prevent_default();
        assert!(!event.default_prevented());

        let event = Event::new("x", EventInit { cancelable: true, ..EventInit::default() });
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn prevent_default_ignored_while_passive() {
        let event = Event::new("scroll", EventInit { cancelable: true, ..EventInit::default() });
        event.set_in_passive(true);
        event.prevent_default();
        assert!(!event.default_prevented());

        event.set_in_passive(false);
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn stop_immediate_implies_stop() {
        let event = Event::new("x", EventInit::default());
        event.stop_immediate_propagation();
        assert!(event.propagation_stopped());
        assert!(event.immediate_propagation_stopped());
    }

    #[test]
    fn stop_does_not_imply_immediate() {
        let event = Event::new("x", EventInit::default());
        event.stop_propagation();
        assert!(event.propagation_stopped());
        assert!(!event.immediate_propagation_stopped());
    }

    #[test]
    fn targets_none_outside_dispatch() {
        let event = Event::new("x", EventInit::default());
        assert!(event.target().is_none());
        assert!(event.current_target().is_none());
    }
}
