#![forbid(unsafe_code)]

//! Typed event dispatch from a fixed target.
//!
//! An [`EventEmitter`] binds a target, an event name, and dispatch flags at
//! construction; [`EventEmitter::emit`] attaches the per-call payload and
//! dispatches synchronously. Emitters are cheap value objects — components
//! construct one per access rather than caching.
//!
//! # Example
//!
//! ```
//! use eventwire::EventEmitter;
//! use eventwire_dom::{Document, EventInit, ListenerOptions};
//!
//! let document = Document::new();
//! let element = document.create_element("div");
//! document.append_child(&element).unwrap();
//!
//! document.as_target().add_listener(
//!     "myEvent",
//!     |event| assert_eq!(event.detail::<String>().map(String::as_str), Some("apples")),
//!     ListenerOptions::default(),
//! );
//!
//! let init = EventInit { bubbles: true, ..EventInit::default() };
//! let emitter = EventEmitter::<String>::new(element.as_target().clone(), "myEvent", init);
//! emitter.emit(String::from("apples"));
//! ```

use std::marker::PhantomData;

use eventwire_dom::{Event, EventInit, EventTarget};

/// Dispatches detail-carrying events of one type from one target.
///
/// The event name and flags are fixed at construction; every emitted event
/// uses them unchanged, with only the payload varying per call.
pub struct EventEmitter<T> {
    target: EventTarget,
    event_name: String,
    init: EventInit,
    _detail: PhantomData<fn(T)>,
}

impl<T: 'static> EventEmitter<T> {
    /// Create an emitter dispatching `event_name` events from `target`.
    #[must_use]
    pub fn new(target: EventTarget, event_name: impl Into<String>, init: EventInit) -> Self {
        Self {
            target,
            event_name: event_name.into(),
            init,
            _detail: PhantomData,
        }
    }

    /// The event name every emitted event carries.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// The dispatch flags every emitted event carries.
    #[must_use]
    pub fn init(&self) -> EventInit {
        self.init
    }

    /// Dispatch an event carrying `value` as its detail.
    ///
    /// Delivery is synchronous; all listeners on the propagation path run
    /// before this returns. Returns `false` when a listener cancelled the
    /// event, `true` otherwise.
    pub fn emit(&self, value: T) -> bool {
        self.target
            .dispatch_event(Event::with_detail(self.event_name.clone(), value, self.init))
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("event_name", &self.event_name)
            .field("init", &self.init)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventwire_dom::{Document, ListenerOptions};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_delivers_payload_and_flags() {
        let document = Document::new();
        let element = document.create_element("div");
        document.append_child(&element).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        element.as_target().add_listener(
            "applesEvent",
            move |event| {
                assert!(event.bubbles());
                assert!(event.cancelable());
                sink.borrow_mut().push(event.detail::<String>().cloned());
            },
            ListenerOptions::default(),
        );

        let init = EventInit { bubbles: true, cancelable: true, composed: false };
        let emitter = EventEmitter::<String>::new(element.as_target().clone(), "applesEvent", init);
        emitter.emit(String::from("apples"));
        emitter.emit(String::from("oranges"));

        assert_eq!(
            *seen.borrow(),
            vec![Some(String::from("apples")), Some(String::from("oranges"))]
        );
    }

    #[test]
    fn struct_payloads_are_carried_intact() {
        #[derive(Debug, Clone, PartialEq)]
        struct Person {
            name: String,
        }

        let document = Document::new();
        let element = document.create_element("div");
        document.append_child(&element).unwrap();

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        element.as_target().add_listener(
            "personEvent",
            move |event| *sink.borrow_mut() = event.detail::<Person>().cloned(),
            ListenerOptions::default(),
        );

        let emitter =
            EventEmitter::<Person>::new(element.as_target().clone(), "personEvent", EventInit::default());
        emitter.emit(Person { name: String::from("apples") });
        assert_eq!(*seen.borrow(), Some(Person { name: String::from("apples") }));
    }

    #[test]
    fn bubbling_emit_reaches_ancestors() {
        let document = Document::new();
        let parent = document.create_element("section");
        let child = document.create_element("button");
        document.append_child(&parent).unwrap();
        parent.append_child(&child).unwrap();

        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        parent.as_target().add_listener(
            "pick",
            move |_| *sink.borrow_mut() += 1,
            ListenerOptions::default(),
        );

        let bubbling = EventEmitter::<u32>::new(
            child.as_target().clone(),
            "pick",
            EventInit { bubbles: true, ..EventInit::default() },
        );
        bubbling.emit(1);
        assert_eq!(*hits.borrow(), 1);

        let silent = EventEmitter::<u32>::new(child.as_target().clone(), "pick", EventInit::default());
        silent.emit(2);
        assert_eq!(*hits.borrow(), 1, "non-bubbling events stay at the target");
    }

    #[test]
    fn emit_reports_cancellation() {
        let document = Document::new();
        let element = document.create_element("div");
        document.append_child(&element).unwrap();
        element.as_target().add_listener(
            "submit",
            |event| event.prevent_default(),
            ListenerOptions::default(),
        );

        let cancelable = EventEmitter::<()>::new(
            element.as_target().clone(),
            "submit",
            EventInit { cancelable: true, ..EventInit::default() },
        );
        assert!(!cancelable.emit(()));
    }
}
