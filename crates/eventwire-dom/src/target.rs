#![forbid(unsafe_code)]

//! Event targets: listener registration and synchronous dispatch.
//!
//! An [`EventTarget`] is a cloneable handle to a node in the host tree
//! (window, document, element, or shadow root). Handlers are registered per
//! event type with [`EventTarget::add_listener`] and removed by the
//! [`ListenerId`] the registration returned; removal by id is exact and
//! idempotent, with no handler-identity comparison involved.
//!
//! # Dispatch
//!
//! [`EventTarget::dispatch_event`] consumes the event and delivers it
//! synchronously along the propagation path computed at dispatch time:
//!
//! 1. Capture phase — capture listeners on ancestors, outermost first.
//! 2. Target phase — every listener on the target, in registration order.
//! 3. Bubble phase — non-capture listeners on ancestors, innermost first,
//!    only when the event bubbles.
//!
//! The path runs target → ancestors → document → window, and ends at a
//! shadow boundary unless the event is composed.
//!
//! # Invariants
//!
//! 1. Listeners for one event type on one target fire in registration order.
//! 2. A listener removed mid-dispatch is not invoked for the in-flight
//!    event; a listener added mid-dispatch is not invoked either (delivery
//!    works on a per-node snapshot taken when that node's turn starts).
//! 3. A `once` registration is gone before its handler runs, so re-entrant
//!    dispatch from inside the handler cannot fire it twice.
//! 4. `stop_immediate_propagation` suppresses every later listener;
//!    `stop_propagation` suppresses later nodes but finishes the current
//!    node's snapshot.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use crate::event::{Event, ListenerOptions};
use crate::tree::LifecycleBinding;

/// Global counter for unique listener IDs.
static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a single listener registration.
///
/// Two registrations of the same closure yield distinct ids; removal always
/// targets exactly one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

type HandlerFn = Rc<dyn Fn(&Event)>;

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    handler: HandlerFn,
    options: ListenerOptions,
}

/// Registration-ordered listener storage, keyed by event type.
#[derive(Default)]
pub(crate) struct ListenerTable {
    by_type: AHashMap<String, Vec<ListenerEntry>>,
}

impl ListenerTable {
    fn insert(&mut self, event_type: String, entry: ListenerEntry) {
        self.by_type.entry(event_type).or_default().push(entry);
    }

    fn remove(&mut self, event_type: &str, id: ListenerId) {
        if let Some(entries) = self.by_type.get_mut(event_type) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                self.by_type.remove(event_type);
            }
        }
    }

    fn contains(&self, event_type: &str, id: ListenerId) -> bool {
        self.by_type
            .get(event_type)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }

    fn snapshot(&self, event_type: &str) -> Vec<ListenerEntry> {
        self.by_type.get(event_type).cloned().unwrap_or_default()
    }

    fn count(&self, event_type: &str) -> usize {
        self.by_type.get(event_type).map_or(0, Vec::len)
    }
}

/// What a node in the host tree is.
pub(crate) enum NodeKind {
    Window,
    Document { window: Rc<NodeInner> },
    Element { tag: String },
    ShadowRoot,
}

impl NodeKind {
    fn label(&self) -> &str {
        match self {
            Self::Window => "window",
            Self::Document { .. } => "document",
            Self::Element { tag } => tag,
            Self::ShadowRoot => "shadow-root",
        }
    }
}

/// Shared node state. Tree structure, listener table, and the optional
/// lifecycle binding all hang off this.
pub(crate) struct NodeInner {
    pub(crate) kind: NodeKind,
    pub(crate) listeners: RefCell<ListenerTable>,
    pub(crate) parent: RefCell<Option<Weak<NodeInner>>>,
    pub(crate) children: RefCell<Vec<Rc<NodeInner>>>,
    /// Owner document, set at creation for elements and shadow roots.
    pub(crate) owner: RefCell<Weak<NodeInner>>,
    /// Lifecycle callbacks for a component bound to this element. Weak so a
    /// registration never keeps a dead component alive.
    pub(crate) binding: RefCell<Option<Weak<dyn LifecycleBinding>>>,
    /// Shadow subtree attached to this element, if any.
    pub(crate) shadow: RefCell<Option<Rc<NodeInner>>>,
}

impl NodeInner {
    pub(crate) fn new(kind: NodeKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            listeners: RefCell::new(ListenerTable::default()),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            owner: RefCell::new(Weak::new()),
            binding: RefCell::new(None),
            shadow: RefCell::new(None),
        })
    }
}

/// Delivery phase for a node on the propagation path.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Capture,
    Target,
    Bubble,
}

/// Cloneable handle to a dispatchable node.
///
/// Equality is identity: two handles are equal when they refer to the same
/// node.
#[derive(Clone)]
pub struct EventTarget {
    pub(crate) inner: Rc<NodeInner>,
}

impl EventTarget {
    pub(crate) fn from_inner(inner: Rc<NodeInner>) -> Self {
        Self { inner }
    }

    /// Register `handler` for events of `event_type` on this target.
    ///
    /// Unknown event types are legal; nothing is validated. The returned
    /// [`ListenerId`] removes exactly this registration.
    pub fn add_listener(
        &self,
        event_type: impl Into<String>,
        handler: impl Fn(&Event) + 'static,
        options: ListenerOptions,
    ) -> ListenerId {
        let event_type = event_type.into();
        let id = ListenerId::next();
        #[cfg(feature = "tracing")]
        tracing::trace!(
            event_type = %event_type,
            node = %self.inner.kind.label(),
            id = id.id(),
            "listener added"
        );
        self.inner.listeners.borrow_mut().insert(
            event_type,
            ListenerEntry { id, handler: Rc::new(handler), options },
        );
        id
    }

    /// Remove the registration identified by `(event_type, id)`.
    ///
    /// Removing an already-removed listener is a no-op.
    pub fn remove_listener(&self, event_type: &str, id: ListenerId) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            event_type = %event_type,
            node = %self.inner.kind.label(),
            id = id.id(),
            "listener removed"
        );
        self.inner.listeners.borrow_mut().remove(event_type, id);
    }

    /// Number of live registrations for `event_type` on this target.
    ///
    /// Diagnostic aid; dispatch never consults this.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner.listeners.borrow().count(event_type)
    }

    /// Dispatch `event` from this target, delivering synchronously to every
    /// listener on the propagation path.
    ///
    /// Returns `false` when a listener cancelled the event via
    /// [`Event::prevent_default`], `true` otherwise. Consumes the event, so
    /// one event value is dispatched at most once.
    pub fn dispatch_event(&self, event: Event) -> bool {
        let path = self.propagation_path(event.composed());
        event.begin_dispatch(self.clone());
        #[cfg(feature = "tracing")]
        tracing::trace!(
            event_type = %event.event_type(),
            node = %self.inner.kind.label(),
            path_len = path.len(),
            bubbles = event.bubbles(),
            "dispatch"
        );

        // Capture phase: ancestors, outermost first.
        for node in path.iter().skip(1).rev() {
            if event.propagation_stopped() {
                break;
            }
            Self::deliver(node, &event, Phase::Capture);
        }

        // Target phase.
        if !event.propagation_stopped() {
            Self::deliver(&path[0], &event, Phase::Target);
        }

        // Bubble phase: ancestors, innermost first.
        if event.bubbles() {
            for node in path.iter().skip(1) {
                if event.propagation_stopped() {
                    break;
                }
                Self::deliver(node, &event, Phase::Bubble);
            }
        }

        event.finish_dispatch();
        !event.default_prevented()
    }

    /// Identity comparison of the underlying node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Invoke one node's listeners for `event`, honoring phase filters and
    /// per-listener options.
    fn deliver(node: &Self, event: &Event, phase: Phase) {
        event.set_current_target(node.clone());
        let entries = node.inner.listeners.borrow().snapshot(event.event_type());
        for entry in entries {
            let phase_matches = match phase {
                Phase::Target => true,
                Phase::Capture => entry.options.capture,
                Phase::Bubble => !entry.options.capture,
            };
            if !phase_matches {
                continue;
            }
            // Skip registrations removed earlier in this dispatch.
            if !node.inner.listeners.borrow().contains(event.event_type(), entry.id) {
                continue;
            }
            if entry.options.once {
                node.inner
                    .listeners
                    .borrow_mut()
                    .remove(event.event_type(), entry.id);
            }
            if entry.options.passive {
                event.set_in_passive(true);
            }
            (entry.handler)(event);
            if entry.options.passive {
                event.set_in_passive(false);
            }
            if event.immediate_propagation_stopped() {
                break;
            }
        }
    }

    /// Compute the propagation path: target first, then structural ancestors,
    /// then document and window. Ends at a shadow boundary for non-composed
    /// events.
    fn propagation_path(&self, composed: bool) -> Vec<Self> {
        let mut path = vec![self.clone()];
        let mut current = Rc::clone(&self.inner);
        loop {
            if matches!(current.kind, NodeKind::ShadowRoot) && !composed {
                break;
            }
            let parent = current.parent.borrow().as_ref().and_then(Weak::upgrade);
            match parent {
                Some(parent) => {
                    path.push(Self::from_inner(Rc::clone(&parent)));
                    current = parent;
                }
                None => {
                    if let NodeKind::Document { window } = &current.kind {
                        path.push(Self::from_inner(Rc::clone(window)));
                    }
                    break;
                }
            }
        }
        path
    }
}

/// Non-owning counterpart of [`EventTarget`].
///
/// Lets cleanup handles reference a node without keeping it alive; a handle
/// whose node is gone simply has nothing left to detach.
#[derive(Clone)]
pub struct WeakEventTarget {
    inner: Weak<NodeInner>,
}

impl WeakEventTarget {
    /// The target, if its node is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventTarget> {
        self.inner.upgrade().map(EventTarget::from_inner)
    }
}

impl std::fmt::Debug for WeakEventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakEventTarget")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl EventTarget {
    /// A non-owning handle to this target.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventTarget {
        WeakEventTarget { inner: Rc::downgrade(&self.inner) }
    }
}

impl PartialEq for EventTarget {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EventTarget {}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("kind", &self.inner.kind.label())
            .finish()
    }
}
