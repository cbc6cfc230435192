#![forbid(unsafe_code)]

//! Component definitions with lifecycle-composed event wiring.
//!
//! A [`ComponentSpec`] describes a component: a tag, a state constructor,
//! emitter registrations, listener registrations, and user lifecycle hooks.
//! [`ComponentSpec::define`] freezes it into a [`ComponentDef`], and
//! [`ComponentDef::create`] instantiates it against a document, yielding a
//! [`ComponentHandle`] that owns the instance.
//!
//! # Lifecycle composition
//!
//! The definition holds explicit ordered hook lists instead of wrapping
//! whatever hook happened to exist before. [`ComponentSpec::listen`]
//! PREPENDS its attach hook to the connect list and its detach hook to the
//! disconnect list; [`ComponentSpec::on_connected`] /
//! [`ComponentSpec::on_disconnected`] APPEND. The observable order is
//! therefore:
//!
//! - on connect: every listener attaches (most recently registered first),
//!   then user hooks run in registration order;
//! - on disconnect: every listener detaches, then user hooks run.
//!
//! # Invariants
//!
//! 1. A listener's attach runs before every hook that was registered before
//!    it; its detach likewise. User hooks never observe a half-wired
//!    instance.
//! 2. Each listener owns a distinct slot assigned at registration time;
//!    cleanup handles never overwrite one another.
//! 3. Attach is idempotent: a connect without an intervening disconnect
//!    detaches the slot's live registration before storing the new one. No
//!    duplicate registrations, ever.
//! 4. Handler invocation goes through a weak instance reference; a live
//!    registration never keeps a dropped component alive, and events
//!    arriving after the component is gone are ignored.
//! 5. Dropping the last [`ComponentHandle`] drops the slot handles, which
//!    detach their registrations (RAII), leaving the element inert.
//!
//! # Example
//!
//! ```
//! use eventwire::{ComponentSpec, EmitterConfig, ListenConfig};
//! use eventwire_dom::Document;
//!
//! #[derive(Default)]
//! struct Counter {
//!     clicks: u32,
//! }
//!
//! let mut spec = ComponentSpec::new("click-counter", Counter::default);
//! let clicked = spec.emitter::<u32>("clickedEvent", EmitterConfig::default());
//! spec.listen("onClick", ListenConfig::default(), |component, _event| {
//!     component.state_mut().clicks += 1;
//! });
//!
//! let def = spec.define();
//! let document = Document::new();
//! let component = def.create(&document);
//! document.append_child(component.element()).unwrap();
//!
//! component.emitter(clicked).emit(1);
//! ```

use std::marker::PhantomData;
use std::rc::{Rc, Weak};
use std::cell::{Ref, RefCell, RefMut};

use eventwire_dom::{
    Document, Element, Event, EventInit, EventTarget, LifecycleBinding, ListenerOptions,
};

use crate::derive::derive_event_name;
use crate::emitter::EventEmitter;
use crate::listen::{ListenerHandle, listen_to};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which target a lifecycle-bound listener attaches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListenTarget {
    /// The component's own element.
    #[default]
    Host,
    /// The element's owner document.
    Document,
    /// The owner document's window.
    Window,
}

/// Configuration for [`ComponentSpec::emitter`].
///
/// `name` overrides the property name as the event type. Each flag defaults
/// to `true` when unset; an explicit value wins.
#[derive(Debug, Clone, Default)]
pub struct EmitterConfig {
    /// Event type override; the property name is used when absent.
    pub name: Option<String>,
    /// Override for the `bubbles` flag (default `true`).
    pub bubbles: Option<bool>,
    /// Override for the `cancelable` flag (default `true`).
    pub cancelable: Option<bool>,
    /// Override for the `composed` flag (default `true`).
    pub composed: Option<bool>,
}

impl EmitterConfig {
    /// Config with an explicit event type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    fn resolve(&self, property: &str) -> (String, EventInit) {
        let event = self.name.clone().unwrap_or_else(|| property.to_owned());
        let init = EventInit {
            bubbles: self.bubbles.unwrap_or(true),
            cancelable: self.cancelable.unwrap_or(true),
            composed: self.composed.unwrap_or(true),
        };
        (event, init)
    }
}

/// Configuration for [`ComponentSpec::listen`].
#[derive(Debug, Clone, Default)]
pub struct ListenConfig {
    /// Explicit event type. When absent the type is derived from the method
    /// name (`onEventName` listens for `eventName`); see
    /// [`derive_event_name`] for the exact, convention-bound rule.
    pub event: Option<String>,
    /// Where to attach (default: the host element).
    pub target: ListenTarget,
    /// Attach as a capture-phase listener.
    pub capture: bool,
    /// Attach as a passive listener.
    pub passive: bool,
}

impl ListenConfig {
    /// Config with an explicit event type.
    #[must_use]
    pub fn named(event: impl Into<String>) -> Self {
        Self { event: Some(event.into()), ..Self::default() }
    }

    /// Select the listen target.
    #[must_use]
    pub fn on(mut self, target: ListenTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the capture option.
    #[must_use]
    pub fn capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Set the passive option.
    #[must_use]
    pub fn passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Typed key for a registered emitter property.
///
/// Issued by [`ComponentSpec::emitter`]; only meaningful with handles
/// created from the definition that issued it.
pub struct EmitterKey<T> {
    index: usize,
    _detail: PhantomData<fn(T)>,
}

impl<T> Clone for EmitterKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EmitterKey<T> {}

impl<T> std::fmt::Debug for EmitterKey<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterKey").field("index", &self.index).finish()
    }
}

struct EmitterSlot {
    property: String,
    event: String,
    init: EventInit,
}

type Hook<S> = Rc<dyn Fn(&ComponentHandle<S>)>;
type ListenHandler<S> = Rc<dyn Fn(&ComponentHandle<S>, &Event)>;

/// Mutable description of a component: state constructor, emitters,
/// listeners, and user lifecycle hooks.
pub struct ComponentSpec<S> {
    tag: String,
    state: Box<dyn Fn() -> S>,
    emitters: Vec<EmitterSlot>,
    listener_slots: usize,
    connected: Vec<Hook<S>>,
    disconnected: Vec<Hook<S>>,
}

impl<S: 'static> ComponentSpec<S> {
    /// Start a spec for components with the given tag, constructing their
    /// state with `state`.
    #[must_use]
    pub fn new(tag: impl Into<String>, state: impl Fn() -> S + 'static) -> Self {
        Self {
            tag: tag.into(),
            state: Box::new(state),
            emitters: Vec::new(),
            listener_slots: 0,
            connected: Vec::new(),
            disconnected: Vec::new(),
        }
    }

    /// Register an emitter property.
    ///
    /// The event type and flags are resolved now: an explicit
    /// [`EmitterConfig::name`] wins over `property`, and unset flags default
    /// to `true`. Registering the same property again replaces the slot in
    /// place — previously issued keys observe the override.
    pub fn emitter<T: 'static>(&mut self, property: &str, config: EmitterConfig) -> EmitterKey<T> {
        let (event, init) = config.resolve(property);
        let slot = EmitterSlot { property: property.to_owned(), event, init };
        let index = match self.emitters.iter().position(|s| s.property == property) {
            Some(index) => {
                self.emitters[index] = slot;
                index
            }
            None => {
                self.emitters.push(slot);
                self.emitters.len() - 1
            }
        };
        EmitterKey { index, _detail: PhantomData }
    }

    /// Register a lifecycle-bound listener (the core operation).
    ///
    /// `method_name` names the handler; when [`ListenConfig::event`] is
    /// absent the event type is derived from it. The listener attaches to
    /// the resolved target when the component connects and detaches when it
    /// disconnects, composing with previously registered hooks as described
    /// in the module docs.
    pub fn listen(
        &mut self,
        method_name: &str,
        config: ListenConfig,
        handler: impl Fn(&ComponentHandle<S>, &Event) + 'static,
    ) {
        let event = config
            .event
            .clone()
            .unwrap_or_else(|| derive_event_name(method_name));
        let slot = self.listener_slots;
        self.listener_slots += 1;

        let options = ListenerOptions {
            capture: config.capture,
            passive: config.passive,
            once: false,
        };
        let listen_target = config.target;
        let handler: ListenHandler<S> = Rc::new(handler);

        let attach_event = event.clone();
        let attach: Hook<S> = Rc::new(move |component| {
            component.attach_listener(slot, listen_target, &attach_event, options, &handler);
        });
        let detach_event = event;
        let detach: Hook<S> = Rc::new(move |component| {
            component.detach_listener(slot, &detach_event);
        });

        // Attach must run before every pre-existing connect hook, detach
        // before every pre-existing disconnect hook.
        self.connected.insert(0, attach);
        self.disconnected.insert(0, detach);
    }

    /// Append a user connect hook. Runs after every listener attach.
    pub fn on_connected(&mut self, hook: impl Fn(&ComponentHandle<S>) + 'static) {
        self.connected.push(Rc::new(hook));
    }

    /// Append a user disconnect hook. Runs after every listener detach.
    pub fn on_disconnected(&mut self, hook: impl Fn(&ComponentHandle<S>) + 'static) {
        self.disconnected.push(Rc::new(hook));
    }

    /// Freeze the spec into a shareable definition.
    #[must_use]
    pub fn define(self) -> ComponentDef<S> {
        ComponentDef { inner: Rc::new(self) }
    }
}

impl<S> std::fmt::Debug for ComponentSpec<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("tag", &self.tag)
            .field("emitters", &self.emitters.len())
            .field("listeners", &self.listener_slots)
            .finish()
    }
}

/// Immutable, shareable component definition. Cheap to clone; every
/// instance created from it shares the same wiring.
pub struct ComponentDef<S> {
    inner: Rc<ComponentSpec<S>>,
}

impl<S> Clone for ComponentDef<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: 'static> ComponentDef<S> {
    /// The tag instances are created with.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Registered emitter properties, in registration order.
    pub fn emitter_properties(&self) -> impl Iterator<Item = &str> {
        self.inner.emitters.iter().map(|slot| slot.property.as_str())
    }

    /// Instantiate against `document`: creates the element, constructs the
    /// state, and binds the lifecycle hooks. The element starts detached;
    /// wiring activates when it is inserted into the live tree.
    #[must_use]
    pub fn create(&self, document: &Document) -> ComponentHandle<S> {
        let element = document.create_element(&self.inner.tag);
        let inner = Rc::new_cyclic(|self_weak: &Weak<InstanceInner<S>>| InstanceInner {
            def: Rc::clone(&self.inner),
            element: element.clone(),
            state: RefCell::new((self.inner.state)()),
            slots: RefCell::new((0..self.inner.listener_slots).map(|_| None).collect()),
            self_weak: self_weak.clone(),
        });
        let binding: Rc<dyn LifecycleBinding> = inner.clone();
        element.bind_lifecycle(Rc::downgrade(&binding));
        ComponentHandle { inner }
    }
}

impl<S> std::fmt::Debug for ComponentDef<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDef").field("tag", &self.inner.tag).finish()
    }
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

struct InstanceInner<S> {
    def: Rc<ComponentSpec<S>>,
    element: Element,
    state: RefCell<S>,
    /// Cleanup handles, one slot per registered listener.
    slots: RefCell<Vec<Option<ListenerHandle>>>,
    self_weak: Weak<InstanceInner<S>>,
}

impl<S: 'static> LifecycleBinding for InstanceInner<S> {
    fn connected(&self) {
        let Some(inner) = self.self_weak.upgrade() else { return };
        let component = ComponentHandle { inner };
        for hook in &self.def.connected {
            hook(&component);
        }
    }

    fn disconnected(&self) {
        let Some(inner) = self.self_weak.upgrade() else { return };
        let component = ComponentHandle { inner };
        for hook in &self.def.disconnected {
            hook(&component);
        }
    }
}

/// Owning handle to a component instance.
///
/// Cloneable; the instance lives as long as any handle does. Dropping the
/// last handle detaches every live listener registration.
pub struct ComponentHandle<S> {
    inner: Rc<InstanceInner<S>>,
}

impl<S> Clone for ComponentHandle<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: 'static> ComponentHandle<S> {
    /// The element hosting this component.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.inner.element
    }

    /// Shared view of the component state.
    ///
    /// # Panics
    ///
    /// Panics if the state is mutably borrowed (standard `RefCell` rules).
    #[must_use]
    pub fn state(&self) -> Ref<'_, S> {
        self.inner.state.borrow()
    }

    /// Mutable view of the component state.
    ///
    /// # Panics
    ///
    /// Panics if the state is already borrowed.
    #[must_use]
    pub fn state_mut(&self) -> RefMut<'_, S> {
        self.inner.state.borrow_mut()
    }

    /// Build the emitter for a registered property.
    ///
    /// A fresh [`EventEmitter`] per access; every access resolves to the
    /// same event type and flags, so emitted events are indistinguishable
    /// across accesses.
    ///
    /// # Panics
    ///
    /// Panics if `key` was issued by a different definition.
    #[must_use]
    pub fn emitter<T: 'static>(&self, key: EmitterKey<T>) -> EventEmitter<T> {
        let slot = &self.inner.def.emitters[key.index];
        EventEmitter::new(self.inner.element.as_target().clone(), slot.event.clone(), slot.init)
    }

    fn resolve_target(&self, target: ListenTarget) -> Option<EventTarget> {
        match target {
            ListenTarget::Host => Some(self.inner.element.as_target().clone()),
            ListenTarget::Document => self
                .inner
                .element
                .owner_document()
                .map(|document| document.as_target().clone()),
            ListenTarget::Window => self
                .inner
                .element
                .owner_document()
                .map(|document| document.window().as_target().clone()),
        }
    }

    fn attach_listener(
        &self,
        slot: usize,
        target: ListenTarget,
        event: &str,
        options: ListenerOptions,
        handler: &ListenHandler<S>,
    ) {
        let Some(resolved) = self.resolve_target(target) else {
            tracing::warn!(event, listen_target = ?target, "listener target unresolvable; attach skipped");
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        let handler = Rc::clone(handler);
        let handler_fn = move |incoming: &Event| {
            if let Some(inner) = weak.upgrade() {
                handler(&ComponentHandle { inner }, incoming);
            }
        };

        let mut slots = self.inner.slots.borrow_mut();
        if let Some(existing) = slots[slot].take() {
            // Connect fired twice without a disconnect; drop the live
            // registration so exactly one remains.
            tracing::debug!(event, slot, "re-attach without detach; replacing registration");
            existing.off();
        }
        tracing::trace!(event, slot, listen_target = ?target, "listener attached");
        slots[slot] = Some(listen_to(&resolved, event, handler_fn, options));
    }

    fn detach_listener(&self, slot: usize, event: &str) {
        if let Some(handle) = self.inner.slots.borrow_mut()[slot].take() {
            tracing::trace!(event, slot, "listener detached");
            handle.off();
        }
    }
}

impl<S> std::fmt::Debug for ComponentHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("tag", &self.inner.def.tag)
            .field("connected", &self.inner.element.is_connected())
            .finish()
    }
}
