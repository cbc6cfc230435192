#![forbid(unsafe_code)]

//! Declarative event emission and lifecycle-bound listening for components.
//!
//! eventwire removes the `add_listener`/`remove_listener` bookkeeping from
//! component code. Emitters are declared once and accessed as typed values;
//! listeners are declared once and attach when the component's element
//! connects, detach when it disconnects — no leaked registrations, no
//! double-attach, no clobbered lifecycle hooks.
//!
//! - [`ComponentSpec`] / [`ComponentDef`] / [`ComponentHandle`]: declare and
//!   instantiate components with pre-composed lifecycle wiring.
//! - [`EventEmitter`]: typed dispatch of detail-carrying events from a fixed
//!   target.
//! - [`listen_to`] / [`ListenerHandle`]: one listener registration with an
//!   exact, idempotent detach handle.
//! - [`Disposal`]: a bin of cleanup callbacks, flushed in insertion order.
//! - [`derive_event_name`]: the `onEventName` → `eventName` convention.
//!
//! The host side — targets, dispatch, the node tree and its lifecycle — is
//! [`eventwire_dom`].
//!
//! # Example
//!
//! ```
//! use eventwire::{ComponentSpec, EmitterConfig, ListenConfig};
//! use eventwire_dom::Document;
//!
//! #[derive(Default)]
//! struct Basket {
//!     picked: u32,
//! }
//!
//! let mut spec = ComponentSpec::new("fruit-basket", Basket::default);
//! let apples = spec.emitter::<String>("applesEvent", EmitterConfig::default());
//! spec.listen("onApplesEvent", ListenConfig::default(), |basket, _event| {
//!     basket.state_mut().picked += 1;
//! });
//!
//! let document = Document::new();
//! let basket = spec.define().create(&document);
//! document.append_child(basket.element()).unwrap();
//!
//! basket.emitter(apples).emit(String::from("apples"));
//! assert_eq!(basket.state().picked, 1);
//! ```

pub mod component;
pub mod derive;
pub mod disposal;
pub mod emitter;
pub mod listen;

pub use component::{
    ComponentDef, ComponentHandle, ComponentSpec, EmitterConfig, EmitterKey, ListenConfig,
    ListenTarget,
};
pub use derive::derive_event_name;
pub use disposal::Disposal;
pub use emitter::EventEmitter;
pub use listen::{ListenerHandle, listen_to};
