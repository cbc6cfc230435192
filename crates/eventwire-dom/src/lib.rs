#![forbid(unsafe_code)]

//! Host model for eventwire: event targets, synchronous dispatch, and
//! element lifecycle.
//!
//! This crate provides the environment the wiring layer (`eventwire`) runs
//! against, in-process and single-threaded:
//!
//! - [`EventTarget`]: per-type listener registration and capture/target/
//!   bubble dispatch.
//! - [`Event`]: a type string, an optional detail payload, dispatch flags,
//!   and the propagation state handlers mutate mid-flight.
//! - [`Document`] / [`Window`] / [`Element`] / [`ShadowRoot`]: a node tree
//!   whose mutations drive connect/disconnect lifecycle callbacks on bound
//!   elements.
//! - [`LifecycleBinding`]: the two hook slots a component implements to be
//!   driven by the tree.
//!
//! # Architecture
//!
//! Nodes are `Rc`-shared with interior mutability; handles (`EventTarget`,
//! `Element`, ...) are cheap clones comparing by identity. Ownership runs
//! top-down (document owns children, hosts own shadow roots); parent and
//! owner links are weak, so a user-held handle is what keeps a subtree
//! alive. Nothing here blocks, suspends, or spawns: dispatch and lifecycle
//! callbacks run synchronously on the calling thread.

pub mod error;
pub mod event;
pub mod target;
pub mod tree;

pub use error::DomError;
pub use event::{Event, EventInit, ListenerOptions};
pub use target::{EventTarget, ListenerId, WeakEventTarget};
pub use tree::{Document, Element, LifecycleBinding, ShadowRoot, Window};
