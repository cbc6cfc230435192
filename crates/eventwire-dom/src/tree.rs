#![forbid(unsafe_code)]

//! Node tree and element lifecycle.
//!
//! A [`Document`] owns its [`Window`] and roots a tree of [`Element`]s.
//! Elements bound to a [`LifecycleBinding`] receive `connected` when they
//! enter the live tree and `disconnected` when they leave it — the two hook
//! slots the wiring layer composes its listener management into.
//!
//! # Lifecycle Guarantees
//!
//! 1. Inserting a subtree under a connected parent fires `connected` on
//!    every bound element in the subtree, parents before children.
//! 2. Removing a connected subtree fires `disconnected` the same way,
//!    before the subtree is unlinked.
//! 3. Appending an already-connected element elsewhere disconnects it first,
//!    then reconnects it under the new parent — a move is a disconnect
//!    followed by a connect, never a silent re-parent.
//! 4. Elements in a shadow subtree are connected exactly when their host is.
//!
//! # Failure Modes
//!
//! - Inserting a node under itself or a descendant: [`DomError::HierarchyRequest`].
//! - Removing a node that is not a child of the receiver: [`DomError::NotFound`].
//! - A lifecycle hook that mutates the tree mid-walk acts on the already
//!   snapshotted walk order; nodes it adds or removes are picked up by the
//!   mutation's own walk, not the in-flight one.
//!
//! # Example
//!
//! ```
//! use eventwire_dom::Document;
//!
//! let document = Document::new();
//! let parent = document.create_element("section");
//! let child = document.create_element("button");
//!
//! parent.append_child(&child).unwrap();
//! assert!(!child.is_connected());
//!
//! document.append_child(&parent).unwrap();
//! assert!(child.is_connected());
//! ```

use std::rc::{Rc, Weak};

use crate::error::DomError;
use crate::target::{EventTarget, NodeInner, NodeKind};

/// Connect/disconnect callbacks for a component bound to an element.
///
/// The element holds the binding weakly: dropping the component leaves the
/// element in the tree but inert.
pub trait LifecycleBinding {
    /// The element entered the live tree.
    fn connected(&self);
    /// The element left the live tree.
    fn disconnected(&self);
}

// ---------------------------------------------------------------------------
// Public handles
// ---------------------------------------------------------------------------

/// The top of every propagation path. Not part of the node tree; reachable
/// from its [`Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    target: EventTarget,
}

impl Window {
    /// This window as a dispatch/listen target.
    #[must_use]
    pub fn as_target(&self) -> &EventTarget {
        &self.target
    }
}

/// Root of a node tree. Owns the associated [`Window`]; elements created
/// through it record it as their owner document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    target: EventTarget,
}

impl Document {
    /// Create a document with its own window.
    #[must_use]
    pub fn new() -> Self {
        let window = NodeInner::new(NodeKind::Window);
        let document = NodeInner::new(NodeKind::Document { window });
        Self { target: EventTarget::from_inner(document) }
    }

    /// The window associated with this document.
    #[must_use]
    pub fn window(&self) -> Window {
        let NodeKind::Document { window } = &self.target.inner.kind else {
            unreachable!("Document handle always wraps a document node");
        };
        Window { target: EventTarget::from_inner(Rc::clone(window)) }
    }

    /// Create a detached element owned by this document.
    #[must_use]
    pub fn create_element(&self, tag: impl Into<String>) -> Element {
        let element = NodeInner::new(NodeKind::Element { tag: tag.into() });
        *element.owner.borrow_mut() = Rc::downgrade(&self.target.inner);
        Element { target: EventTarget::from_inner(element) }
    }

    /// Insert `child` directly under the document root, connecting it.
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        append(&self.target.inner, &child.target.inner)
    }

    /// Remove `child` from the document root, disconnecting it.
    pub fn remove_child(&self, child: &Element) -> Result<(), DomError> {
        remove_child(&self.target.inner, &child.target.inner)
    }

    /// This document as a dispatch/listen target.
    #[must_use]
    pub fn as_target(&self) -> &EventTarget {
        &self.target
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// An element node: a tree participant, an event target, and optionally the
/// host of a component binding and/or a shadow subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    target: EventTarget,
}

impl Element {
    /// The tag this element was created with.
    #[must_use]
    pub fn tag(&self) -> &str {
        match &self.target.inner.kind {
            NodeKind::Element { tag } => tag,
            _ => unreachable!("Element handle always wraps an element node"),
        }
    }

    /// Insert `child` as this element's last child.
    ///
    /// A connected child is moved: disconnected from its old position, then
    /// connected here when this element is itself connected.
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        append(&self.target.inner, &child.target.inner)
    }

    /// Remove a direct child.
    pub fn remove_child(&self, child: &Element) -> Result<(), DomError> {
        remove_child(&self.target.inner, &child.target.inner)
    }

    /// Detach this element from its parent, if it has one. Disconnects the
    /// subtree when it was connected. No-op on a detached element.
    pub fn remove(&self) {
        detach(&self.target.inner);
    }

    /// Attach a shadow subtree to this element, or return the existing one.
    pub fn attach_shadow(&self) -> ShadowRoot {
        if let Some(existing) = self.shadow_root() {
            return existing;
        }
        let shadow = NodeInner::new(NodeKind::ShadowRoot);
        *shadow.parent.borrow_mut() = Some(Rc::downgrade(&self.target.inner));
        *shadow.owner.borrow_mut() = self.target.inner.owner.borrow().clone();
        *self.target.inner.shadow.borrow_mut() = Some(Rc::clone(&shadow));
        ShadowRoot { target: EventTarget::from_inner(shadow) }
    }

    /// The shadow subtree attached to this element, if any.
    #[must_use]
    pub fn shadow_root(&self) -> Option<ShadowRoot> {
        self.target
            .inner
            .shadow
            .borrow()
            .as_ref()
            .map(|shadow| ShadowRoot { target: EventTarget::from_inner(Rc::clone(shadow)) })
    }

    /// The document this element was created by, while it is alive.
    #[must_use]
    pub fn owner_document(&self) -> Option<Document> {
        self.target
            .inner
            .owner
            .borrow()
            .upgrade()
            .map(|inner| Document { target: EventTarget::from_inner(inner) })
    }

    /// Whether this element is in the live tree (its ancestor chain, shadow
    /// boundaries included, reaches a document).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        is_connected(&self.target.inner)
    }

    /// Bind lifecycle callbacks to this element. Replaces any previous
    /// binding.
    pub fn bind_lifecycle(&self, binding: Weak<dyn LifecycleBinding>) {
        *self.target.inner.binding.borrow_mut() = Some(binding);
    }

    /// This element as a dispatch/listen target.
    #[must_use]
    pub fn as_target(&self) -> &EventTarget {
        &self.target
    }
}

/// Root of a shadow subtree. Owned by its host element; a propagation
/// boundary for non-composed events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowRoot {
    target: EventTarget,
}

impl ShadowRoot {
    /// The element hosting this shadow subtree, while it is alive.
    #[must_use]
    pub fn host(&self) -> Option<Element> {
        self.target
            .inner
            .parent
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Element { target: EventTarget::from_inner(inner) })
    }

    /// Insert `child` as this shadow root's last child.
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        append(&self.target.inner, &child.target.inner)
    }

    /// Remove a direct child.
    pub fn remove_child(&self, child: &Element) -> Result<(), DomError> {
        remove_child(&self.target.inner, &child.target.inner)
    }

    /// This shadow root as a dispatch/listen target.
    #[must_use]
    pub fn as_target(&self) -> &EventTarget {
        &self.target
    }
}

// ---------------------------------------------------------------------------
// Tree mutation
// ---------------------------------------------------------------------------

fn append(parent: &Rc<NodeInner>, child: &Rc<NodeInner>) -> Result<(), DomError> {
    if Rc::ptr_eq(parent, child) || is_inclusive_ancestor(child, parent) {
        return Err(DomError::HierarchyRequest);
    }
    detach(child);
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().push(Rc::clone(child));
    if is_connected(parent) {
        fire_connected(child);
    }
    Ok(())
}

fn remove_child(parent: &Rc<NodeInner>, child: &Rc<NodeInner>) -> Result<(), DomError> {
    let is_child = child
        .parent
        .borrow()
        .as_ref()
        .and_then(Weak::upgrade)
        .is_some_and(|p| Rc::ptr_eq(&p, parent));
    if !is_child {
        return Err(DomError::NotFound);
    }
    detach(child);
    Ok(())
}

/// Unlink `node` from its parent, firing disconnected callbacks first when
/// the node was in the live tree.
fn detach(node: &Rc<NodeInner>) {
    let parent = node.parent.borrow().as_ref().and_then(Weak::upgrade);
    let Some(parent) = parent else { return };
    if is_connected(node) {
        fire_disconnected(node);
    }
    parent.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, node));
    *node.parent.borrow_mut() = None;
}

/// Whether `candidate` appears on `node`'s inclusive ancestor chain
/// (crossing shadow boundaries).
fn is_inclusive_ancestor(candidate: &Rc<NodeInner>, node: &Rc<NodeInner>) -> bool {
    let mut current = Rc::clone(node);
    loop {
        if Rc::ptr_eq(&current, candidate) {
            return true;
        }
        let parent = current.parent.borrow().as_ref().and_then(Weak::upgrade);
        match parent {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// Whether `node` is in the live tree. The document node itself counts as
/// connected; shadow content is connected through its host.
fn is_connected(node: &Rc<NodeInner>) -> bool {
    let mut current = Rc::clone(node);
    loop {
        if matches!(current.kind, NodeKind::Document { .. }) {
            return true;
        }
        let parent = current.parent.borrow().as_ref().and_then(Weak::upgrade);
        match parent {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle walks
// ---------------------------------------------------------------------------

/// Run a lifecycle callback over `node`'s subtree, parents before children,
/// shadow content before light children. Child lists are snapshotted per
/// node so hooks may mutate the tree.
fn walk_lifecycle(node: &Rc<NodeInner>, callback: fn(&dyn LifecycleBinding)) {
    let binding = node.binding.borrow().as_ref().and_then(Weak::upgrade);
    if let Some(binding) = binding {
        callback(binding.as_ref());
    }
    let shadow = node.shadow.borrow().as_ref().map(Rc::clone);
    if let Some(shadow) = shadow {
        walk_lifecycle(&shadow, callback);
    }
    let children: Vec<_> = node.children.borrow().clone();
    for child in &children {
        walk_lifecycle(child, callback);
    }
}

fn fire_connected(node: &Rc<NodeInner>) {
    walk_lifecycle(node, |binding| binding.connected());
}

fn fire_disconnected(node: &Rc<NodeInner>) {
    walk_lifecycle(node, |binding| binding.disconnected());
}
