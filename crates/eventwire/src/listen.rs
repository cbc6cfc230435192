#![forbid(unsafe_code)]

//! Listener attachment with an exact, idempotent detach handle.
//!
//! [`listen_to`] registers a handler for one event type on one target and
//! returns a [`ListenerHandle`] closing over exactly that registration.
//! Calling [`ListenerHandle::off`] removes it; calling it again is a no-op.
//! The handle also detaches when dropped, so holding it *is* the
//! subscription.
//!
//! # Invariants
//!
//! 1. A handle removes precisely the registration it was created for —
//!    never another listener for the same event type.
//! 2. `off()` is idempotent; drop after `off()` is a no-op.
//! 3. The handle holds its target weakly: an outstanding handle never keeps
//!    a dead target alive, and detaching after the target is gone is a
//!    no-op.
//!
//! # Example
//!
//! ```
//! use eventwire::listen_to;
//! use eventwire_dom::{Document, ListenerOptions};
//!
//! let document = Document::new();
//! let window = document.window();
//!
//! let off = listen_to(window.as_target(), "resize", |_| {}, ListenerOptions::default());
//!
//! // Stop listening.
//! off.off();
//! ```

use std::cell::Cell;

use eventwire_dom::{Event, EventTarget, ListenerId, ListenerOptions, WeakEventTarget};

/// Attach `handler` to `target` for events of `event_type`.
///
/// Unknown event types are legal (custom events). The returned handle is
/// the only way to detach; dropping it detaches too.
#[must_use = "dropping the handle detaches the listener"]
pub fn listen_to(
    target: &EventTarget,
    event_type: impl Into<String>,
    handler: impl Fn(&Event) + 'static,
    options: ListenerOptions,
) -> ListenerHandle {
    let event_type = event_type.into();
    let id = target.add_listener(event_type.clone(), handler, options);
    ListenerHandle {
        target: target.downgrade(),
        event_type,
        id,
        active: Cell::new(true),
    }
}

/// Cleanup handle for one listener registration.
///
/// Created by [`listen_to`]; see the module docs for the detach contract.
#[derive(Debug)]
pub struct ListenerHandle {
    target: WeakEventTarget,
    event_type: String,
    id: ListenerId,
    active: Cell<bool>,
}

impl ListenerHandle {
    /// Remove the registration this handle was created for.
    ///
    /// Idempotent: the second and later calls do nothing.
    pub fn off(&self) {
        if self.active.replace(false) {
            if let Some(target) = self.target.upgrade() {
                target.remove_listener(&self.event_type, self.id);
            }
        }
    }

    /// The event type this handle's registration listens for.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Whether the registration has not yet been detached through this
    /// handle.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.off();
    }
}
