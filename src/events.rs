//! Listener registration and dispatch shared by the grid and its controls.
//!
//! Both the pagination control and data sources hand out [`Registration`]
//! handles so subscribers can detach without the publisher keeping track of
//! who is listening.

use std::fmt;
use std::sync::{Arc, Mutex};

/// A set of listeners for a single event type.
///
/// Listeners are invoked in registration order. A listener must not add or
/// remove listeners on the same set from within its callback.
pub struct ListenerSet<E> {
    inner: Arc<Mutex<Slots<E>>>,
}

struct Slots<E> {
    next_id: u64,
    entries: Vec<(u64, Box<dyn Fn(&E) + Send + Sync>)>,
}

impl<E: 'static> ListenerSet<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener and return a handle that removes it again.
    pub fn add<L>(&self, listener: L) -> Registration
    where
        L: Fn(&E) + Send + Sync + 'static,
    {
        let mut slots = self.inner.lock().unwrap();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.entries.push((id, Box::new(listener)));

        let weak = Arc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .lock()
                    .unwrap()
                    .entries
                    .retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every registered listener with `event`.
    pub fn notify(&self, event: &E) {
        let slots = self.inner.lock().unwrap();
        for (_, listener) in &slots.entries {
            listener(event);
        }
    }

    /// Number of currently registered listeners.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> fmt::Debug for ListenerSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle for a registered listener.
///
/// Calling [`Registration::remove`] detaches the listener. Dropping the
/// handle without calling `remove` leaves the listener registered for the
/// lifetime of the publisher.
pub struct Registration {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Registration {
    pub(crate) fn new<D>(detach: D) -> Self
    where
        D: FnOnce() + Send + Sync + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the listener this handle was issued for.
    pub fn remove(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
