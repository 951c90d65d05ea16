//! Typed publish/subscribe channel.
//!
//! Every subscriber receives a [`Subscription`] handle. Dropping the handle (or calling
//! [`Subscription::cancel`]) removes the handler immediately, so owners release their
//! listeners deterministically instead of leaving stale callbacks on a shared channel.
//!
//! Single-threaded: channels and handles are `!Send`, emission happens on the caller's turn.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Slots<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

impl<E> Slots<E> {
    fn contains(&self, id: u64) -> bool {
        self.handlers.iter().any(|(h, _)| *h == id)
    }
}

/// Type-erased view of a channel's handler list, held weakly by subscriptions.
trait Detach {
    fn detach(&self, id: u64);
    fn is_subscribed(&self, id: u64) -> bool;
}

impl<E> Detach for RefCell<Slots<E>> {
    fn detach(&self, id: u64) {
        self.borrow_mut().handlers.retain(|(h, _)| *h != id);
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.borrow().contains(id)
    }
}

/// Ordered list of handlers for one event kind.
pub struct Channel<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E: 'static> Channel<E> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register `handler`; it stays attached until the returned handle is dropped.
    #[must_use = "dropping the subscription detaches the handler"]
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.handlers.push((id, Rc::new(handler)));
            id
        };
        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        let slots: Weak<dyn Detach> = weak;
        Subscription {
            id,
            slots: Some(slots),
        }
    }

    /// Deliver `event` to every handler subscribed when the call starts.
    ///
    /// Handlers run with no borrow held, so they may subscribe, cancel or emit again.
    /// A handler cancelled by an earlier one in the same emission is skipped.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(u64, Handler<E>)> = self.slots.borrow().handlers.clone();
        for (id, handler) in snapshot {
            if !self.slots.borrow().contains(id) {
                continue;
            }
            handler(event);
        }
    }

    /// Number of live handlers.
    pub fn len(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every handler; outstanding handles become inert.
    pub fn clear(&self) {
        self.slots.borrow_mut().handlers.clear();
    }
}

impl<E: 'static> Default for Channel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("handlers", &self.slots.borrow().handlers.len())
            .finish()
    }
}

/// Owned handle to a channel handler. Detaches on drop.
pub struct Subscription {
    id: u64,
    slots: Option<Weak<dyn Detach>>,
}

impl Subscription {
    /// `true` while the handler is still attached to a live channel.
    pub fn is_active(&self) -> bool {
        self.slots
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|slots| slots.is_subscribed(self.id))
    }

    /// Detach now.
    pub fn cancel(mut self) {
        self.release();
    }

    /// Keep the handler attached for the channel's whole lifetime.
    pub fn forget(mut self) {
        self.slots = None;
    }

    fn release(&mut self) {
        if let Some(slots) = self.slots.take().and_then(|weak| weak.upgrade()) {
            slots.detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
