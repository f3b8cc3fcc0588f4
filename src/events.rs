// src/events.rs
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<RefCell<dyn FnMut()>>;

/// Payload-free broadcast fired once per published hand update.
///
/// Listeners run synchronously in subscription order, but callers must not
/// rely on any order. A listener may subscribe, unsubscribe or query the hand
/// from inside its callback; changes to the listener list take effect from
/// the next notification.
///
/// A notification raised while listeners are running (a listener publishing
/// to its own hand) is queued and delivered to every listener once the
/// current pass finishes, so each publish still reaches each listener once.
#[derive(Default)]
pub struct HandUpdatedSignal {
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
    pending: Cell<u32>,
}

impl HandUpdatedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Calls every listener once. Returns how many ran, including passes
    /// queued by listeners during this call. A nested call only queues a pass
    /// and returns 0.
    pub fn notify(&self) -> usize {
        if self.dispatching.get() {
            self.pending.set(self.pending.get() + 1);
            tracing::trace!("Queued nested hand update notification");
            return 0;
        }

        self.dispatching.set(true);
        let _guard = DispatchGuard(self);
        let mut fired = self.dispatch();
        while self.pending.get() > 0 {
            self.pending.set(self.pending.get() - 1);
            fired += self.dispatch();
        }
        fired
    }

    fn dispatch(&self) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in &snapshot {
            (*listener.borrow_mut())();
        }
        snapshot.len()
    }
}

/// Clears the dispatch state even if a listener panics.
struct DispatchGuard<'a>(&'a HandUpdatedSignal);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.dispatching.set(false);
        self.0.pending.set(0);
    }
}

impl std::fmt::Debug for HandUpdatedSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandUpdatedSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listener_fires_once() {
        let signal = HandUpdatedSignal::new();
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let (a2, b2) = (a.clone(), b.clone());
        signal.subscribe(move || a2.set(a2.get() + 1));
        signal.subscribe(move || b2.set(b2.get() + 1));

        assert_eq!(signal.notify(), 2);
        assert_eq!((a.get(), b.get()), (1, 1));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let signal = HandUpdatedSignal::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = signal.subscribe(move || h.set(h.get() + 1));

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.notify();
        assert_eq!(hits.get(), 0);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_subscribe_during_notify() {
        let signal = Rc::new(HandUpdatedSignal::new());
        let late_hits = Rc::new(Cell::new(0));

        let s = Rc::downgrade(&signal);
        let late = late_hits.clone();
        signal.subscribe(move || {
            if let Some(signal) = s.upgrade() {
                let late = late.clone();
                signal.subscribe(move || late.set(late.get() + 1));
            }
        });

        assert_eq!(signal.notify(), 1);
        assert_eq!(late_hits.get(), 0);
        assert_eq!(signal.listener_count(), 2);
    }

    #[test]
    fn test_nested_notify_is_delivered_after_current_pass() {
        let signal = Rc::new(HandUpdatedSignal::new());
        let a_calls = Rc::new(Cell::new(0));
        let b_calls = Rc::new(Cell::new(0));

        let s = Rc::downgrade(&signal);
        let a = a_calls.clone();
        signal.subscribe(move || {
            a.set(a.get() + 1);
            if a.get() == 1 {
                if let Some(signal) = s.upgrade() {
                    assert_eq!(signal.notify(), 0);
                }
            }
        });
        let b = b_calls.clone();
        signal.subscribe(move || b.set(b.get() + 1));

        assert_eq!(signal.notify(), 4);
        assert_eq!((a_calls.get(), b_calls.get()), (2, 2));

        // Dispatch state is cleared afterwards
        assert_eq!(signal.notify(), 2);
        assert_eq!((a_calls.get(), b_calls.get()), (3, 3));
    }

    #[test]
    fn test_listener_can_unsubscribe_during_notify() {
        let signal = Rc::new(HandUpdatedSignal::new());
        let hits = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let s = Rc::downgrade(&signal);
        let (h, id_slot) = (hits.clone(), own_id.clone());
        let id = signal.subscribe(move || {
            h.set(h.get() + 1);
            if let (Some(signal), Some(id)) = (s.upgrade(), id_slot.get()) {
                assert!(signal.unsubscribe(id));
            }
        });
        own_id.set(Some(id));

        assert_eq!(signal.notify(), 1);
        assert_eq!(signal.listener_count(), 0);
        assert_eq!(signal.notify(), 0);
        assert_eq!(hits.get(), 1);
    }
}
