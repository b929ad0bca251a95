//! Ordered event fan-out.
//!
//! An [`Emitter`] holds subscriber callbacks in registration order and invokes
//! each of them for every emitted event. Subscribing returns a
//! [`Subscription`]; dropping it removes the callback.
//!
//! # Invariants
//!
//! - Subscribers are invoked in registration order.
//! - Callbacks run with no internal lock held, so a callback may subscribe,
//!   unsubscribe, or emit again without deadlocking.
//! - A subscription dropped before `emit` starts is not invoked by that emit.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Emitter
// ─────────────────────────────────────────────────────────────────────────────

struct Slot<E> {
    id: u64,
    callback: Callback<E>,
}

struct EmitterInner<E> {
    next_id: AtomicU64,
    slots: Mutex<Vec<Slot<E>>>,
}

/// Type-erased removal hook so [`Subscription`] does not carry the event type.
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<E> Unsubscribe for EmitterInner<E> {
    fn unsubscribe(&self, id: u64) {
        self.slots.lock().retain(|slot| slot.id != id);
    }
}

/// Ordered list of subscriber callbacks for events of type `E`.
///
/// Cloning an `Emitter` yields another handle to the same subscriber list.
pub struct Emitter<E> {
    inner: Arc<EmitterInner<E>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                next_id: AtomicU64::new(1),
                slots: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<E: 'static> Emitter<E> {
    /// Creates an emitter with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every subsequent [`emit`](Self::emit).
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped (or forever, after [`Subscription::detach`]).
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.slots.lock().push(Slot {
            id,
            callback: Arc::new(callback),
        });

        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription {
            id,
            owner: Some(owner),
        }
    }

    /// Invokes every current subscriber with `event`, in registration order.
    pub fn emit(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self
            .inner
            .slots
            .lock()
            .iter()
            .map(|slot| Arc::clone(&slot.callback))
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }
}

impl<E> Emitter<E> {
    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// RAII handle for a registered callback.
///
/// Dropping the subscription unsubscribes. If the emitter is already gone the
/// drop is a no-op.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    id: u64,
    owner: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    /// Keeps the callback registered for the lifetime of the emitter.
    pub fn detach(mut self) {
        self.owner = None;
    }

    /// Returns `true` while the callback is still registered with a live emitter.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|owner| owner.strong_count() > 0)
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

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.take().and_then(|weak| weak.upgrade()) {
            owner.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn emit_reaches_subscribers_in_registration_order() {
        let emitter = Emitter::<u32>::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let subs: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(|name| {
                let order = Arc::clone(&order);
                emitter.subscribe(move |value: &u32| {
                    order.lock().unwrap().push(format!("{name}:{value}"));
                })
            })
            .collect();

        emitter.emit(&5);

        assert_eq!(
            *order.lock().unwrap(),
            vec!["first:5", "second:5", "third:5"]
        );
        drop(subs);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let emitter = Emitter::<()>::new();
        let hits = Arc::new(AtomicU64::new(0));
        let hits_clone = Arc::clone(&hits);

        let subscription = emitter.subscribe(move |_: &()| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(emitter.len(), 1);

        emitter.emit(&());
        drop(subscription);
        emitter.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(emitter.is_empty());
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let emitter = Emitter::<()>::new();
        let hits = Arc::new(AtomicU64::new(0));
        let hits_clone = Arc::clone(&hits);

        emitter
            .subscribe(move |_: &()| {
                hits_clone.fetch_add(1, Ordering::SeqCst);
            })
            .detach();

        emitter.emit(&());
        emitter.emit(&());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter = Emitter::<()>::new();
        let subscription = emitter.subscribe(|_: &()| {});
        assert!(subscription.is_active());

        drop(emitter);
        assert!(!subscription.is_active());
        drop(subscription);
    }

    #[test]
    fn callback_may_emit_reentrantly() {
        let emitter = Emitter::<u32>::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let inner_emitter = emitter.clone();
        let seen_clone = Arc::clone(&seen);
        let _subscription = emitter.subscribe(move |value: &u32| {
            seen_clone.lock().unwrap().push(*value);
            if *value > 0 {
                inner_emitter.emit(&(value - 1));
            }
        });

        emitter.emit(&2);
        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 0]);
    }
}
