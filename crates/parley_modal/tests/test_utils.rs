//! Shared test utilities for `parley_modal` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities — not all items used in every test binary"
)]

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parley_modal::{
    CloseGuard, ContentRef, ModalContext, ModalEvent, ModalHandle, ModalId, ModalOptions,
    Subscription,
};
use tokio::sync::oneshot;

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT SETUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates a context with default options.
pub fn context() -> ModalContext {
    ModalContext::new(ModalOptions::default())
}

/// Creates a context that allows only one modal at a time.
pub fn single_modal_context() -> ModalContext {
    ModalContext::new(ModalOptions::default().with_allow_multiple(false))
}

/// Creates a handle whose id and content are both `name`.
pub fn modal(context: &ModalContext, name: &'static str) -> ModalHandle {
    context.make_modal_with_id(ContentRef::new(name), ModalId::from_string(name))
}

/// Returns the open queue as plain names.
pub fn queue_names(context: &ModalContext) -> Vec<String> {
    context
        .open_queue()
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING GUARDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Records the labels of guards in the order they ran.
#[derive(Clone, Default)]
pub struct GuardLog {
    entries: Arc<Mutex<Vec<&'static str>>>,
}

impl GuardLog {
    /// A guard that logs `label` and then answers `allow`.
    pub fn guard(&self, label: &'static str, allow: bool) -> CloseGuard {
        let entries = Arc::clone(&self.entries);
        CloseGuard::new(move || {
            let entries = Arc::clone(&entries);
            async move {
                entries.lock().unwrap().push(label);
                allow
            }
        })
    }

    /// A guard that logs `label` and then fails with `message`.
    pub fn failing(&self, label: &'static str, message: &'static str) -> CloseGuard {
        let entries = Arc::clone(&self.entries);
        CloseGuard::new(move || {
            let entries = Arc::clone(&entries);
            async move {
                entries.lock().unwrap().push(label);
                Err::<bool, _>(message)
            }
        })
    }

    /// Labels recorded so far.
    pub fn entries(&self) -> Vec<&'static str> {
        self.entries.lock().unwrap().clone()
    }
}

/// A guard that counts its invocations and always allows.
#[derive(Clone, Default)]
pub struct CountingGuard {
    calls: Arc<AtomicUsize>,
}

impl CountingGuard {
    pub fn guard(&self) -> CloseGuard {
        let calls = Arc::clone(&self.calls);
        CloseGuard::from_fn(move || {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PENDING GUARDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Controls a guard that stays pending until resolved by the test.
pub struct Gate {
    sender: Option<oneshot::Sender<bool>>,
    started: Arc<AtomicBool>,
}

impl Gate {
    /// Returns `true` once the guard has started awaiting.
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Resolves the pending guard with `allow`.
    pub fn resolve(&mut self, allow: bool) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(allow);
        }
    }
}

/// Creates a guard that waits for its [`Gate`]. Later invocations allow
/// immediately.
pub fn gated_guard() -> (Gate, CloseGuard) {
    let (sender, receiver) = oneshot::channel::<bool>();
    let receiver = Arc::new(Mutex::new(Some(receiver)));
    let started = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&started);
    let guard = CloseGuard::new(move || {
        let receiver = receiver.lock().unwrap().take();
        flag.store(true, Ordering::SeqCst);
        async move {
            match receiver {
                Some(receiver) => receiver.await.unwrap_or(true),
                None => true,
            }
        }
    });

    (
        Gate {
            sender: Some(sender),
            started,
        },
        guard,
    )
}

/// Yields to the runtime until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT CAPTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Captures every event a context emits while alive.
pub struct EventLog {
    events: Arc<Mutex<Vec<ModalEvent>>>,
    _subscription: Subscription,
}

impl EventLog {
    pub fn attach(context: &ModalContext) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = context.observe(move |event| sink.lock().unwrap().push(event.clone()));
        Self {
            events,
            _subscription: subscription,
        }
    }

    /// Variant names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(ModalEvent::name)
            .collect()
    }

    pub fn events(&self) -> Vec<ModalEvent> {
        self.events.lock().unwrap().clone()
    }
}
