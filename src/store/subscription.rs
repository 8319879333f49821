//! Change notification shared by the state containers.
//!
//! Each store owns a [`Subscribers`] registry. Consumers register a listener
//! and get back a [`Subscription`] handle; dropping the handle (or calling
//! `unsubscribe`) deregisters the listener. Notification is synchronous and
//! runs on the mutating caller's stack.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Listener registry for one state container.
#[derive(Default)]
pub struct Subscribers {
  inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
  next_id: AtomicU64,
  listeners: Mutex<HashMap<u64, Listener>>,
}

impl Subscribers {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a listener; it stays active until the returned handle goes
  /// away.
  pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    self.lock().insert(id, Arc::new(listener));
    Subscription {
      id,
      registry: Arc::downgrade(&self.inner),
    }
  }

  /// Invoke every registered listener.
  pub fn notify(&self) {
    // Snapshot outside the lock so a listener may subscribe/unsubscribe
    // reentrantly.
    let listeners: Vec<Listener> = self.lock().values().cloned().collect();
    for listener in listeners {
      listener();
    }
  }

  pub fn count(&self) -> usize {
    self.lock().len()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<u64, Listener>> {
    self
      .inner
      .listeners
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

/// Handle for one registered listener; deregisters on drop.
pub struct Subscription {
  id: u64,
  registry: Weak<Inner>,
}

impl Subscription {
  /// Explicitly deregister the listener (equivalent to dropping the handle).
  pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(inner) = self.registry.upgrade() {
      inner
        .listeners
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&self.id);
    }
  }
}
