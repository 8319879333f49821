//! Favorites: a toggled set of product ids.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::subscription::{Subscribers, Subscription};

/// Favorite product ids, insertion-ordered for display.
#[derive(Default)]
pub struct FavoritesStore {
  ids: Mutex<Vec<u64>>,
  subscribers: Subscribers,
}

impl FavoritesStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Vec<u64>> {
    self.ids.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Flip membership for `id`: present ids are removed, absent ids appended.
  pub fn toggle_favorite(&self, id: u64) {
    {
      let mut ids = self.lock();
      match ids.iter().position(|&existing| existing == id) {
        Some(index) => {
          ids.remove(index);
        }
        None => ids.push(id),
      }
    }
    self.subscribers.notify();
  }

  pub fn is_favorite(&self, id: u64) -> bool {
    self.lock().contains(&id)
  }

  /// Current ids in insertion order.
  pub fn ids(&self) -> Vec<u64> {
    self.lock().clone()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
    self.subscribers.subscribe(listener)
  }
}
