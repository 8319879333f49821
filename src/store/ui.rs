//! UI filter state: search text, active category, sort option, theme.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::subscription::{Subscribers, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

/// Client-side sort applied by the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
  /// Lexicographic by title, case-insensitive, ascending
  #[default]
  NameAsc,
  /// Numeric ascending by price
  PriceAsc,
  /// Numeric descending by price
  PriceDesc,
}

/// Full filter state; every field is independently settable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
  pub theme: Theme,
  pub search: String,
  /// `None` means unfiltered
  pub category: Option<String>,
  pub sort: SortOption,
}

/// Value store for the UI filters. Mutations are synchronous total
/// replacements of one field and notify subscribers before returning.
#[derive(Default)]
pub struct UiStore {
  state: Mutex<UiState>,
  subscribers: Subscribers,
}

impl UiStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, UiState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn set_search(&self, text: impl Into<String>) {
    self.lock().search = text.into();
    self.subscribers.notify();
  }

  pub fn set_category(&self, category: Option<String>) {
    self.lock().category = category;
    self.subscribers.notify();
  }

  pub fn set_sort(&self, sort: SortOption) {
    self.lock().sort = sort;
    self.subscribers.notify();
  }

  pub fn toggle_theme(&self) {
    {
      let mut state = self.lock();
      state.theme = match state.theme {
        Theme::Light => Theme::Dark,
        Theme::Dark => Theme::Light,
      };
    }
    self.subscribers.notify();
  }

  pub fn snapshot(&self) -> UiState {
    self.lock().clone()
  }

  pub fn search(&self) -> String {
    self.lock().search.clone()
  }

  pub fn category(&self) -> Option<String> {
    self.lock().category.clone()
  }

  pub fn sort(&self) -> SortOption {
    self.lock().sort
  }

  pub fn theme(&self) -> Theme {
    self.lock().theme
  }

  pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
    self.subscribers.subscribe(listener)
  }
}
