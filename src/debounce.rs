//! Keystroke debouncing for the search input.
//!
//! The locally echoed value updates on every keystroke; the commit callback
//! (wired to `UiStore::set_search` at composition time) fires at most once
//! per quiet period. Superseded timers are aborted and never fire, so there
//! is no backlog of stale commits.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::SEARCH_DEBOUNCE;

/// Buffers rapid search input and commits the latest value after a quiet
/// period.
///
/// Must be used from within a Tokio runtime; each keystroke spawns an
/// abortable timer task.
pub struct SearchDebouncer {
  delay: Duration,
  commit: Arc<dyn Fn(String) + Send + Sync>,
  value: String,
  pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
  /// Debouncer with the standard 400 ms quiet period.
  pub fn new(commit: impl Fn(String) + Send + Sync + 'static) -> Self {
    Self::with_delay(SEARCH_DEBOUNCE, commit)
  }

  pub fn with_delay(delay: Duration, commit: impl Fn(String) + Send + Sync + 'static) -> Self {
    Self {
      delay,
      commit: Arc::new(commit),
      value: String::new(),
      pending: None,
    }
  }

  /// Record a keystroke: update the local echo immediately and restart the
  /// commit timer with the latest value (last write wins).
  pub fn input(&mut self, text: impl Into<String>) {
    self.value = text.into();

    if let Some(pending) = self.pending.take() {
      pending.abort();
    }

    let commit = Arc::clone(&self.commit);
    let value = self.value.clone();
    let delay = self.delay;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      commit(value);
    }));
  }

  /// The immediately-updated local value, independent of the commit.
  pub fn value(&self) -> &str {
    &self.value
  }

  /// Abort any pending commit. Safe to call repeatedly.
  pub fn cancel(&mut self) {
    if let Some(pending) = self.pending.take() {
      pending.abort();
    }
  }
}

impl Drop for SearchDebouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}

impl std::fmt::Debug for SearchDebouncer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SearchDebouncer")
      .field("delay", &self.delay)
      .field("value", &self.value)
      .field("pending", &self.pending.is_some())
      .finish_non_exhaustive()
  }
}
