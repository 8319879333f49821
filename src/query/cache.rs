//! Single-flight query cache for catalog pages.
//!
//! One entry per normalized [`QueryKey`]. The first consumer of a key issues
//! the network fetch; every concurrent consumer of the same key shares the
//! pending entry instead of firing a duplicate request. Completed entries are
//! served from memory for the life of the process: there is no eviction and
//! no TTL, which is an accepted capacity tradeoff for a session-scoped cache.
//!
//! # Example
//!
//! ```ignore
//! let cache = QueryCache::new(CatalogClient::new(&config)?);
//! let mut handle = cache.query(&ProductQuery::default());
//!
//! let snapshot = handle.settled().await;
//! if let Some(page) = snapshot.data {
//!     render(&page.products);
//! }
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

use crate::catalog::PagedProducts;

use super::key::{ProductQuery, QueryKey};
use super::source::{ProductSource, QueryError};

/// Lifecycle of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
  /// A fetch is in flight and nothing has been cached yet
  Pending,
  /// The last applied fetch succeeded
  Success,
  /// The last applied fetch failed
  Error(QueryError),
}

/// Point-in-time view of one cache entry.
///
/// `status` and `data` are independent: an entry that errors on a refetch
/// keeps whatever payload the same key had already cached.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
  pub status: QueryStatus,
  pub data: Option<Arc<PagedProducts>>,
  pub fetched_at: Option<DateTime<Utc>>,
  /// A fetch is in flight (initial load or refetch)
  pub is_fetching: bool,
}

impl QuerySnapshot {
  fn empty() -> Self {
    Self {
      status: QueryStatus::Pending,
      data: None,
      fetched_at: None,
      is_fetching: false,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.status, QueryStatus::Pending)
  }

  pub fn is_success(&self) -> bool {
    matches!(self.status, QueryStatus::Success)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.status, QueryStatus::Error(_))
  }

  pub fn error(&self) -> Option<&QueryError> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }
}

struct CacheEntry {
  status: QueryStatus,
  payload: Option<Arc<PagedProducts>>,
  fetched_at: Option<DateTime<Utc>>,
  /// Sequence number of the most recently issued fetch
  issued: u64,
  /// Sequence number of the most recently applied completion
  applied: u64,
  /// Bumped on every observable transition; handles subscribe to this
  version: watch::Sender<u64>,
}

impl CacheEntry {
  fn new() -> Self {
    let (version, _) = watch::channel(0);
    Self {
      status: QueryStatus::Pending,
      payload: None,
      fetched_at: None,
      issued: 0,
      applied: 0,
      version,
    }
  }

  fn bump(&self) {
    self.version.send_modify(|v| *v += 1);
  }

  fn snapshot(&self) -> QuerySnapshot {
    QuerySnapshot {
      status: self.status.clone(),
      data: self.payload.clone(),
      fetched_at: self.fetched_at,
      is_fetching: self.issued > self.applied,
    }
  }
}

struct CacheInner<S> {
  source: S,
  entries: Mutex<HashMap<QueryKey, CacheEntry>>,
}

impl<S> CacheInner<S> {
  fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn complete(&self, key: &QueryKey, seq: u64, result: Result<PagedProducts, QueryError>) {
    let mut entries = self.lock();
    let Some(entry) = entries.get_mut(key) else {
      // Invalidated while the fetch was in flight
      return;
    };

    if seq != entry.issued {
      debug!(
        key = %key.description(),
        seq,
        latest = entry.issued,
        "discarding superseded completion"
      );
      return;
    }

    entry.applied = seq;
    match result {
      Ok(payload) => {
        entry.status = QueryStatus::Success;
        entry.payload = Some(Arc::new(payload));
        entry.fetched_at = Some(Utc::now());
      }
      Err(err) => {
        // Keep any payload this key already cached; just surface the error.
        entry.status = QueryStatus::Error(err);
      }
    }
    entry.bump();
  }
}

/// In-memory query cache with request coalescing.
///
/// Generic over the [`ProductSource`] that resolves keys, so coalescing and
/// race behavior are testable without any HTTP involved. Cloning is cheap and
/// shares the underlying entry map.
pub struct QueryCache<S> {
  inner: Arc<CacheInner<S>>,
}

impl<S: ProductSource + 'static> QueryCache<S> {
  pub fn new(source: S) -> Self {
    Self {
      inner: Arc::new(CacheInner {
        source,
        entries: Mutex::new(HashMap::new()),
      }),
    }
  }

  /// Look up (or create) the entry for the given parameters.
  ///
  /// A key never seen before, or whose previous fetch errored, issues exactly
  /// one network request. A pending key is shared as-is; a successful key is
  /// served from memory without touching the network.
  pub fn query(&self, params: &ProductQuery) -> QueryHandle<S> {
    self.query_key(QueryKey::derive(params))
  }

  /// Same as [`query`](Self::query), for an already-derived key.
  pub fn query_key(&self, key: QueryKey) -> QueryHandle<S> {
    let rx = {
      let mut entries = self.inner.lock();
      let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);

      let needs_fetch = match entry.status {
        QueryStatus::Pending => entry.issued == 0,
        QueryStatus::Error(_) => true,
        QueryStatus::Success => false,
      };
      if needs_fetch {
        self.issue(&key, entry);
      } else {
        debug!(key = %key.description(), "cache hit");
      }

      entry.version.subscribe()
    };

    QueryHandle {
      cache: self.clone(),
      key,
      rx,
    }
  }

  /// Force a new fetch for `key` regardless of cached status.
  ///
  /// A previously cached payload stays visible while the refetch is in
  /// flight.
  pub fn refetch(&self, key: &QueryKey) {
    let mut entries = self.inner.lock();
    let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::new);
    self.issue(key, entry);
  }

  /// Drop the cached entry for `key`; the next query refetches from scratch.
  pub fn invalidate(&self, key: &QueryKey) {
    if self.inner.lock().remove(key).is_some() {
      debug!(key = %key.description(), "entry invalidated");
    }
  }

  /// Snapshot the entry for `key`, if one exists.
  pub fn snapshot(&self, key: &QueryKey) -> Option<QuerySnapshot> {
    self.inner.lock().get(key).map(CacheEntry::snapshot)
  }

  /// Number of handles currently subscribed to `key`.
  pub fn subscriber_count(&self, key: &QueryKey) -> usize {
    self
      .inner
      .lock()
      .get(key)
      .map(|e| e.version.receiver_count())
      .unwrap_or(0)
  }

  /// Number of cached entries (grows monotonically; see module docs).
  pub fn len(&self) -> usize {
    self.inner.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().is_empty()
  }

  /// Record a new in-flight fetch for `entry` and spawn it.
  ///
  /// Each fetch carries the entry's issue sequence number; a completion
  /// applies only while its sequence is still the latest, so when an
  /// explicit refetch races an in-flight fetch the last *issued* one
  /// deterministically wins.
  fn issue(&self, key: &QueryKey, entry: &mut CacheEntry) {
    entry.issued += 1;
    if !matches!(entry.status, QueryStatus::Success) {
      entry.status = QueryStatus::Pending;
    }
    entry.bump();

    debug!(key = %key.description(), seq = entry.issued, "issuing fetch");

    let seq = entry.issued;
    let key = key.clone();
    let inner = Arc::clone(&self.inner);
    tokio::spawn(async move {
      let result = inner.source.fetch_page(&key).await;
      inner.complete(&key, seq, result);
    });
  }
}

impl<S> Clone for QueryCache<S> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

/// Handle to one cache entry, bound to a key.
///
/// Cheap to clone; every clone counts as one subscriber of the key.
pub struct QueryHandle<S: ProductSource> {
  cache: QueryCache<S>,
  key: QueryKey,
  rx: watch::Receiver<u64>,
}

impl<S: ProductSource + 'static> QueryHandle<S> {
  pub fn key(&self) -> &QueryKey {
    &self.key
  }

  /// Snapshot the current state of the bound entry.
  pub fn state(&self) -> QuerySnapshot {
    self
      .cache
      .snapshot(&self.key)
      .unwrap_or_else(QuerySnapshot::empty)
  }

  pub fn data(&self) -> Option<Arc<PagedProducts>> {
    self.state().data
  }

  /// Force a new fetch for this handle's key.
  pub fn refetch(&self) {
    self.cache.refetch(&self.key);
  }

  /// Wait for the next observable transition of the bound entry.
  ///
  /// Returns `false` if the entry was invalidated and no further transitions
  /// can arrive through this handle.
  pub async fn changed(&mut self) -> bool {
    self.rx.changed().await.is_ok()
  }

  /// Wait until the entry is neither loading nor refetching.
  pub async fn settled(&mut self) -> QuerySnapshot {
    loop {
      let snapshot = self.state();
      if !snapshot.is_loading() && !snapshot.is_fetching {
        return snapshot;
      }
      if !self.changed().await {
        return self.state();
      }
    }
  }
}

impl<S: ProductSource> Clone for QueryHandle<S> {
  fn clone(&self) -> Self {
    Self {
      cache: self.cache.clone(),
      key: self.key.clone(),
      rx: self.rx.clone(),
    }
  }
}

impl<S: ProductSource> std::fmt::Debug for QueryHandle<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueryHandle")
      .field("key", &self.key)
      .finish_non_exhaustive()
  }
}
