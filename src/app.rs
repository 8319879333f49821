//! Top-level composition of the storefront core.
//!
//! `Storefront` owns nothing the individual containers don't already own; it
//! wires them together via dependency injection so every piece stays
//! independently testable: the debouncer commits into the UI store, the UI
//! store's filter state derives the cache key, and the derived view reads
//! all of them.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogClient, CatalogError, PagedProducts};
use crate::config::{Config, DEFAULT_PAGE_LIMIT};
use crate::debounce::SearchDebouncer;
use crate::query::{ProductQuery, ProductSource, QueryCache, QueryHandle};
use crate::store::{CartStore, FavoritesStore, UiStore};
use crate::view::ProductView;

/// The composed client core: stores, debounced search, and the query cache.
pub struct Storefront<S: ProductSource + 'static> {
  ui: Arc<UiStore>,
  cart: Arc<CartStore>,
  favorites: Arc<FavoritesStore>,
  cache: QueryCache<S>,
  search: SearchDebouncer,
  page_limit: u32,
}

impl Storefront<CatalogClient> {
  /// Storefront wired to the live catalog endpoint from `config`.
  pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
    Ok(Self::new(CatalogClient::new(config)?))
  }
}

impl<S: ProductSource + 'static> Storefront<S> {
  pub fn new(source: S) -> Self {
    let ui = Arc::new(UiStore::new());

    let commit_target = Arc::clone(&ui);
    let search = SearchDebouncer::new(move |text| commit_target.set_search(text));

    Self {
      ui,
      cart: Arc::new(CartStore::new()),
      favorites: Arc::new(FavoritesStore::new()),
      cache: QueryCache::new(source),
      search,
      page_limit: DEFAULT_PAGE_LIMIT,
    }
  }

  /// Override the page size used for derived queries.
  pub fn with_page_limit(mut self, limit: u32) -> Self {
    self.page_limit = limit;
    self
  }

  /// Override the search debounce delay (tests mostly).
  pub fn with_search_delay(mut self, delay: Duration) -> Self {
    let commit_target = Arc::clone(&self.ui);
    self.search = SearchDebouncer::with_delay(delay, move |text| commit_target.set_search(text));
    self
  }

  pub fn ui(&self) -> &UiStore {
    &self.ui
  }

  pub fn cart(&self) -> &CartStore {
    &self.cart
  }

  pub fn favorites(&self) -> &FavoritesStore {
    &self.favorites
  }

  pub fn cache(&self) -> &QueryCache<S> {
    &self.cache
  }

  /// Feed one search keystroke through the debouncer. The echoed value
  /// updates immediately; the UI store's committed search text follows
  /// after the quiet period.
  pub fn type_search(&mut self, text: impl Into<String>) {
    self.search.input(text);
  }

  /// The immediately-echoed input value (not yet committed).
  pub fn search_echo(&self) -> &str {
    self.search.value()
  }

  /// The fetch parameters derived from current filter state.
  pub fn current_query(&self, skip: u32) -> ProductQuery {
    let state = self.ui.snapshot();
    ProductQuery {
      search: state.search,
      category: state.category,
      limit: self.page_limit,
      skip,
    }
  }

  /// Query the first page for the current filter state.
  pub fn products(&self) -> QueryHandle<S> {
    self.products_page(0)
  }

  /// Query an arbitrary page offset for the current filter state.
  pub fn products_page(&self, skip: u32) -> QueryHandle<S> {
    self.cache.query(&self.current_query(skip))
  }

  /// Project a fetched page through the current sort and membership state.
  pub fn visible_products(&self, payload: &PagedProducts) -> Vec<ProductView> {
    crate::view::visible_products(payload, self.ui.sort(), &self.cart, &self.favorites)
  }
}
