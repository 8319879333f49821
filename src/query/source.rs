//! The seam between the query cache and whatever fetches product pages.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::PagedProducts;
use crate::query::key::QueryKey;

/// Fetch failure as recorded in a cache entry.
///
/// Collapsed from the transport-level error so entries stay clonable and the
/// cache never holds onto a live connection error. Consumers mostly care
/// about "is it an error" plus a message; the variants keep the
/// network/server distinction visible for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
  /// No usable response (DNS, refused connection, timeout, ...)
  #[error("network error: {0}")]
  Network(String),
  /// The service answered with a non-success status
  #[error("server error: HTTP {0}")]
  Server(u16),
  /// The response body did not match the expected shape
  #[error("malformed response: {0}")]
  Decode(String),
}

/// Anything that can resolve a [`QueryKey`] into a page of products.
///
/// The cache is generic over this trait so its coalescing behavior is
/// testable with a scripted fake instead of an HTTP client.
#[async_trait]
pub trait ProductSource: Send + Sync {
  async fn fetch_page(&self, key: &QueryKey) -> Result<PagedProducts, QueryError>;
}

#[async_trait]
impl<S: ProductSource + ?Sized> ProductSource for std::sync::Arc<S> {
  async fn fetch_page(&self, key: &QueryKey) -> Result<PagedProducts, QueryError> {
    (**self).fetch_page(key).await
  }
}
