//! HTTP client for the remote catalog service.
//!
//! The service exposes three paged read endpoints (plain listing, text
//! search, per-category listing) plus a single-product detail endpoint and a
//! category name list. All of them are opaque GET-returning-JSON calls; this
//! client owns URL construction and the transport-level error taxonomy.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::query::{ProductSource, QueryError, QueryKey};

use super::types::{PagedProducts, Product};

/// Transport-level failure talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// The configured base URL cannot be used for requests
  #[error("invalid catalog base URL: {0}")]
  BaseUrl(String),
  /// Request never produced a usable response
  #[error("catalog request failed: {0}")]
  Transport(#[from] reqwest::Error),
  /// The service answered with a non-success status
  #[error("catalog returned HTTP {0}")]
  Status(StatusCode),
}

impl From<CatalogError> for QueryError {
  fn from(err: CatalogError) -> Self {
    match err {
      CatalogError::BaseUrl(msg) => QueryError::Network(msg),
      CatalogError::Status(status) => QueryError::Server(status.as_u16()),
      CatalogError::Transport(e) if e.is_decode() => QueryError::Decode(e.to_string()),
      CatalogError::Transport(e) => QueryError::Network(e.to_string()),
    }
  }
}

/// Catalog API client wrapper
#[derive(Debug, Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base: Url,
}

impl CatalogClient {
  pub fn new(config: &Config) -> Result<Self, CatalogError> {
    let mut base =
      Url::parse(&config.catalog.base_url).map_err(|e| CatalogError::BaseUrl(e.to_string()))?;

    if base.cannot_be_a_base() {
      return Err(CatalogError::BaseUrl(config.catalog.base_url.clone()));
    }

    // Joining relative paths drops the last segment unless the base ends
    // with a slash.
    if !base.path().ends_with('/') {
      base.set_path(&format!("{}/", base.path()));
    }

    Ok(Self {
      http: reqwest::Client::new(),
      base,
    })
  }

  /// Build the request URL for one cache key.
  ///
  /// Query text and category names are percent-encoded here; cache keys hold
  /// the raw strings.
  fn request_url(&self, key: &QueryKey) -> Result<Url, CatalogError> {
    let mut url = match key {
      QueryKey::Listing { .. } => self.join("products")?,
      QueryKey::Search { .. } => self.join("products/search")?,
      QueryKey::Category { name, .. } => {
        let mut url = self.join("products/category")?;
        url
          .path_segments_mut()
          .map_err(|_| CatalogError::BaseUrl(self.base.to_string()))?
          .push(name);
        url
      }
    };

    {
      let mut pairs = url.query_pairs_mut();
      if let QueryKey::Search { text, .. } = key {
        pairs.append_pair("q", text);
      }
      pairs.append_pair("limit", &key.limit().to_string());
      pairs.append_pair("skip", &key.skip().to_string());
    }

    Ok(url)
  }

  fn join(&self, path: &str) -> Result<Url, CatalogError> {
    self
      .base
      .join(path)
      .map_err(|e| CatalogError::BaseUrl(e.to_string()))
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
    debug!(%url, "catalog request");

    let response = self.http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(CatalogError::Status(status));
    }

    Ok(response.json::<T>().await?)
  }

  /// Fetch one page of products for the given key.
  pub async fn fetch_page(&self, key: &QueryKey) -> Result<PagedProducts, CatalogError> {
    let url = self.request_url(key)?;
    self.get_json(url).await
  }

  /// Fetch a single product by id.
  pub async fn fetch_product(&self, id: u64) -> Result<Product, CatalogError> {
    let url = self.join(&format!("products/{}", id))?;
    self.get_json(url).await
  }

  /// Fetch the ordered list of category names.
  pub async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
    let url = self.join("products/category-list")?;
    self.get_json(url).await
  }
}

#[async_trait::async_trait]
impl ProductSource for CatalogClient {
  async fn fetch_page(&self, key: &QueryKey) -> Result<PagedProducts, QueryError> {
    Ok(CatalogClient::fetch_page(self, key).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> CatalogClient {
    let config = Config {
      catalog: crate::config::CatalogConfig {
        base_url: base.to_string(),
      },
    };
    CatalogClient::new(&config).expect("valid base url")
  }

  #[test]
  fn test_listing_url() {
    let url = client("https://dummyjson.com")
      .request_url(&QueryKey::Listing { limit: 20, skip: 40 })
      .unwrap();
    assert_eq!(url.as_str(), "https://dummyjson.com/products?limit=20&skip=40");
  }

  #[test]
  fn test_search_url_encoding() {
    let url = client("https://dummyjson.com")
      .request_url(&QueryKey::Search {
        text: "blue phone".to_string(),
        limit: 20,
        skip: 0,
      })
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://dummyjson.com/products/search?q=blue+phone&limit=20&skip=0"
    );
  }

  #[test]
  fn test_category_url_encoding() {
    let url = client("https://dummyjson.com")
      .request_url(&QueryKey::Category {
        name: "home decoration".to_string(),
        limit: 10,
        skip: 0,
      })
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://dummyjson.com/products/category/home%20decoration?limit=10&skip=0"
    );
  }

  #[test]
  fn test_base_path_join() {
    let url = client("http://localhost:8080/api")
      .request_url(&QueryKey::Listing { limit: 20, skip: 0 })
      .unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/products?limit=20&skip=0");
  }

  #[test]
  fn test_invalid_base_url() {
    let config = Config {
      catalog: crate::config::CatalogConfig {
        base_url: "not a url".to_string(),
      },
    };
    assert!(matches!(
      CatalogClient::new(&config),
      Err(CatalogError::BaseUrl(_))
    ));
  }

  #[test]
  fn test_status_maps_to_server_error() {
    let err = QueryError::from(CatalogError::Status(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err, QueryError::Server(500));
  }
}
