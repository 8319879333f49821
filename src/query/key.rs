//! Normalized request tuples identifying one cacheable catalog query.

use crate::config::DEFAULT_PAGE_LIMIT;

/// Fetch parameters as supplied by the UI layer.
///
/// `search` and `category` may both be set; key derivation decides which one
/// wins. `limit`/`skip` are plain pagination values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
  pub search: String,
  pub category: Option<String>,
  pub limit: u32,
  pub skip: u32,
}

impl Default for ProductQuery {
  fn default() -> Self {
    Self {
      search: String::new(),
      category: None,
      limit: DEFAULT_PAGE_LIMIT,
      skip: 0,
    }
  }
}

/// Cache key for one catalog request.
///
/// The three variants mirror the three upstream request shapes. Derivation is
/// priority-ordered: a non-empty search always wins over a category filter,
/// and both win over the plain listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// Unfiltered page of the catalog
  Listing { limit: u32, skip: u32 },
  /// Full-text search; the active category is deliberately ignored
  Search { text: String, limit: u32, skip: u32 },
  /// Single-category page
  Category { name: String, limit: u32, skip: u32 },
}

impl QueryKey {
  /// Derive the cache key from raw fetch parameters.
  ///
  /// Search text is trimmed before the emptiness check and stored trimmed, so
  /// `" phone "` and `"phone"` coalesce onto one entry. The category string
  /// is kept as given once it passes its own trim check.
  pub fn derive(params: &ProductQuery) -> Self {
    let text = params.search.trim();
    if !text.is_empty() {
      return Self::Search {
        text: text.to_string(),
        limit: params.limit,
        skip: params.skip,
      };
    }

    if let Some(category) = &params.category {
      if !category.trim().is_empty() {
        return Self::Category {
          name: category.clone(),
          limit: params.limit,
          skip: params.skip,
        };
      }
    }

    Self::Listing {
      limit: params.limit,
      skip: params.skip,
    }
  }

  /// Human-readable label for logs.
  pub fn description(&self) -> String {
    match self {
      Self::Listing { limit, skip } => format!("listing limit={} skip={}", limit, skip),
      Self::Search { text, limit, skip } => {
        format!("search '{}' limit={} skip={}", text, limit, skip)
      }
      Self::Category { name, limit, skip } => {
        format!("category '{}' limit={} skip={}", name, limit, skip)
      }
    }
  }

  pub fn limit(&self) -> u32 {
    match self {
      Self::Listing { limit, .. } | Self::Search { limit, .. } | Self::Category { limit, .. } => {
        *limit
      }
    }
  }

  pub fn skip(&self) -> u32 {
    match self {
      Self::Listing { skip, .. } | Self::Search { skip, .. } | Self::Category { skip, .. } => *skip,
    }
  }
}
