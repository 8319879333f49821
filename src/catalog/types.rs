//! Serde-deserializable types matching the remote catalog's JSON responses.
//!
//! Products are immutable once fetched and identified by `id`. Fields the
//! service occasionally omits (brand, images) default to empty rather than
//! failing the whole page.

use serde::{Deserialize, Serialize};

/// One product as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub price: f64,
  #[serde(rename = "discountPercentage", default)]
  pub discount_percentage: f64,
  #[serde(default)]
  pub rating: f64,
  #[serde(default)]
  pub stock: u32,
  #[serde(default)]
  pub brand: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default)]
  pub images: Vec<String>,
}

/// Paged response shape shared by the listing, search and category endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedProducts {
  pub products: Vec<Product>,
  pub total: u32,
  pub skip: u32,
  pub limit: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_page() {
    let body = r#"{
      "products": [
        {
          "id": 1,
          "title": "Essence Mascara",
          "description": "Popular mascara",
          "price": 9.99,
          "discountPercentage": 7.17,
          "rating": 4.94,
          "stock": 5,
          "brand": "Essence",
          "category": "beauty",
          "thumbnail": "https://cdn.example/1/thumb.jpg",
          "images": ["https://cdn.example/1/1.jpg"]
        }
      ],
      "total": 194,
      "skip": 0,
      "limit": 20
    }"#;

    let page: PagedProducts = serde_json::from_str(body).expect("valid page");
    assert_eq!(page.total, 194);
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].id, 1);
    assert!((page.products[0].discount_percentage - 7.17).abs() < f64::EPSILON);
  }

  #[test]
  fn test_missing_optional_fields() {
    let body = r#"{"id": 7, "title": "Bare", "price": 5.0}"#;
    let product: Product = serde_json::from_str(body).expect("valid product");
    assert_eq!(product.brand, "");
    assert!(product.images.is_empty());
    assert_eq!(product.stock, 0);
  }
}
