//! Derived view: the product list actually shown.
//!
//! A pure projection over the cached payload plus the current sort and
//! cart/favorites membership. The cached payload is never touched; sorting
//! always copies, so reads under a different sort later still observe the
//! server-provided order.

use unicase::UniCase;

use crate::catalog::{PagedProducts, Product};
use crate::store::{CartStore, FavoritesStore, SortOption};

/// One displayed row: the product plus derived membership flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
  pub product: Product,
  pub is_favorite: bool,
  pub in_cart: bool,
}

/// Project the cached page into the displayed list.
///
/// The server has already applied search/category filtering; this only
/// sorts (stably, ties keep the server order) and attaches membership flags.
pub fn visible_products(
  payload: &PagedProducts,
  sort: SortOption,
  cart: &CartStore,
  favorites: &FavoritesStore,
) -> Vec<ProductView> {
  let mut views: Vec<ProductView> = payload
    .products
    .iter()
    .cloned()
    .map(|product| ProductView {
      is_favorite: favorites.is_favorite(product.id),
      in_cart: cart.contains(product.id),
      product,
    })
    .collect();

  match sort {
    SortOption::NameAsc => views.sort_by(|a, b| {
      UniCase::new(a.product.title.as_str()).cmp(&UniCase::new(b.product.title.as_str()))
    }),
    SortOption::PriceAsc => views.sort_by(|a, b| a.product.price.total_cmp(&b.product.price)),
    SortOption::PriceDesc => views.sort_by(|a, b| b.product.price.total_cmp(&a.product.price)),
  }

  views
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(id: u64, title: &str, price: f64) -> Product {
    Product {
      id,
      title: title.to_string(),
      description: String::new(),
      price,
      discount_percentage: 0.0,
      rating: 4.0,
      stock: 3,
      brand: String::new(),
      category: "misc".to_string(),
      thumbnail: String::new(),
      images: Vec::new(),
    }
  }

  fn payload(products: Vec<Product>) -> PagedProducts {
    let total = products.len() as u32;
    PagedProducts {
      products,
      total,
      skip: 0,
      limit: 20,
    }
  }

  fn titles(views: &[ProductView]) -> Vec<&str> {
    views.iter().map(|v| v.product.title.as_str()).collect()
  }

  #[test]
  fn test_name_sort() {
    let page = payload(vec![product(1, "B", 10.0), product(2, "A", 20.0)]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    let views = visible_products(&page, SortOption::NameAsc, &cart, &favorites);
    assert_eq!(titles(&views), vec!["A", "B"]);
  }

  #[test]
  fn test_name_sort_ignores_case() {
    let page = payload(vec![
      product(1, "zebra", 1.0),
      product(2, "Apple", 1.0),
      product(3, "mango", 1.0),
    ]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    let views = visible_products(&page, SortOption::NameAsc, &cart, &favorites);
    assert_eq!(titles(&views), vec!["Apple", "mango", "zebra"]);
  }

  #[test]
  fn test_price_sorts() {
    let page = payload(vec![product(1, "B", 10.0), product(2, "A", 20.0)]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    let asc = visible_products(&page, SortOption::PriceAsc, &cart, &favorites);
    assert_eq!(titles(&asc), vec!["B", "A"]);

    let desc = visible_products(&page, SortOption::PriceDesc, &cart, &favorites);
    assert_eq!(titles(&desc), vec!["A", "B"]);
  }

  #[test]
  fn test_ties_preserve_server_order() {
    let page = payload(vec![
      product(1, "first", 5.0),
      product(2, "second", 5.0),
      product(3, "third", 5.0),
    ]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    let views = visible_products(&page, SortOption::PriceAsc, &cart, &favorites);
    assert_eq!(titles(&views), vec!["first", "second", "third"]);
  }

  #[test]
  fn test_sort_copies_payload() {
    let page = payload(vec![product(1, "B", 10.0), product(2, "A", 20.0)]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    let _sorted = visible_products(&page, SortOption::NameAsc, &cart, &favorites);

    let server_order: Vec<&str> = page.products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(server_order, vec!["B", "A"]);
  }

  #[test]
  fn test_membership_flags() {
    let page = payload(vec![product(1, "A", 1.0), product(2, "B", 2.0)]);
    let cart = CartStore::new();
    let favorites = FavoritesStore::new();

    favorites.toggle_favorite(1);
    cart.add_to_cart(&product(2, "B", 2.0));

    let views = visible_products(&page, SortOption::NameAsc, &cart, &favorites);
    assert!(views[0].is_favorite);
    assert!(!views[0].in_cart);
    assert!(!views[1].is_favorite);
    assert!(views[1].in_cart);
  }
}
