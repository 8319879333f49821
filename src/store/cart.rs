//! Cart state: line items and their quantity arithmetic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::Product;

use super::subscription::{Subscribers, Subscription};

/// One cart line. `price`, `title` and `thumbnail` are snapshots taken when
/// the product was first added; later adds of the same id only bump the
/// quantity so the price-at-add-time is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
  pub id: u64,
  pub title: String,
  pub price: f64,
  pub thumbnail: String,
  pub quantity: u32,
}

/// Cart container. At most one line per product id; a line's quantity is
/// never observable below 1 because decreasing past 1 removes the line.
#[derive(Default)]
pub struct CartStore {
  items: Mutex<Vec<CartItem>>,
  subscribers: Subscribers,
}

impl CartStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Vec<CartItem>> {
    self.items.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Add one unit of `product`: existing lines gain quantity, new products
  /// get a fresh line with a price snapshot.
  pub fn add_to_cart(&self, product: &Product) {
    {
      let mut items = self.lock();
      if let Some(existing) = items.iter_mut().find(|item| item.id == product.id) {
        existing.quantity += 1;
      } else {
        items.push(CartItem {
          id: product.id,
          title: product.title.clone(),
          price: product.price,
          thumbnail: product.thumbnail.clone(),
          quantity: 1,
        });
      }
    }
    self.subscribers.notify();
  }

  /// Delete the line for `id`; absent ids are a no-op, not an error.
  pub fn remove_from_cart(&self, id: u64) {
    let removed = {
      let mut items = self.lock();
      let before = items.len();
      items.retain(|item| item.id != id);
      items.len() != before
    };
    if removed {
      self.subscribers.notify();
    }
  }

  /// Bump the quantity of an existing line; absent ids are a no-op.
  pub fn increase_quantity(&self, id: u64) {
    let changed = {
      let mut items = self.lock();
      match items.iter_mut().find(|item| item.id == id) {
        Some(item) => {
          item.quantity += 1;
          true
        }
        None => false,
      }
    };
    if changed {
      self.subscribers.notify();
    }
  }

  /// Lower the quantity of an existing line, removing it at quantity 1 so a
  /// zero-quantity line never exists.
  pub fn decrease_quantity(&self, id: u64) {
    let changed = {
      let mut items = self.lock();
      match items.iter().position(|item| item.id == id) {
        Some(index) => {
          if items[index].quantity > 1 {
            items[index].quantity -= 1;
          } else {
            items.remove(index);
          }
          true
        }
        None => false,
      }
    };
    if changed {
      self.subscribers.notify();
    }
  }

  /// Empty the cart unconditionally.
  pub fn clear(&self) {
    self.lock().clear();
    self.subscribers.notify();
  }

  /// Current lines in insertion order.
  pub fn items(&self) -> Vec<CartItem> {
    self.lock().clone()
  }

  pub fn contains(&self, id: u64) -> bool {
    self.lock().iter().any(|item| item.id == id)
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Total unit count, recomputed from current lines on every call.
  pub fn total_items(&self) -> u32 {
    self.lock().iter().map(|item| item.quantity).sum()
  }

  /// Total price, recomputed from current lines on every call.
  pub fn total_price(&self) -> f64 {
    self
      .lock()
      .iter()
      .map(|item| item.price * item.quantity as f64)
      .sum()
  }

  pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
    self.subscribers.subscribe(listener)
  }
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
      rating: 4.5,
      stock: 10,
      brand: String::new(),
      category: "misc".to_string(),
      thumbnail: format!("https://cdn.example/{}.jpg", id),
      images: Vec::new(),
    }
  }

  #[test]
  fn test_repeated_adds_accumulate() {
    let cart = CartStore::new();
    let p = product(1, "Soap", 3.0);

    cart.add_to_cart(&p);
    cart.add_to_cart(&p);
    cart.add_to_cart(&p);

    let items = cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
  }

  #[test]
  fn test_add_keeps_snapshot() {
    let cart = CartStore::new();
    cart.add_to_cart(&product(1, "Soap", 3.0));

    // Same id, different remote state: the line must keep its add-time price.
    let mut restocked = product(1, "Soap Deluxe", 4.5);
    restocked.thumbnail = "https://cdn.example/new.jpg".to_string();
    cart.add_to_cart(&restocked);

    let items = cart.items();
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].title, "Soap");
    assert!((items[0].price - 3.0).abs() < f64::EPSILON);
    assert_eq!(items[0].thumbnail, "https://cdn.example/1.jpg");
  }

  #[test]
  fn test_decrease_removes_at_one() {
    let cart = CartStore::new();
    cart.add_to_cart(&product(1, "Soap", 3.0));
    cart.add_to_cart(&product(1, "Soap", 3.0));

    cart.decrease_quantity(1);
    assert_eq!(cart.items()[0].quantity, 1);

    cart.decrease_quantity(1);
    assert!(cart.is_empty());
  }

  #[test]
  fn test_decrease_count_empties_line() {
    let cart = CartStore::new();
    let p = product(9, "Mug", 7.0);
    for _ in 0..5 {
      cart.add_to_cart(&p);
    }
    for _ in 0..5 {
      cart.decrease_quantity(9);
    }
    assert!(cart.is_empty());
  }

  #[test]
  fn test_absent_ids_are_noops() {
    let cart = CartStore::new();
    cart.remove_from_cart(42);
    cart.increase_quantity(42);
    cart.decrease_quantity(42);
    assert!(cart.is_empty());
  }

  #[test]
  fn test_totals_recompute() {
    let cart = CartStore::new();
    cart.add_to_cart(&product(1, "Soap", 3.0));
    cart.add_to_cart(&product(2, "Mug", 7.5));
    cart.increase_quantity(2);

    assert_eq!(cart.total_items(), 3);
    assert!((cart.total_price() - 18.0).abs() < 1e-9);

    cart.remove_from_cart(1);
    assert_eq!(cart.total_items(), 2);
    assert!((cart.total_price() - 15.0).abs() < 1e-9);
  }

  #[test]
  fn test_clear() {
    let cart = CartStore::new();
    cart.add_to_cart(&product(1, "Soap", 3.0));
    cart.add_to_cart(&product(2, "Mug", 7.5));

    cart.clear();
    assert!(cart.is_empty());
    assert_eq!(cart.total_items(), 0);
    assert!((cart.total_price()).abs() < f64::EPSILON);
  }

  #[test]
  fn test_insertion_order() {
    let cart = CartStore::new();
    cart.add_to_cart(&product(3, "C", 1.0));
    cart.add_to_cart(&product(1, "A", 1.0));
    cart.add_to_cart(&product(2, "B", 1.0));

    let ids: Vec<u64> = cart.items().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
  }

  #[test]
  fn test_add_decrease_scenario() {
    let cart = CartStore::new();
    let p = product(7, "Lamp", 5.0);

    cart.add_to_cart(&p);
    cart.add_to_cart(&p);
    assert_eq!(cart.total_items(), 2);
    assert!((cart.total_price() - 10.0).abs() < 1e-9);

    cart.decrease_quantity(7);
    assert_eq!(cart.total_items(), 1);

    cart.decrease_quantity(7);
    assert!(cart.is_empty());
  }
}
