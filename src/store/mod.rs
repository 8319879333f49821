//! Independently-owned state containers with a narrow mutation API and a
//! synchronous observer contract.

mod cart;
mod favorites;
mod subscription;
mod ui;

pub use cart::{CartItem, CartStore};
pub use favorites::FavoritesStore;
pub use subscription::{Subscribers, Subscription};
pub use ui::{SortOption, Theme, UiState, UiStore};
