//! # Wallaby Catalog
//!
//! Static store data and the lookup heuristics the assistant's tools expose.
//!
//! ```text
//! StoreCatalog (read-only after construction)
//!     ├─ products      key → Product, ordered
//!     ├─ aisle_layout  aisle → department
//!     └─ meal_rules    trigger items → suggestion
//!
//! lookup
//!     ├─ find_item              exact → substring → shared word
//!     ├─ process_shopping_list  aisle-ordered plan + total + meal ideas
//!     ├─ aisle_info / browse_products / meal_suggestions / item_stock
//!     └─ store_layout
//! ```

mod builtin;
mod error;
mod lookup;
mod types;

pub use builtin::builtin_catalog;
pub use error::{CatalogError, Result};
pub use lookup::{
    round_cents, AisleInfo, BrowseResult, ItemStock, MealSuggestions, ShoppingListPlan,
    StockStatus, StoreLayout, BROWSE_LIMIT, LOW_STOCK_THRESHOLD,
};
pub use types::{AisleLayout, CatalogEntry, MealRule, Product, ProductMap, StoreCatalog};
