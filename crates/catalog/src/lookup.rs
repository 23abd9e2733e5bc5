//! Read-only lookups over a [`StoreCatalog`].
//!
//! Item matching is a cascade of increasingly loose heuristics:
//! exact key, then substring (either direction), then shared word.
//! Later tiers produce false positives the earlier tiers avoid, so a tier is
//! only consulted once the previous one has failed for every product.

use crate::error::{CatalogError, Result};
use crate::types::{AisleLayout, Product, StoreCatalog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Stock below this count is reported as low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;
/// Upper bound on products returned by [`StoreCatalog::browse_products`].
pub const BROWSE_LIMIT: usize = 20;

/// Agent instruction text that sometimes leaks into list items.
const LEAKED_INSTRUCTION: &str = "input should be";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In stock")]
    InStock,
    #[serde(rename = "Low stock")]
    LowStock,
    #[serde(rename = "Out of stock")]
    OutOfStock,
    #[serde(rename = "Not found")]
    NotFound,
}

impl StockStatus {
    pub fn for_quantity(stock: u32) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if stock < LOW_STOCK_THRESHOLD {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::LowStock => "Low stock",
            Self::OutOfStock => "Out of stock",
            Self::NotFound => "Not found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MealSuggestions {
    /// Meals whose every trigger item is present
    pub suggestions: Vec<String>,
    /// Meal → trigger items still missing (only for partially matched meals)
    pub missing_for_meal: BTreeMap<String, Vec<String>>,
}

impl MealSuggestions {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.missing_for_meal.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListPlan {
    /// Found products, ascending by aisle (input order within an aisle)
    pub found: Vec<Product>,
    pub not_found: Vec<String>,
    pub total_cost: f64,
    pub unique_aisles: Vec<u32>,
    pub meal_suggestions: MealSuggestions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AisleInfo {
    pub aisle_number: u32,
    pub department: String,
    /// Products in the aisle, sorted by display name
    pub products: Vec<Product>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResult {
    /// Total number of matching products (before truncation)
    pub count: usize,
    /// Cheapest matches first, at most [`BROWSE_LIMIT`]
    pub products: Vec<Product>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemStock {
    /// Display name of the matched product, `None` when nothing matched
    pub item_name: Option<String>,
    pub stock: u32,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLayout {
    pub store_id: String,
    pub store_name: String,
    pub aisle_layout: AisleLayout,
}

/// Round a currency amount to cents.
pub fn round_cents(value: f64) -> f64 {
    // adding 0.0 turns a negative zero positive
    (value * 100.0).round() / 100.0 + 0.0
}

impl StoreCatalog {
    /// Resolve a free-form item name to a product.
    pub fn find_item(&self, name: &str) -> Option<&Product> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(product) = self.product(&query) {
            return Some(product);
        }

        let by_substring = self.products().find(|product| {
            let display = product.name.to_lowercase();
            display.contains(&query) || query.contains(&display)
        });
        if by_substring.is_some() {
            return by_substring;
        }

        let query_words: HashSet<&str> = query.split_whitespace().collect();
        self.products().find(|product| {
            let display = product.name.to_lowercase();
            display
                .split_whitespace()
                .any(|word| query_words.contains(word))
        })
    }

    pub fn process_shopping_list<S: AsRef<str>>(&self, names: &[S]) -> ShoppingListPlan {
        let mut found = Vec::new();
        let mut not_found = Vec::new();

        for name in names {
            let name = name.as_ref();
            if name.to_lowercase().contains(LEAKED_INSTRUCTION) {
                not_found.push(name.to_string());
                continue;
            }
            match self.find_item(name) {
                Some(product) => found.push(product.clone()),
                None => not_found.push(name.to_string()),
            }
        }

        // sort_by_key is stable: equal aisles keep list order
        found.sort_by_key(|product| product.aisle);

        let total_cost =
            round_cents(found.iter().fold(0.0, |total, product| total + product.price));
        let unique_aisles = found
            .iter()
            .map(|product| product.aisle)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let found_names: Vec<&str> = found.iter().map(|product| product.name.as_str()).collect();
        let meal_suggestions = self.meal_suggestions(&found_names);

        ShoppingListPlan {
            found,
            not_found,
            total_cost,
            unique_aisles,
            meal_suggestions,
        }
    }

    pub fn aisle_info(&self, aisle_number: u32) -> Result<AisleInfo> {
        let department = self
            .department(aisle_number)
            .ok_or(CatalogError::AisleNotFound(aisle_number))?
            .to_string();

        let mut products: Vec<Product> = self
            .products()
            .filter(|product| product.aisle == aisle_number)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(AisleInfo {
            aisle_number,
            department,
            count: products.len(),
            products,
        })
    }

    pub fn browse_products(&self, category: Option<&str>, max_price: Option<f64>) -> BrowseResult {
        let category = category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let mut matches: Vec<Product> = self
            .products()
            .filter(|product| max_price.map_or(true, |ceiling| product.price <= ceiling))
            .filter(|product| match category.as_deref() {
                None => true,
                Some(category) => {
                    let department = self
                        .department(product.aisle)
                        .unwrap_or_default()
                        .to_lowercase();
                    department.contains(category) || product.name.to_lowercase().contains(category)
                }
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| a.price.total_cmp(&b.price));
        let count = matches.len();
        matches.truncate(BROWSE_LIMIT);

        BrowseResult {
            count,
            products: matches,
            message: format!("Found {count} items matching the criteria."),
        }
    }

    pub fn meal_suggestions<S: AsRef<str>>(&self, items: &[S]) -> MealSuggestions {
        let items: Vec<String> = items.iter().map(|item| item.as_ref().to_lowercase()).collect();
        let mut result = MealSuggestions::default();

        for rule in self.meal_rules() {
            let triggers: Vec<String> = rule
                .trigger_items
                .iter()
                .map(|trigger| trigger.to_lowercase())
                .collect();
            let (present, missing): (Vec<&String>, Vec<&String>) = triggers
                .iter()
                .partition(|trigger| items.iter().any(|item| item.contains(trigger.as_str())));

            if present.is_empty() {
                continue;
            }
            if missing.is_empty() {
                result.suggestions.push(rule.suggestion.clone());
            } else {
                result.missing_for_meal.insert(
                    rule.suggestion.clone(),
                    missing.into_iter().cloned().collect(),
                );
            }
        }

        result
    }

    pub fn item_stock(&self, name: &str) -> ItemStock {
        match self.find_item(name) {
            Some(product) => ItemStock {
                item_name: Some(product.name.clone()),
                stock: product.stock,
                status: StockStatus::for_quantity(product.stock),
            },
            None => ItemStock {
                item_name: None,
                stock: 0,
                status: StockStatus::NotFound,
            },
        }
    }

    pub fn store_layout(&self) -> StoreLayout {
        StoreLayout {
            store_id: self.store_id().to_string(),
            store_name: self.store_name().to_string(),
            aisle_layout: self.aisle_layout().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_catalog;
    use crate::types::MealRule;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_item_resolves_every_key() {
        let catalog = builtin_catalog();
        for entry in catalog.entries() {
            let found = catalog.find_item(&entry.key).expect("key resolves");
            assert_eq!(found, &entry.product);
        }
    }

    #[test]
    fn find_item_is_case_and_space_insensitive() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.find_item("  MILK ").map(|p| p.id.as_str()), Some("p1"));
    }

    #[test]
    fn find_item_unknown_returns_none() {
        let catalog = builtin_catalog();
        assert!(catalog.find_item("xyzzy plutonium").is_none());
        assert!(catalog.find_item("   ").is_none());
    }

    #[test]
    fn find_item_matches_substring_of_display_name() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.find_item("marinara").map(|p| p.id.as_str()), Some("p8"));
        assert_eq!(
            catalog.find_item("a jar of honey nut cereal please").map(|p| p.id.as_str()),
            Some("p15")
        );
    }

    #[test]
    fn find_item_falls_back_to_word_overlap() {
        let catalog = builtin_catalog();
        // no display name contains "beef jerky", but Ground Beef shares a word
        assert_eq!(catalog.find_item("beef jerky").map(|p| p.id.as_str()), Some("p6"));
    }

    #[test]
    fn substring_tier_wins_over_earlier_word_overlap() {
        let catalog = StoreCatalog::new(
            "s",
            "S",
            vec![
                ("red wine".to_string(), Product::new("a", "Red Wine", 1, 9.0, 5, "A1")),
                ("red apples".to_string(), Product::new("b", "Red Apples", 2, 2.0, 5, "A1")),
            ],
            AisleLayout::new(),
            Vec::new(),
        );
        // "Red Wine" comes first and shares the word "red", but "red appl" is a
        // substring of "Red Apples" and the substring tier is consulted first.
        assert_eq!(catalog.find_item("red appl").map(|p| p.id.as_str()), Some("b"));
        assert_eq!(catalog.find_item("red grapes").map(|p| p.id.as_str()), Some("a"));
    }

    #[test]
    fn shopping_list_orders_by_aisle_and_totals() {
        let catalog = builtin_catalog();
        let plan = catalog.process_shopping_list(&["bread", "milk"]);
        let ids: Vec<&str> = plan.found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(plan.total_cost, 6.00);
        assert_eq!(plan.unique_aisles, vec![3, 7]);
        assert!(plan.not_found.is_empty());
    }

    #[test]
    fn shopping_list_sort_is_stable_within_an_aisle() {
        let catalog = builtin_catalog();
        let plan = catalog.process_shopping_list(&["eggs", "bread", "milk", "almond milk"]);
        let ids: Vec<&str> = plan.found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p1a", "p2"]);
        assert_eq!(plan.unique_aisles, vec![3, 7]);
    }

    #[test]
    fn shopping_list_reports_missing_and_leaked_instructions() {
        let catalog = builtin_catalog();
        let plan = catalog.process_shopping_list(&[
            "milk",
            "unobtainium",
            "Input should be a comma separated list",
        ]);
        assert_eq!(plan.found.len(), 1);
        assert_eq!(
            plan.not_found,
            vec![
                "unobtainium".to_string(),
                "Input should be a comma separated list".to_string()
            ]
        );
        assert_eq!(plan.total_cost, 3.50);
    }

    #[test]
    fn shopping_list_with_nothing_found_totals_positive_zero() {
        let plan = builtin_catalog().process_shopping_list(&["unobtainium"]);
        assert_eq!(plan.total_cost, 0.0);
        assert!(plan.total_cost.is_sign_positive());
        assert!(round_cents(-0.0).is_sign_positive());
    }

    #[test]
    fn shopping_list_rounds_total_to_cents() {
        let catalog = builtin_catalog();
        let plan = catalog.process_shopping_list(&["bananas", "bananas", "bananas"]);
        assert_eq!(plan.total_cost, 3.75);
    }

    #[test]
    fn shopping_list_carries_meal_suggestions() {
        let catalog = builtin_catalog();
        let plan = catalog.process_shopping_list(&["chicken", "bread"]);
        assert_eq!(plan.meal_suggestions.suggestions, vec!["Chicken Sandwiches".to_string()]);
    }

    #[test]
    fn aisle_info_lists_only_that_aisle() {
        let catalog = builtin_catalog();
        let info = catalog.aisle_info(3).unwrap();
        assert_eq!(info.department, "Dairy & Refrigerated");
        assert_eq!(info.count, 4);
        assert!(info.products.iter().all(|p| p.aisle == 3));
        let names: Vec<&str> = info.products.iter().map(|p| p.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn aisle_info_empty_aisle_is_not_an_error() {
        let info = builtin_catalog().aisle_info(14).unwrap();
        assert_eq!(info.department, "Electronics");
        assert_eq!(info.count, 0);
    }

    #[test]
    fn aisle_info_unknown_aisle() {
        assert_eq!(
            builtin_catalog().aisle_info(99),
            Err(CatalogError::AisleNotFound(99))
        );
    }

    #[test]
    fn browse_by_price_ceiling_is_inclusive_and_sorted() {
        let result = builtin_catalog().browse_products(None, Some(2.0));
        let prices: Vec<f64> = result.products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.25, 1.50, 2.00]);
        assert_eq!(result.count, 3);
        assert_eq!(result.message, "Found 3 items matching the criteria.");
    }

    #[test]
    fn browse_by_category_matches_department_or_name() {
        let catalog = builtin_catalog();
        let produce = catalog.browse_products(Some("fresh produce"), None);
        let ids: Vec<&str> = produce.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p11", "p12"]);

        let milk = catalog.browse_products(Some("Milk"), Some(4.0));
        let ids: Vec<&str> = milk.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p1b"]);
    }

    #[test]
    fn browse_truncates_to_limit() {
        let products = (0..30)
            .map(|i| {
                (
                    format!("item {i}"),
                    Product::new(format!("id{i}"), format!("Item {i}"), 1, f64::from(30 - i), 1, "A1"),
                )
            })
            .collect();
        let catalog = StoreCatalog::new("s", "S", products, AisleLayout::new(), Vec::new());
        let result = catalog.browse_products(None, None);
        assert_eq!(result.count, 30);
        assert_eq!(result.products.len(), BROWSE_LIMIT);
        assert_eq!(result.products[0].price, 1.0);
    }

    #[test]
    fn meal_suggestions_partial_and_full() {
        let catalog = builtin_catalog();
        let partial = catalog.meal_suggestions(&["pasta", "ground beef"]);
        assert!(partial.suggestions.is_empty());
        assert_eq!(
            partial.missing_for_meal.get("Spaghetti Bolognese"),
            Some(&vec!["pasta sauce".to_string()])
        );

        let full = catalog.meal_suggestions(&["pasta", "ground beef", "pasta sauce"]);
        assert_eq!(full.suggestions, vec!["Spaghetti Bolognese".to_string()]);
        assert!(!full.missing_for_meal.contains_key("Spaghetti Bolognese"));
    }

    #[test]
    fn meal_suggestions_follow_rule_order() {
        let catalog = StoreCatalog::new(
            "s",
            "S",
            Vec::new(),
            AisleLayout::new(),
            vec![
                MealRule::new(&["eggs", "bread"], "Toast"),
                MealRule::new(&["bread"], "Plain Bread"),
            ],
        );
        let result = catalog.meal_suggestions(&["Bread", "EGGS"]);
        assert_eq!(result.suggestions, vec!["Toast".to_string(), "Plain Bread".to_string()]);
        assert!(catalog.meal_suggestions(&["soap"]).is_empty());
    }

    #[test]
    fn item_stock_statuses() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.item_stock("milk").status, StockStatus::InStock);
        let eggs = catalog.item_stock("eggs");
        assert_eq!((eggs.stock, eggs.status), (8, StockStatus::LowStock));
        let missing = catalog.item_stock("unobtainium");
        assert_eq!(missing.item_name, None);
        assert_eq!((missing.stock, missing.status), (0, StockStatus::NotFound));
        assert_eq!(StockStatus::for_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_quantity(10), StockStatus::InStock);
    }

    #[test]
    fn store_layout_is_idempotent() {
        let catalog = builtin_catalog();
        let first = serde_json::to_string(&catalog.store_layout()).unwrap();
        let second = serde_json::to_string(&catalog.store_layout()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"3\":\"Dairy & Refrigerated\""));
    }
}
