//! Tool result payloads.
//!
//! Each type is what a tool serializes into its single JSON text content item,
//! and what clients decode it back into.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wallaby_catalog::{
    AisleInfo, BrowseResult, ItemStock, MealSuggestions, Product, ShoppingListPlan, StockStatus,
    StoreCatalog,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindItemResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,
    pub message: String,
}

impl FindItemResponse {
    pub fn lookup(catalog: &StoreCatalog, item_name: &str) -> Self {
        let Some(product) = catalog.find_item(item_name) else {
            return Self {
                found: false,
                item: None,
                location: None,
                stock_status: None,
                message: format!("Sorry, I couldn't find '{item_name}' in our store inventory."),
            };
        };

        let aisle_name = catalog
            .department(product.aisle)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Aisle {}", product.aisle));

        Self {
            found: true,
            location: Some(format!(
                "Aisle {} ({aisle_name}), Section {}",
                product.aisle, product.section
            )),
            stock_status: Some(StockStatus::for_quantity(product.stock)),
            message: format!(
                "Found '{}' in {aisle_name} (Aisle {}), Section {}. Price: ${:.2}",
                product.name, product.aisle, product.section, product.price
            ),
            item: Some(product.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListResponse {
    pub optimized_path: Vec<Product>,
    pub items_found: usize,
    pub items_not_found: Vec<String>,
    pub aisles_to_visit: Vec<u32>,
    pub total_estimated_cost: f64,
    pub smart_suggestions: Vec<String>,
    pub summary: String,
}

impl From<ShoppingListPlan> for ShoppingListResponse {
    fn from(plan: ShoppingListPlan) -> Self {
        let summary = format!(
            "Found {} items across {} aisles. Estimated total: ${:.2}",
            plan.found.len(),
            plan.unique_aisles.len(),
            plan.total_cost
        );
        Self {
            items_found: plan.found.len(),
            optimized_path: plan.found,
            items_not_found: plan.not_found,
            aisles_to_visit: plan.unique_aisles,
            total_estimated_cost: plan.total_cost,
            smart_suggestions: plan.meal_suggestions.suggestions,
            summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AisleInfoResponse {
    pub aisle_number: u32,
    pub aisle_name: String,
    pub products: Vec<Product>,
    pub total_products: usize,
}

impl From<AisleInfo> for AisleInfoResponse {
    fn from(info: AisleInfo) -> Self {
        Self {
            aisle_number: info.aisle_number,
            aisle_name: info.department,
            products: info.products,
            total_products: info.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseProductsResponse {
    pub count: usize,
    pub products: Vec<Product>,
    pub message: String,
}

impl From<BrowseResult> for BrowseProductsResponse {
    fn from(result: BrowseResult) -> Self {
        Self {
            count: result.count,
            products: result.products,
            message: result.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSuggestionsResponse {
    pub query_items: Vec<String>,
    pub suggestions: Vec<String>,
    pub missing_for_meal: BTreeMap<String, Vec<String>>,
    pub message: String,
}

impl MealSuggestionsResponse {
    pub fn new(query_items: Vec<String>, meals: MealSuggestions) -> Self {
        let message = if meals.is_empty() {
            "No specific meal suggestions found for the provided items."
        } else {
            "Here are some ideas based on your items."
        };
        Self {
            query_items,
            suggestions: meals.suggestions,
            missing_for_meal: meals.missing_for_meal,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutOfStockResponse {
    pub status: String,
    pub message: String,
}

impl ReportOutOfStockResponse {
    /// Acknowledge a report. Inventory is not modified.
    pub fn acknowledge(item_name: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("Thank you for reporting that '{item_name}' is out of stock."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStockResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub stock: u32,
    pub stock_status: StockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ItemStockResponse {
    pub fn new(query: &str, stock: ItemStock) -> Self {
        let message = stock
            .item_name
            .is_none()
            .then(|| format!("Sorry, I couldn't find '{query}'."));
        Self {
            item_name: stock.item_name,
            stock: stock.stock,
            stock_status: stock.status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wallaby_catalog::builtin_catalog;

    #[test]
    fn find_item_response_formats_location_and_price() {
        let response = FindItemResponse::lookup(builtin_catalog(), "milk");
        assert!(response.found);
        assert_eq!(
            response.location.as_deref(),
            Some("Aisle 3 (Dairy & Refrigerated), Section B2")
        );
        assert_eq!(
            response.message,
            "Found 'Milk (1 Gallon)' in Dairy & Refrigerated (Aisle 3), Section B2. Price: $3.50"
        );
        assert_eq!(response.stock_status, Some(StockStatus::InStock));
    }

    #[test]
    fn find_item_miss_serializes_without_item_fields() {
        let response = FindItemResponse::lookup(builtin_catalog(), "caviar");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "found": false,
                "message": "Sorry, I couldn't find 'caviar' in our store inventory."
            })
        );
    }

    #[test]
    fn shopping_list_summary() {
        let plan = builtin_catalog().process_shopping_list(&["milk", "bread"]);
        let response = ShoppingListResponse::from(plan);
        assert_eq!(response.items_found, 2);
        assert_eq!(response.aisles_to_visit, vec![3, 7]);
        assert_eq!(
            response.summary,
            "Found 2 items across 2 aisles. Estimated total: $6.00"
        );
    }

    #[test]
    fn empty_shopping_list_summary_shows_zero_total() {
        let plan = builtin_catalog().process_shopping_list(&["unobtainium"]);
        let response = ShoppingListResponse::from(plan);
        assert_eq!(
            response.summary,
            "Found 0 items across 0 aisles. Estimated total: $0.00"
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["total_estimated_cost"].to_string(), "0.0");
    }

    #[test]
    fn stock_status_uses_display_strings_on_the_wire() {
        let response = ItemStockResponse::new("eggs", builtin_catalog().item_stock("eggs"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["stock_status"], "Low stock");
        assert_eq!(json["stock"], 8);
        assert!(json.get("message").is_none());

        let missing = ItemStockResponse::new("caviar", builtin_catalog().item_stock("caviar"));
        assert_eq!(missing.message.as_deref(), Some("Sorry, I couldn't find 'caviar'."));
        assert_eq!(missing.stock_status, StockStatus::NotFound);
    }

    #[test]
    fn meal_message_depends_on_matches() {
        let catalog = builtin_catalog();
        let none = MealSuggestionsResponse::new(vec!["soap".into()], catalog.meal_suggestions(&["soap"]));
        assert_eq!(none.message, "No specific meal suggestions found for the provided items.");
        let some = MealSuggestionsResponse::new(
            vec!["pasta".into()],
            catalog.meal_suggestions(&["pasta"]),
        );
        assert_eq!(some.message, "Here are some ideas based on your items.");
    }
}
