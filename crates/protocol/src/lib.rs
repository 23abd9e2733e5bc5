use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod responses;

pub use responses::{
    AisleInfoResponse, BrowseProductsResponse, FindItemResponse, ItemStockResponse,
    MealSuggestionsResponse, ReportOutOfStockResponse, ShoppingListResponse,
};
pub use wallaby_catalog::StoreLayout as StoreLayoutResponse;

pub const FIND_ITEM: &str = "find_item";
/// Misspelled name some older tool-service builds registered `find_item` under.
pub const FIND_ITEM_LEGACY: &str = "find_itemm";
pub const PROCESS_SHOPPING_LIST: &str = "process_shopping_list";
pub const GET_AISLE_INFO: &str = "get_aisle_info";
pub const GET_STORE_LAYOUT: &str = "get_store_layout";
pub const BROWSE_PRODUCTS: &str = "browse_products";
pub const GET_MEAL_SUGGESTIONS: &str = "get_meal_suggestions";
pub const REPORT_OUT_OF_STOCK: &str = "report_out_of_stock";
pub const GET_ITEM_STOCK: &str = "get_item_stock";

pub const TOOL_NAMES: [&str; 8] = [
    FIND_ITEM,
    PROCESS_SHOPPING_LIST,
    GET_AISLE_INFO,
    GET_STORE_LAYOUT,
    BROWSE_PRODUCTS,
    GET_MEAL_SUGGESTIONS,
    REPORT_OUT_OF_STOCK,
    GET_ITEM_STOCK,
];

pub const PRODUCT_CATALOG_URI: &str = "http://localhost/product_catalog";
pub const STORE_MAP_LAYOUT_URI: &str = "http://localhost/store_map_layout";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindItemRequest {
    #[schemars(description = "Item to look for, e.g. 'milk' or 'pasta sauce'")]
    pub item_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShoppingListRequest {
    #[schemars(description = "Item names on the shopping list")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AisleInfoRequest {
    #[schemars(description = "Aisle number (1-based)")]
    pub aisle_number: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BrowseProductsRequest {
    /// Department or product-name fragment
    #[schemars(description = "Category to browse, e.g. 'Fresh Produce' or 'Bakery'")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Inclusive price ceiling
    #[schemars(description = "Maximum unit price in dollars (inclusive)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MealSuggestionsRequest {
    #[schemars(description = "Items the shopper has or plans to buy")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportOutOfStockRequest {
    #[schemars(description = "Item the shopper found empty on the shelf")]
    pub item_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemStockRequest {
    #[schemars(description = "Item whose stock level to check")]
    pub item_name: String,
}

/// Serialize a request into the argument object of a tool call.
pub fn to_arguments<T: Serialize>(request: &T) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(request) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}
