//! Typed calls for each store tool, with per-tool timeouts.

use super::{ConnectionState, Connector};
use crate::error::{ConnectorError, ConnectorResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wallaby_protocol::{
    to_arguments, AisleInfoRequest, BrowseProductsRequest, FindItemRequest, ItemStockRequest,
    MealSuggestionsRequest, ReportOutOfStockRequest, ShoppingListRequest, BROWSE_PRODUCTS,
    FIND_ITEM, FIND_ITEM_LEGACY, GET_AISLE_INFO, GET_ITEM_STOCK, GET_MEAL_SUGGESTIONS,
    GET_STORE_LAYOUT, PROCESS_SHOPPING_LIST, PRODUCT_CATALOG_URI, REPORT_OUT_OF_STOCK,
    STORE_MAP_LAYOUT_URI,
};

const FIND_ITEM_TIMEOUT: Duration = Duration::from_secs(10);
const SHOPPING_LIST_TIMEOUT: Duration = Duration::from_secs(20);
const AISLE_INFO_TIMEOUT: Duration = Duration::from_secs(5);
const STORE_LAYOUT_TIMEOUT: Duration = Duration::from_secs(5);
const BROWSE_TIMEOUT: Duration = Duration::from_secs(10);
const MEAL_SUGGESTIONS_TIMEOUT: Duration = Duration::from_secs(15);
const REPORT_TIMEOUT: Duration = Duration::from_secs(5);
const ITEM_STOCK_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Unix seconds of the successful probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check: Option<u64>,
}

impl HealthReport {
    fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            healthy: false,
            reason: Some(reason.into()),
            last_check: None,
        }
    }
}

impl Connector {
    async fn call_tool_with<T: Serialize>(
        &self,
        name: &str,
        request: &T,
        timeout: Duration,
    ) -> ConnectorResult<Value> {
        self.call_tool(name, to_arguments(request), Some(timeout), true).await
    }

    pub async fn find_item(&self, item_name: &str) -> ConnectorResult<Value> {
        let request = FindItemRequest {
            item_name: item_name.to_string(),
        };
        match self.call_tool_with(FIND_ITEM, &request, FIND_ITEM_TIMEOUT).await {
            Err(ConnectorError::Tool(reason)) if reason.to_lowercase().contains("not found") => {
                log::warn!("{FIND_ITEM} unavailable ({reason}); trying {FIND_ITEM_LEGACY}");
                self.call_tool_with(FIND_ITEM_LEGACY, &request, FIND_ITEM_TIMEOUT)
                    .await
            }
            other => other,
        }
    }

    pub async fn process_shopping_list(&self, items: &[String]) -> ConnectorResult<Value> {
        let request = ShoppingListRequest {
            items: items.to_vec(),
        };
        self.call_tool_with(PROCESS_SHOPPING_LIST, &request, SHOPPING_LIST_TIMEOUT)
            .await
    }

    pub async fn get_aisle_info(&self, aisle_number: u32) -> ConnectorResult<Value> {
        let request = AisleInfoRequest { aisle_number };
        self.call_tool_with(GET_AISLE_INFO, &request, AISLE_INFO_TIMEOUT)
            .await
    }

    pub async fn get_store_layout(&self) -> ConnectorResult<Value> {
        self.call_tool(GET_STORE_LAYOUT, Map::new(), Some(STORE_LAYOUT_TIMEOUT), true)
            .await
    }

    pub async fn browse_products(
        &self,
        category: Option<String>,
        max_price: Option<f64>,
    ) -> ConnectorResult<Value> {
        let request = BrowseProductsRequest {
            category,
            max_price,
        };
        self.call_tool_with(BROWSE_PRODUCTS, &request, BROWSE_TIMEOUT)
            .await
    }

    pub async fn get_meal_suggestions(&self, items: &[String]) -> ConnectorResult<Value> {
        let request = MealSuggestionsRequest {
            items: items.to_vec(),
        };
        self.call_tool_with(GET_MEAL_SUGGESTIONS, &request, MEAL_SUGGESTIONS_TIMEOUT)
            .await
    }

    pub async fn report_out_of_stock(&self, item_name: &str) -> ConnectorResult<Value> {
        let request = ReportOutOfStockRequest {
            item_name: item_name.to_string(),
        };
        self.call_tool_with(REPORT_OUT_OF_STOCK, &request, REPORT_TIMEOUT)
            .await
    }

    pub async fn get_item_stock(&self, item_name: &str) -> ConnectorResult<Value> {
        let request = ItemStockRequest {
            item_name: item_name.to_string(),
        };
        self.call_tool_with(GET_ITEM_STOCK, &request, ITEM_STOCK_TIMEOUT)
            .await
    }

    pub async fn product_catalog(&self) -> ConnectorResult<Value> {
        self.read_resource(PRODUCT_CATALOG_URI).await
    }

    pub async fn store_map_layout(&self) -> ConnectorResult<Value> {
        self.read_resource(STORE_MAP_LAYOUT_URI).await
    }

    pub async fn health_check(&self) -> HealthReport {
        if self.state() != ConnectionState::Connected {
            return HealthReport::unhealthy("Not connected");
        }
        match self
            .call_tool(GET_STORE_LAYOUT, Map::new(), Some(HEALTH_TIMEOUT), false)
            .await
        {
            Ok(_) => HealthReport {
                healthy: true,
                reason: None,
                last_check: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .ok()
                    .map(|d| d.as_secs()),
            },
            Err(err) => HealthReport::unhealthy(err.to_string()),
        }
    }
}
