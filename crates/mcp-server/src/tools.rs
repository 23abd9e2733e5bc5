//! MCP tools and resources for the Wallaby store.
//!
//! Every tool answers with a single pretty-printed JSON text item. Domain
//! failures (unknown aisle) are tool errors; malformed arguments are rejected
//! by parameter extraction before a handler runs.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
    PaginatedRequestParam, RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
    ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use wallaby_catalog::{builtin_catalog, StoreCatalog};
use wallaby_protocol::{
    AisleInfoRequest, AisleInfoResponse, BrowseProductsRequest, BrowseProductsResponse,
    FindItemRequest, FindItemResponse, ItemStockRequest, ItemStockResponse, MealSuggestionsRequest,
    MealSuggestionsResponse, ReportOutOfStockRequest, ReportOutOfStockResponse,
    ShoppingListRequest, ShoppingListResponse, PRODUCT_CATALOG_URI, STORE_MAP_LAYOUT_URI,
};

/// Wallaby store tool service
#[derive(Clone)]
pub struct StoreService {
    /// Read-only catalog shared by every session
    catalog: Arc<StoreCatalog>,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

impl StoreService {
    pub fn new(catalog: Arc<StoreCatalog>) -> Self {
        Self {
            catalog,
            tool_router: Self::tool_router(),
        }
    }

    /// Service over the built-in Carrollton Supercenter catalog.
    pub fn builtin() -> Self {
        Self::new(Arc::new(builtin_catalog().clone()))
    }

    pub fn catalog(&self) -> &StoreCatalog {
        &self.catalog
    }

    fn resource(uri: &str, name: &str, description: &str) -> Resource {
        let mut raw = RawResource::new(uri, name.to_string());
        raw.description = Some(description.to_string());
        raw.mime_type = Some("application/json".to_string());
        raw.no_annotation()
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| McpError::internal_error(format!("Failed to encode result: {err}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl StoreService {
    #[tool(
        description = "Find a specific item in the store and return its location and details (price, stock)."
    )]
    pub async fn find_item(
        &self,
        Parameters(request): Parameters<FindItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        log::debug!("find_item: {:?}", request.item_name);
        json_result(&FindItemResponse::lookup(&self.catalog, &request.item_name))
    }

    #[tool(
        description = "Process a shopping list and return an aisle-ordered path through the store, the estimated total cost, and meal suggestions."
    )]
    pub async fn process_shopping_list(
        &self,
        Parameters(request): Parameters<ShoppingListRequest>,
    ) -> Result<CallToolResult, McpError> {
        log::debug!("process_shopping_list: {} items", request.items.len());
        let plan = self.catalog.process_shopping_list(&request.items);
        json_result(&ShoppingListResponse::from(plan))
    }

    #[tool(description = "Get information about what products are in a specific aisle.")]
    pub async fn get_aisle_info(
        &self,
        Parameters(request): Parameters<AisleInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.catalog.aisle_info(request.aisle_number) {
            Ok(info) => json_result(&AisleInfoResponse::from(info)),
            Err(err) => Ok(CallToolResult::error(vec![Content::text(err.to_string())])),
        }
    }

    #[tool(description = "Get the complete store layout and general information.")]
    pub async fn get_store_layout(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.catalog.store_layout())
    }

    #[tool(
        description = "Browse and filter all products by category (e.g., 'Fresh Produce') or a maximum price. Useful for budget or discovery queries."
    )]
    pub async fn browse_products(
        &self,
        Parameters(request): Parameters<BrowseProductsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .catalog
            .browse_products(request.category.as_deref(), request.max_price);
        json_result(&BrowseProductsResponse::from(result))
    }

    #[tool(
        description = "Get meal suggestions based on a list of items. Also reports which ingredients are still missing for a meal."
    )]
    pub async fn get_meal_suggestions(
        &self,
        Parameters(request): Parameters<MealSuggestionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let meals = self.catalog.meal_suggestions(&request.items);
        json_result(&MealSuggestionsResponse::new(request.items, meals))
    }

    #[tool(description = "Report an item as being out of stock.")]
    pub async fn report_out_of_stock(
        &self,
        Parameters(request): Parameters<ReportOutOfStockRequest>,
    ) -> Result<CallToolResult, McpError> {
        log::info!("out-of-stock report: {}", request.item_name);
        json_result(&ReportOutOfStockResponse::acknowledge(&request.item_name))
    }

    #[tool(description = "Get the current stock quantity for a specific item.")]
    pub async fn get_item_stock(
        &self,
        Parameters(request): Parameters<ItemStockRequest>,
    ) -> Result<CallToolResult, McpError> {
        let stock = self.catalog.item_stock(&request.item_name);
        json_result(&ItemStockResponse::new(&request.item_name, stock))
    }
}

#[tool_handler]
impl ServerHandler for StoreService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "Wallaby store assistant tools for {}. Use 'find_item' for single items, 'process_shopping_list' for lists, 'browse_products' for budget or category queries, and 'get_meal_suggestions' for meal ideas.",
                self.catalog.store_name()
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![
            Self::resource(
                PRODUCT_CATALOG_URI,
                "product_catalog",
                "The complete list of products available in the store.",
            ),
            Self::resource(
                STORE_MAP_LAYOUT_URI,
                "store_map_layout",
                "The complete aisle layout of the store.",
            ),
        ]))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = match uri.as_str() {
            PRODUCT_CATALOG_URI => serde_json::to_string(&self.catalog.product_map()),
            STORE_MAP_LAYOUT_URI => serde_json::to_string(self.catalog.aisle_layout()),
            _ => {
                return Err(McpError::resource_not_found(
                    "resource_not_found",
                    Some(json!({ "uri": &uri })),
                ))
            }
        }
        .map_err(|err| McpError::internal_error(format!("Failed to encode resource: {err}"), None))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}
