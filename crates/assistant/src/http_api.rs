//! HTTP front door for the shopping agent.

use crate::agent::{ChatReply, ShoppingAgent};
use crate::connector::Connector;
use crate::error::ConnectorResult;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone, Default)]
pub struct AppState {
    agent: Option<Arc<ShoppingAgent>>,
}

impl AppState {
    pub fn ready(agent: Arc<ShoppingAgent>) -> Self {
        Self { agent: Some(agent) }
    }

    /// State before the agent exists; agent routes answer 503.
    pub fn starting() -> Self {
        Self::default()
    }

    fn agent(&self) -> Result<&Arc<ShoppingAgent>, ApiError> {
        self.agent.as_ref().ok_or(ApiError::Unavailable)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unavailable,
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Agent is not initialized yet.",
            ),
            ApiError::Internal(err) => {
                log::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                )
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/debug/tools", get(debug_tools))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "Wallaby API is online" }))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let agent = Arc::clone(state.agent()?);
    log::info!("chat request: {}", request.message);

    let reply = tokio::spawn(async move { agent.chat(&request.message).await })
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;

    log::debug!("chat reply: {}", reply.message);
    Ok(Json(reply))
}

fn inline(result: ConnectorResult<Value>) -> Value {
    result.unwrap_or_else(|err| json!({ "error": err.to_string() }))
}

async fn debug_tools(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let connector: &Connector = state.agent()?.connector();
    let mut results = Map::new();

    results.insert("find_item".into(), inline(connector.find_item("milk").await));
    results.insert(
        "get_store_layout".into(),
        inline(connector.get_store_layout().await),
    );
    results.insert(
        "get_meal_suggestions".into(),
        inline(
            connector
                .get_meal_suggestions(&["pasta".to_string(), "ground beef".to_string()])
                .await,
        ),
    );
    results.insert(
        "get_item_stock".into(),
        inline(connector.get_item_stock("eggs").await),
    );
    results.insert(
        "report_out_of_stock".into(),
        inline(connector.report_out_of_stock("almond milk").await),
    );

    let catalog_sample = connector.product_catalog().await.map(|catalog| match catalog {
        Value::Object(entries) => Value::Array(
            entries
                .into_iter()
                .take(1)
                .map(|(key, product)| json!([key, product]))
                .collect(),
        ),
        other => other,
    });
    results.insert("product_catalog_sample".into(), inline(catalog_sample));
    results.insert(
        "store_map_layout_sample".into(),
        inline(connector.store_map_layout().await),
    );

    Ok(Json(Value::Object(results)))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = state.agent()?.connector().health_check().await;
    serde_json::to_value(report)
        .map(Json)
        .map_err(|err| ApiError::Internal(err.into()))
}
