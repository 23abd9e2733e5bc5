use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wallaby_assistant::{
    ConnectionState, Connector, ConnectorError, ConnectorSettings, McpEndpoint, McpOpener,
};
use wallaby_mcp::{serve_tcp, StoreService};

async fn start_store() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(serve_tcp(listener, StoreService::builtin()));
    addr
}

fn tcp_connector(addr: String) -> Arc<Connector> {
    Arc::new(Connector::new(
        Arc::new(McpOpener::new(McpEndpoint::Tcp(addr))),
        ConnectorSettings::default(),
    ))
}

#[tokio::test]
async fn typed_operations_over_tcp() {
    let connector = tcp_connector(start_store().await);
    connector
        .connect_with_retries(3, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(connector.state(), ConnectionState::Connected);

    let milk = connector.find_item("milk").await.unwrap();
    assert_eq!(milk["location"], "Aisle 3 (Dairy & Refrigerated), Section B2");

    let plan = connector
        .process_shopping_list(&["milk".to_string(), "bread".to_string()])
        .await
        .unwrap();
    assert_eq!(plan["aisles_to_visit"], json!([3, 7]));
    assert_eq!(plan["total_estimated_cost"], json!(6.0));

    let dairy = connector.get_aisle_info(3).await.unwrap();
    assert_eq!(dairy["aisle_name"], "Dairy & Refrigerated");
    for product in dairy["products"].as_array().unwrap() {
        assert_eq!(product["aisle"], 3);
    }

    let missing = connector.get_aisle_info(42).await.unwrap_err();
    assert_eq!(missing, ConnectorError::Tool("Aisle 42 does not exist.".into()));

    let cheap = connector.browse_products(None, Some(2.0)).await.unwrap();
    assert_eq!(cheap["count"], 3);

    let meals = connector
        .get_meal_suggestions(&[
            "pasta".to_string(),
            "ground beef".to_string(),
            "pasta sauce".to_string(),
        ])
        .await
        .unwrap();
    assert_eq!(meals["suggestions"], json!(["Spaghetti Bolognese"]));

    let stock = connector.get_item_stock("toilet paper").await.unwrap();
    assert_eq!(stock["stock"], 20);
    let report = connector.report_out_of_stock("toilet paper").await.unwrap();
    assert_eq!(report["status"], "success");

    let first = connector.get_store_layout().await.unwrap();
    let second = connector.get_store_layout().await.unwrap();
    assert_eq!(first, second);

    let catalog = connector.product_catalog().await.unwrap();
    assert_eq!(catalog["eggs"]["stock"], 8);
    let layout = connector.store_map_layout().await.unwrap();
    assert_eq!(layout.as_object().map(|m| m.len()), Some(16));

    assert!(connector.health_check().await.healthy);
    connector.disconnect().await;
    assert_eq!(connector.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn reconnects_after_disconnect() {
    let connector = tcp_connector(start_store().await);
    connector.connect().await.unwrap();
    connector.disconnect().await;

    let stock = connector.get_item_stock("eggs").await.unwrap();
    assert_eq!(stock["stock_status"], "Low stock");
    assert_eq!(connector.connect_attempts(), 2);
}

#[tokio::test]
async fn startup_gives_up_when_nothing_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let connector = tcp_connector(addr);
    let err = connector
        .connect_with_retries(2, Duration::from_millis(10))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::Connection(_)), "{err:?}");
    assert_eq!(connector.connect_attempts(), 2);
    assert_eq!(connector.state(), ConnectionState::Disconnected);
}
