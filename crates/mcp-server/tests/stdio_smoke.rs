use anyhow::{Context, Result};
use rmcp::{model::CallToolRequestParam, service::ServiceExt, transport::TokioChildProcess};
use std::time::Duration;
use tokio::process::Command;

#[tokio::test]
async fn stdio_binary_answers_find_item() -> Result<()> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wallaby-mcp"));
    cmd.arg("--stdio");
    cmd.env("RUST_LOG", "warn");

    let transport = TokioChildProcess::new(cmd).context("spawn mcp server")?;
    let service = tokio::time::timeout(Duration::from_secs(10), ().serve(transport))
        .await
        .context("timeout starting MCP server")??;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        service.call_tool(CallToolRequestParam {
            name: "find_item".into(),
            arguments: serde_json::json!({ "item_name": "bananas" }).as_object().cloned(),
        }),
    )
    .await
    .context("timeout calling find_item")??;

    assert_ne!(result.is_error, Some(true), "find_item returned error");
    let text = result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.as_str())
        .context("find_item missing text output")?;
    assert!(text.contains("Fresh Produce"), "unexpected output: {text}");

    service.cancel().await?;
    Ok(())
}
