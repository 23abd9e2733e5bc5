//! Reasoning models that choose the next store operation.

use crate::config::ModelConfig;
use crate::error::AgentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub type OperationArgs = Map<String, Value>;

/// Operations the agent may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindItem,
    ProcessShoppingList,
    GetMealSuggestions,
    GetItemStock,
    GetAisleInfo,
    BrowseProducts,
    NoOp,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::FindItem,
        Operation::ProcessShoppingList,
        Operation::GetMealSuggestions,
        Operation::GetItemStock,
        Operation::GetAisleInfo,
        Operation::BrowseProducts,
        Operation::NoOp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::FindItem => "find_item",
            Operation::ProcessShoppingList => "process_shopping_list",
            Operation::GetMealSuggestions => "get_meal_suggestions",
            Operation::GetItemStock => "get_item_stock",
            Operation::GetAisleInfo => "get_aisle_info",
            Operation::BrowseProducts => "browse_products",
            Operation::NoOp => "no_op",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::FindItem => {
                "Find a single item in the store. Args: {\"item_name\": \"milk\"}."
            }
            Operation::ProcessShoppingList => {
                "Plan a route for a shopping list, with aisles and estimated cost. Args: {\"items\": [\"milk\", \"bread\"]}."
            }
            Operation::GetMealSuggestions => {
                "Suggest meals for some items and what is still missing. Args: {\"items\": [\"pasta\", \"ground beef\"]}."
            }
            Operation::GetItemStock => {
                "Check how many units of an item are in stock. Args: {\"item_name\": \"eggs\"}."
            }
            Operation::GetAisleInfo => {
                "List the products in one aisle. Args: {\"aisle_number\": 3}."
            }
            Operation::BrowseProducts => {
                "Browse products by category (e.g. 'Fresh Produce') or maximum price; use for budget or discovery questions. Args: {\"category\": \"Bakery\", \"max_price\": 5.0}, both optional."
            }
            Operation::NoOp => {
                "Use when no store lookup is needed (greetings, store policies, general shopping advice). Args: {}."
            }
        }
    }
}

/// What the model wants to happen next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Invoke {
        operation: String,
        args: OperationArgs,
    },
    Answer(String),
}

/// One completed operation of the current turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub operation: String,
    pub args: OperationArgs,
    pub observation: Value,
}

#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Decide the next move for `request` given the steps taken so far.
    async fn decide(&self, request: &str, steps: &[Step]) -> Result<Decision, AgentError>;
}

/// Interpret a model reply as a directive.
///
/// `{"action": ..., "args": {...}}` invokes an operation, `{"final_answer": ...}`
/// ends the turn; anything else is taken as the answer text itself.
pub fn parse_directive(reply: &str) -> Decision {
    let trimmed = reply.trim();
    let Ok(Value::Object(directive)) = serde_json::from_str::<Value>(trimmed) else {
        return Decision::Answer(trimmed.to_string());
    };

    if let Some(answer) = directive.get("final_answer") {
        let text = match answer {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Decision::Answer(text);
    }

    match directive.get("action").and_then(Value::as_str) {
        Some(action) => {
            let args = match directive.get("args") {
                Some(Value::Object(args)) => args.clone(),
                Some(Value::String(input)) => {
                    let mut args = Map::new();
                    args.insert("input".to_string(), Value::String(input.clone()));
                    args
                }
                _ => Map::new(),
            };
            Decision::Invoke {
                operation: action.to_string(),
                args,
            }
        }
        None => Decision::Answer(trimmed.to_string()),
    }
}

fn system_prompt() -> String {
    let operations = Operation::ALL
        .iter()
        .map(|op| format!("- {}: {}", op.name(), op.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are Wallaby, a helpful shopping assistant for a grocery supercenter. Help the shopper efficiently and accurately.

Operations you can use:
{operations}

Decision guide:
- For "where is X?" questions, use find_item.
- For shopping lists, always use process_shopping_list.
- For meal ideas or cooking advice, use get_meal_suggestions first.
- For budget or category browsing ("what's under $5?", "what's in the bakery?"), use browse_products.
- For general questions and advice, answer directly.
- Never ask the shopper for information an operation can look up.
- If an observation shows nothing useful, stop using operations and answer.

Reply with exactly one JSON object and nothing else:
{{"action": "<operation>", "args": {{...}}}} to run an operation, or
{{"final_answer": "<your conversational answer>"}} once you can answer."#
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

fn conversation(request: &str, steps: &[Step]) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::new("system", system_prompt()),
        ChatMessage::new("user", request),
    ];
    for step in steps {
        let directive = json!({ "action": step.operation, "args": step.args });
        messages.push(ChatMessage::new("assistant", directive.to_string()));
        messages.push(ChatMessage::new(
            "user",
            format!("Observation: {}", step.observation),
        ));
    }
    messages
}

/// Ollama `/api/chat` client in JSON mode.
pub struct OllamaModel {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| AgentError::Model(format!("build HTTP client: {err}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ReasoningModel for OllamaModel {
    async fn decide(&self, request: &str, steps: &[Step]) -> Result<Decision, AgentError> {
        let body = json!({
            "model": self.model,
            "messages": conversation(request, steps),
            "stream": false,
            "format": "json",
            "options": { "temperature": self.temperature },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| AgentError::Model(format!("request to {}: {err}", self.endpoint)))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::Model(format!("model server returned {status}: {text}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Model(format!("unreadable model response: {err}")))?;
        log::debug!("model reply: {}", reply.message.content);
        Ok(parse_directive(&reply.message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name(" find_item "), Some(Operation::FindItem));
        assert_eq!(Operation::from_name("get_store_layout"), None);
    }

    #[test]
    fn directive_with_object_args() {
        let decision = parse_directive(r#"{"action": "find_item", "args": {"item_name": "milk"}}"#);
        let mut args = Map::new();
        args.insert("item_name".into(), json!("milk"));
        assert_eq!(
            decision,
            Decision::Invoke {
                operation: "find_item".into(),
                args
            }
        );
    }

    #[test]
    fn directive_with_string_args_becomes_input() {
        let decision =
            parse_directive(r#"{"action": "browse_products", "args": "category: Bakery"}"#);
        match decision {
            Decision::Invoke { operation, args } => {
                assert_eq!(operation, "browse_products");
                assert_eq!(args["input"], "category: Bakery");
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn final_answer_and_free_text() {
        assert_eq!(
            parse_directive(r#"{"final_answer": "Milk is in aisle 3."}"#),
            Decision::Answer("Milk is in aisle 3.".into())
        );
        assert_eq!(
            parse_directive("  Milk is in aisle 3.  "),
            Decision::Answer("Milk is in aisle 3.".into())
        );
        assert_eq!(
            parse_directive(r#"{"thought": "hmm"}"#),
            Decision::Answer(r#"{"thought": "hmm"}"#.into())
        );
    }

    #[test]
    fn conversation_replays_steps() {
        let steps = vec![Step {
            operation: "find_item".into(),
            args: Map::new(),
            observation: json!({ "found": false }),
        }];
        let messages = conversation("where is caviar?", &steps);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("process_shopping_list"));
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].content, r#"Observation: {"found":false}"#);
    }

    #[test]
    fn endpoint_joins_base_url() {
        let model = OllamaModel::new(&ModelConfig {
            base_url: "http://localhost:11434/".into(),
            ..ModelConfig::default()
        })
        .unwrap();
        assert_eq!(model.endpoint, "http://localhost:11434/api/chat");
    }
}
