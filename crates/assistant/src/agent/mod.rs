//! The shopping agent: a bounded loop of model decisions and store operations.

mod args;
mod summary;

pub use summary::{summarize, ChatReply};

use crate::connector::Connector;
use crate::error::AgentError;
use crate::model::{Decision, Operation, OperationArgs, ReasoningModel, Step};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const GREETING_REPLY: &str =
    "Hello! I'm Wallaby, your shopping assistant. How can I help you today?";
pub const TECHNICAL_PROBLEM_REPLY: &str = "I'm sorry, I ran into a technical problem while trying to answer. Could you please try rephrasing your request?";
pub const UNFINISHED_REPLY: &str = "I'm sorry, I couldn't process your request.";
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

const NO_OP_OBSERVATION: &str = "No tool used.";

pub fn is_greeting(message: &str) -> bool {
    matches!(
        message.trim().to_lowercase().as_str(),
        "hi" | "hello" | "hey"
    )
}

pub struct ShoppingAgent {
    connector: Arc<Connector>,
    model: Arc<dyn ReasoningModel>,
    max_iterations: usize,
    /// Results of item- and meal-bearing operations in the current turn.
    last_results: Mutex<Vec<(Operation, Value)>>,
}

impl ShoppingAgent {
    pub fn new(
        connector: Arc<Connector>,
        model: Arc<dyn ReasoningModel>,
        max_iterations: usize,
    ) -> Self {
        Self {
            connector,
            model,
            max_iterations: max_iterations.max(1),
            last_results: Mutex::new(Vec::new()),
        }
    }

    pub fn connector(&self) -> &Arc<Connector> {
        &self.connector
    }

    /// Answer one chat message. Failures turn into an apologetic reply.
    pub async fn chat(&self, message: &str) -> ChatReply {
        self.last_results.lock().await.clear();

        if is_greeting(message) {
            return ChatReply::text(GREETING_REPLY);
        }

        let answer = match self.run(message).await {
            Ok(Some(answer)) => answer,
            Ok(None) => {
                log::warn!("no answer after {} iterations", self.max_iterations);
                UNFINISHED_REPLY.to_string()
            }
            Err(err) => {
                log::error!("chat turn failed: {err}");
                self.last_results.lock().await.clear();
                return ChatReply::text(TECHNICAL_PROBLEM_REPLY);
            }
        };

        let mut reply = ChatReply::text(answer);
        summarize(&mut reply, &self.last_results.lock().await);
        reply
    }

    async fn run(&self, message: &str) -> Result<Option<String>, AgentError> {
        let mut steps: Vec<Step> = Vec::new();

        for iteration in 1..=self.max_iterations {
            match self.model.decide(message, &steps).await? {
                Decision::Answer(answer) => return Ok(Some(answer)),
                Decision::Invoke { operation, args } => {
                    log::debug!("iteration {iteration}: {operation} {}", Value::Object(args.clone()));
                    let observation = self.observe(&operation, &args).await;
                    steps.push(Step {
                        operation,
                        args,
                        observation,
                    });
                }
            }
        }

        Ok(None)
    }

    /// Run an operation, rendering failures as `{"error": ...}`.
    async fn observe(&self, operation: &str, args: &OperationArgs) -> Value {
        match self.dispatch(operation, args).await {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{operation} failed: {err}");
                json!({ "error": err.to_string() })
            }
        }
    }

    async fn dispatch(&self, name: &str, args: &OperationArgs) -> Result<Value, AgentError> {
        let operation = Operation::from_name(name).ok_or_else(|| {
            AgentError::Parse(format!(
                "Unknown operation '{name}'. Use one of: {}",
                Operation::ALL.map(Operation::name).join(", ")
            ))
        })?;

        let connector = &self.connector;
        let value = match operation {
            Operation::FindItem => connector.find_item(&args::text(args, "item_name")?).await?,
            Operation::ProcessShoppingList => {
                connector
                    .process_shopping_list(&args::list(args, "items")?)
                    .await?
            }
            Operation::GetMealSuggestions => {
                connector
                    .get_meal_suggestions(&args::list(args, "items")?)
                    .await?
            }
            Operation::GetItemStock => {
                connector
                    .get_item_stock(&args::text(args, "item_name")?)
                    .await?
            }
            Operation::GetAisleInfo => connector.get_aisle_info(args::aisle_number(args)?).await?,
            Operation::BrowseProducts => {
                let (category, max_price) = args::browse_filters(args);
                connector.browse_products(category, max_price).await?
            }
            Operation::NoOp => json!({ "result": NO_OP_OBSERVATION }),
        };

        if matches!(
            operation,
            Operation::FindItem | Operation::ProcessShoppingList | Operation::GetMealSuggestions
        ) {
            self.last_results
                .lock()
                .await
                .push((operation, value.clone()));
        }
        Ok(value)
    }
}
