//! Structured extras attached to a chat reply.

use crate::model::Operation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use wallaby_catalog::{round_cents, Product};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aisles: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_item_costs: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ChatReply {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Products carried by an item-bearing result, if any.
fn products_of(operation: Operation, result: &Value) -> Option<Vec<Product>> {
    match operation {
        Operation::FindItem if result.get("found") == Some(&Value::Bool(true)) => {
            let product = serde_json::from_value(result.get("item")?.clone()).ok()?;
            Some(vec![product])
        }
        Operation::ProcessShoppingList => {
            let path: Vec<Product> =
                serde_json::from_value(result.get("optimized_path")?.clone()).ok()?;
            (!path.is_empty()).then_some(path)
        }
        _ => None,
    }
}

fn suggestions_of(operation: Operation, result: &Value) -> Option<Vec<String>> {
    let key = match operation {
        Operation::ProcessShoppingList => "smart_suggestions",
        Operation::GetMealSuggestions => "suggestions",
        _ => return None,
    };
    serde_json::from_value(result.get(key)?.clone()).ok()
}

/// Fill the reply extras from the turn's recorded results.
///
/// The last item-bearing result decides aisles and costs; the last
/// suggestion-bearing result decides suggestions.
pub fn summarize(reply: &mut ChatReply, results: &[(Operation, Value)]) {
    if let Some(products) = results
        .iter()
        .rev()
        .find_map(|(op, result)| products_of(*op, result))
    {
        let mut aisles: Vec<u32> = products.iter().map(|p| p.aisle).collect();
        aisles.sort_unstable();
        aisles.dedup();

        reply.aisles = Some(aisles);
        reply.total_cost = Some(round_cents(
            products.iter().fold(0.0, |total, p| total + p.price),
        ));
        reply.items_found = Some(products.len());
        reply.individual_item_costs = Some(
            products
                .iter()
                .map(|p| (p.name.clone(), p.price))
                .collect(),
        );
    }

    if let Some(suggestions) = results
        .iter()
        .rev()
        .find_map(|(op, result)| suggestions_of(*op, result))
        .filter(|s| !s.is_empty())
    {
        reply.suggestions = Some(suggestions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wallaby_catalog::builtin_catalog;
    use wallaby_protocol::{FindItemResponse, ShoppingListResponse};

    fn list_result(items: &[&str]) -> Value {
        let plan = builtin_catalog().process_shopping_list(items);
        serde_json::to_value(ShoppingListResponse::from(plan)).unwrap()
    }

    #[test]
    fn shopping_list_drives_aisles_and_costs() {
        let mut reply = ChatReply::text("ok");
        summarize(
            &mut reply,
            &[(Operation::ProcessShoppingList, list_result(&["bread", "milk", "eggs"]))],
        );
        assert_eq!(reply.aisles, Some(vec![3, 7]));
        assert_eq!(reply.total_cost, Some(10.0));
        assert_eq!(reply.items_found, Some(3));
        let costs = reply.individual_item_costs.unwrap();
        assert_eq!(costs["White Bread"], 2.5);
        assert_eq!(costs["Large Eggs (12 pack)"], 4.0);
        assert_eq!(reply.suggestions, Some(vec!["French Toast or Egg Sandwiches".to_string()]));
    }

    #[test]
    fn last_item_bearing_result_wins() {
        let find = serde_json::to_value(FindItemResponse::lookup(builtin_catalog(), "shampoo"))
            .unwrap();
        let mut reply = ChatReply::text("ok");
        summarize(
            &mut reply,
            &[
                (Operation::ProcessShoppingList, list_result(&["milk"])),
                (Operation::FindItem, find),
                (Operation::GetItemStock, json!({ "stock": 8 })),
            ],
        );
        assert_eq!(reply.aisles, Some(vec![12]));
        assert_eq!(reply.total_cost, Some(5.5));
        assert_eq!(reply.items_found, Some(1));
    }

    #[test]
    fn empty_shopping_list_keeps_earlier_find() {
        let find = serde_json::to_value(FindItemResponse::lookup(builtin_catalog(), "milk"))
            .unwrap();
        let mut reply = ChatReply::text("ok");
        summarize(
            &mut reply,
            &[
                (Operation::FindItem, find),
                (Operation::ProcessShoppingList, list_result(&["unobtainium"])),
            ],
        );
        assert_eq!(reply.aisles, Some(vec![3]));
        assert_eq!(reply.total_cost, Some(3.5));
        assert_eq!(reply.items_found, Some(1));
    }

    #[test]
    fn misses_and_empty_suggestions_leave_fields_absent() {
        let miss = serde_json::to_value(FindItemResponse::lookup(builtin_catalog(), "caviar"))
            .unwrap();
        let mut reply = ChatReply::text("not here");
        summarize(
            &mut reply,
            &[
                (Operation::FindItem, miss),
                (Operation::GetMealSuggestions, json!({ "suggestions": [] })),
            ],
        );
        assert_eq!(reply, ChatReply::text("not here"));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "message": "not here" })
        );
    }
}
