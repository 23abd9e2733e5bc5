//! Coercion of loosely-shaped model arguments into tool inputs.

use crate::error::AgentError;
use crate::model::OperationArgs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Catch-all key used when the model passes a bare string.
const INPUT: &str = "input";

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// The value of `key`, or of `input`, or of the only argument given.
fn pick<'a>(args: &'a OperationArgs, key: &str) -> Option<&'a Value> {
    args.get(key)
        .or_else(|| args.get(INPUT))
        .or_else(|| match args.len() {
            1 => args.values().next(),
            _ => None,
        })
}

pub fn text(args: &OperationArgs, key: &str) -> Result<String, AgentError> {
    pick(args, key)
        .and_then(scalar_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AgentError::Parse(format!("missing '{key}'")))
}

/// A list given as an array or as a comma-separated string.
pub fn list(args: &OperationArgs, key: &str) -> Result<Vec<String>, AgentError> {
    let items: Vec<String> = match pick(args, key) {
        Some(Value::Array(values)) => values.iter().filter_map(scalar_text).collect(),
        Some(Value::String(text)) => text.split(',').map(|s| s.trim().to_string()).collect(),
        _ => return Err(AgentError::Parse(format!("missing '{key}'"))),
    };
    let items: Vec<String> = items.into_iter().filter(|item| !item.is_empty()).collect();
    if items.is_empty() {
        return Err(AgentError::Parse(format!("'{key}' has no items")));
    }
    Ok(items)
}

/// An aisle number given as a number or inside a string such as "aisle 3".
pub fn aisle_number(args: &OperationArgs) -> Result<u32, AgentError> {
    let value = pick(args, "aisle_number")
        .ok_or_else(|| AgentError::Parse("missing 'aisle_number'".to_string()))?;
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| AgentError::Parse(format!("invalid aisle number {number}"))),
        Value::String(text) => DIGITS
            .find(text)
            .and_then(|digits| digits.as_str().parse().ok())
            .ok_or_else(|| AgentError::Parse(format!("no aisle number in '{text}'"))),
        other => Err(AgentError::Parse(format!("invalid aisle number {other}"))),
    }
}

fn price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    }
}

/// Browse filters from `category`/`max_price`, or from an input string like
/// `category: Bakery, max_price: 5.0`.
pub fn browse_filters(args: &OperationArgs) -> (Option<String>, Option<f64>) {
    let mut category = args
        .get("category")
        .and_then(scalar_text)
        .filter(|c| !c.is_empty());
    let mut max_price = args.get("max_price").and_then(price);

    if category.is_none() && max_price.is_none() {
        if let Some(Value::String(input)) = args.get(INPUT) {
            for part in input.split(',') {
                let Some((key, value)) = part.split_once(':') else {
                    continue;
                };
                let value = value.trim().trim_matches(|c: char| c == '\'' || c == '"');
                match key.trim().to_lowercase().as_str() {
                    "category" if !value.is_empty() => category = Some(value.to_string()),
                    "max_price" => max_price = price(&Value::String(value.to_string())),
                    _ => {}
                }
            }
        }
    }

    (category, max_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: Value) -> OperationArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn text_accepts_named_input_or_sole_argument() {
        assert_eq!(text(&args(json!({ "item_name": " milk " })), "item_name").unwrap(), "milk");
        assert_eq!(text(&args(json!({ "input": "eggs" })), "item_name").unwrap(), "eggs");
        assert_eq!(text(&args(json!({ "item": "bread" })), "item_name").unwrap(), "bread");
        assert!(matches!(
            text(&args(json!({})), "item_name"),
            Err(AgentError::Parse(_))
        ));
    }

    #[test]
    fn lists_from_arrays_and_comma_strings() {
        assert_eq!(
            list(&args(json!({ "items": ["milk", "bread"] })), "items").unwrap(),
            vec!["milk", "bread"]
        );
        assert_eq!(
            list(&args(json!({ "items": "milk, bread ,, eggs" })), "items").unwrap(),
            vec!["milk", "bread", "eggs"]
        );
        assert!(list(&args(json!({ "items": " , " })), "items").is_err());
    }

    #[test]
    fn aisle_numbers_from_numbers_and_text() {
        assert_eq!(aisle_number(&args(json!({ "aisle_number": 3 }))).unwrap(), 3);
        assert_eq!(aisle_number(&args(json!({ "aisle_number": "Aisle 12" }))).unwrap(), 12);
        assert_eq!(aisle_number(&args(json!({ "input": "7" }))).unwrap(), 7);
        assert!(matches!(
            aisle_number(&args(json!({ "aisle_number": "dairy" }))),
            Err(AgentError::Parse(_))
        ));
        assert!(aisle_number(&args(json!({ "aisle_number": -1 }))).is_err());
    }

    #[test]
    fn browse_filters_from_fields() {
        assert_eq!(
            browse_filters(&args(json!({ "category": "Bakery", "max_price": "5" }))),
            (Some("Bakery".to_string()), Some(5.0))
        );
        assert_eq!(browse_filters(&args(json!({}))), (None, None));
    }

    #[test]
    fn browse_filters_from_input_string() {
        assert_eq!(
            browse_filters(&args(json!({ "input": "category: 'Fresh Produce', max_price: $2.50" }))),
            (Some("Fresh Produce".to_string()), Some(2.5))
        );
        assert_eq!(
            browse_filters(&args(json!({ "input": "max_price: 4" }))),
            (None, Some(4.0))
        );
    }
}
