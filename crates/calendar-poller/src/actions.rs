//! Extracts chore actions from event descriptions.
//!
//! A description is a YAML document stream. Every document must be a
//! mapping with exactly one key; empty documents are skipped. Anything
//! else makes the whole description inert.

use serde::Deserialize;
use serde_json::Value;
use shared_types::ChoreAction;

/// Parse a description into actions, in document order.
///
/// Malformed input yields no actions rather than an error.
pub fn parse_actions(description: &str) -> Vec<ChoreAction> {
    match try_parse_actions(description) {
        Ok(actions) => actions,
        Err(reason) => {
            tracing::debug!("Description holds no actions: {}", reason);
            Vec::new()
        }
    }
}

fn try_parse_actions(description: &str) -> Result<Vec<ChoreAction>, String> {
    let mut actions = Vec::new();

    for document in serde_yml::Deserializer::from_str(description) {
        let value = Value::deserialize(document).map_err(|e| e.to_string())?;

        match value {
            Value::Null => continue,
            Value::Object(map) => {
                if map.len() > 1 {
                    return Err(format!("document has {} keys", map.len()));
                }
                if let Some((key, value)) = map.into_iter().next() {
                    actions.push(ChoreAction::new(key, value));
                }
            }
            other => return Err(format!("document is not a mapping: {}", other)),
        }
    }

    Ok(actions)
}
