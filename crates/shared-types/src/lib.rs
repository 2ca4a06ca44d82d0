use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trailing character that marks an action key as an update.
pub const PLURAL_SUFFIX: char = 's';

/// Calendar event as seen by the poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub description: String,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// HTTP verb an action is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreMethod {
    Create,
    Update,
}

impl ChoreMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoreMethod::Create => "POST",
            ChoreMethod::Update => "PATCH",
        }
    }
}

/// One single-key instruction pulled out of an event description.
///
/// The key picks the chore resource and verb; the value is forwarded
/// untouched, still keyed under the original key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoreAction {
    pub key: String,
    pub value: Value,
}

impl ChoreAction {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Plural keys update, everything else creates.
    ///
    /// This is a literal suffix check, so `status` is an update of `statu`.
    pub fn method(&self) -> ChoreMethod {
        if self.key.ends_with(PLURAL_SUFFIX) {
            ChoreMethod::Update
        } else {
            ChoreMethod::Create
        }
    }

    /// Resource path segment: the key with any plural suffix stripped.
    pub fn resource(&self) -> &str {
        self.key
            .strip_suffix(PLURAL_SUFFIX)
            .unwrap_or(self.key.as_str())
    }

    /// Request body `{key: value}`
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.key.clone(), self.value.clone());
        Value::Object(body)
    }
}
