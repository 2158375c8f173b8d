//! Payload carried by every completion item between `completion` and
//! `completionItem/resolve`.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::CompletionItem;

pub const TRIGGER_PREPROCESSOR: &str = "#";
pub const TRIGGER_DOT: &str = ".";
pub const TRIGGER_COLON: &str = ":";
pub const TRIGGER_LT: &str = "<";
/// Items offered on a manual request, without a trigger character.
pub const TRIGGER_NONE: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    pub trigger_character: String,
    /// Handler path the item was produced for (bracket handler items only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<Vec<String>>,
}

impl CompletionData {
    pub fn new(trigger_character: &str) -> Self {
        Self {
            trigger_character: trigger_character.to_string(),
            predecessor: None,
        }
    }

    pub fn with_predecessor(trigger_character: &str, predecessor: Vec<String>) -> Self {
        Self {
            trigger_character: trigger_character.to_string(),
            predecessor: Some(predecessor),
        }
    }

    /// Read the payload back from an item; `None` for foreign or missing data.
    pub fn from_item(item: &CompletionItem) -> Option<Self> {
        item.data
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn attach(self, mut item: CompletionItem) -> CompletionItem {
        item.data = serde_json::to_value(self).ok();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_client_field_names() {
        let item = CompletionData::with_predecessor(":", vec!["item".to_string()])
            .attach(CompletionItem::new_simple("minecraft".to_string(), String::new()));
        assert_eq!(
            item.data,
            Some(json!({ "triggerCharacter": ":", "predecessor": ["item"] }))
        );
        assert_eq!(
            CompletionData::from_item(&item).and_then(|d| d.predecessor),
            Some(vec!["item".to_string()])
        );
    }

    #[test]
    fn test_predecessor_is_optional() {
        let item = CompletionData::new("#").attach(CompletionItem::default());
        assert_eq!(item.data, Some(json!({ "triggerCharacter": "#" })));
    }
}
