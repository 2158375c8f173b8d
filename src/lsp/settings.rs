//! Per-document editor settings.
//!
//! Settings are pulled from the client with `workspace/configuration`
//! (section `zenscript`). Clients without that capability, and failed
//! requests, get the defaults.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tower_lsp::Client;
use tower_lsp::lsp_types::{ConfigurationItem, Url};
use tracing::{debug, warn};

pub const SETTINGS_SECTION: &str = "zenscript";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZenScriptSettings {
    /// Pop the bracket handler list as soon as `<` is typed.
    #[serde(rename = "autoshowLTCompletion")]
    pub autoshow_lt_completion: bool,
    /// Offer item handler entries in the `<` list alongside handler names.
    #[serde(rename = "modIdItemCompletion")]
    pub mod_id_item_completion: bool,
}

/// Source of settings for a document.
#[async_trait::async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn settings_for(&self, uri: &Url) -> ZenScriptSettings;
}

/// Asks the connected client.
pub struct ClientSettingsProvider {
    client: Client,
    supported: Arc<AtomicBool>,
}

impl ClientSettingsProvider {
    /// `supported` is flipped during `initialize` once client capabilities are known.
    pub fn new(client: Client, supported: Arc<AtomicBool>) -> Self {
        Self { client, supported }
    }
}

#[async_trait::async_trait]
impl SettingsProvider for ClientSettingsProvider {
    async fn settings_for(&self, uri: &Url) -> ZenScriptSettings {
        if !self.supported.load(Ordering::Acquire) {
            return ZenScriptSettings::default();
        }

        let item = ConfigurationItem {
            scope_uri: Some(uri.clone()),
            section: Some(SETTINGS_SECTION.to_string()),
        };
        match self.client.configuration(vec![item]).await {
            Ok(mut values) if !values.is_empty() => {
                let value = values.swap_remove(0);
                if value.is_null() {
                    return ZenScriptSettings::default();
                }
                serde_json::from_value(value).unwrap_or_else(|e| {
                    warn!("Malformed {} settings for {}: {}", SETTINGS_SECTION, uri, e);
                    ZenScriptSettings::default()
                })
            }
            Ok(_) => ZenScriptSettings::default(),
            Err(e) => {
                debug!("workspace/configuration failed for {}: {}", uri, e);
                ZenScriptSettings::default()
            }
        }
    }
}
