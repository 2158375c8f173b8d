//! Turns a resolved [`CompletionCategory`] into completion items, and fills
//! in details for a chosen item on `completionItem/resolve`.

use std::sync::Arc;

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemTag, Documentation,
};
use tracing::debug;

use crate::lsp::document::DocumentSnapshot;
use crate::lsp::settings::ZenScriptSettings;

use super::bracket_handler::{BracketHandlerRegistry, DEFAULT_HANDLER};
use super::catalogs::{
    GLOBALS, GlobalKind, ImportNode, KEYWORDS, PREPROCESSORS, find_preprocessor,
    import_children, is_package_root,
};
use super::context::{CompletionCategory, CompletionContextResolver, ResolvedContext};
use super::item::{
    CompletionData, TRIGGER_COLON, TRIGGER_DOT, TRIGGER_LT, TRIGGER_NONE, TRIGGER_PREPROCESSOR,
};

#[derive(Debug, Clone)]
pub struct CompletionProvider {
    registry: Arc<BracketHandlerRegistry>,
}

impl CompletionProvider {
    pub fn new(registry: Arc<BracketHandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BracketHandlerRegistry {
        &self.registry
    }

    /// Resolve intent at `offset` and produce the matching items.
    pub fn complete(
        &self,
        snapshot: &DocumentSnapshot,
        offset: usize,
        trigger: Option<&str>,
        settings: &ZenScriptSettings,
    ) -> (ResolvedContext, Vec<CompletionItem>) {
        let resolved = CompletionContextResolver::new(&self.registry).resolve(snapshot, offset, trigger);
        let items = self.provide(&resolved.category, settings);
        debug!("{} completion items for {:?}", items.len(), resolved.category);
        (resolved, items)
    }

    pub fn provide(
        &self,
        category: &CompletionCategory,
        settings: &ZenScriptSettings,
    ) -> Vec<CompletionItem> {
        match category {
            CompletionCategory::Preprocessor => preprocessor_items(),
            CompletionCategory::Import { chain } => package_items(chain),
            CompletionCategory::MemberAccess { chain } => {
                if chain.first().is_some_and(|root| is_package_root(root)) {
                    package_items(chain)
                } else {
                    Vec::new()
                }
            }
            CompletionCategory::BracketHandlerStart { manual } => {
                if !*manual && !settings.autoshow_lt_completion {
                    return Vec::new();
                }
                let mut items = self.registry.handler_items();
                if settings.mod_id_item_completion {
                    items.extend(self.registry.next(&[DEFAULT_HANDLER.to_string()]));
                }
                items
            }
            CompletionCategory::BracketHandlerPath { segments } => self.registry.next(segments),
            CompletionCategory::Generic => global_items(),
            CompletionCategory::Suppressed => Vec::new(),
        }
    }

    /// Dispatches purely on the item's recorded trigger; items without a
    /// payload come back unchanged.
    pub fn resolve(&self, item: CompletionItem) -> CompletionItem {
        let Some(data) = CompletionData::from_item(&item) else {
            return item;
        };
        match data.trigger_character.as_str() {
            TRIGGER_COLON => self.registry.detail(item),
            TRIGGER_LT => self.registry.describe(item),
            TRIGGER_PREPROCESSOR => describe_preprocessor(item),
            other => {
                debug!("No resolve step for trigger {:?}", other);
                item
            }
        }
    }
}

fn preprocessor_items() -> Vec<CompletionItem> {
    PREPROCESSORS
        .iter()
        .map(|p| {
            let item = CompletionItem {
                label: p.name.to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                tags: (!p.supported).then(|| vec![CompletionItemTag::DEPRECATED]),
                ..Default::default()
            };
            CompletionData::new(TRIGGER_PREPROCESSOR).attach(item)
        })
        .collect()
}

fn describe_preprocessor(mut item: CompletionItem) -> CompletionItem {
    if let Some(p) = find_preprocessor(&item.label) {
        item.detail = Some(format!("#{}", p.name));
        item.documentation = Some(Documentation::String(p.description.to_string()));
    }
    item
}

fn package_items(chain: &[String]) -> Vec<CompletionItem> {
    let Some(children) = import_children(chain) else {
        return Vec::new();
    };
    children
        .iter()
        .map(|(name, node): (&String, &ImportNode)| {
            let (kind, detail) = if node.is_package() {
                (CompletionItemKind::MODULE, None)
            } else {
                let mut path = chain.to_vec();
                path.push(name.clone());
                (CompletionItemKind::CLASS, Some(path.join(".")))
            };
            let item = CompletionItem {
                label: name.clone(),
                kind: Some(kind),
                detail,
                ..Default::default()
            };
            CompletionData::new(TRIGGER_DOT).attach(item)
        })
        .collect()
}

fn global_items() -> Vec<CompletionItem> {
    let keywords = KEYWORDS.iter().map(|keyword| CompletionItem {
        label: keyword.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        ..Default::default()
    });
    let globals = GLOBALS.iter().map(|global| CompletionItem {
        label: global.name.to_string(),
        kind: Some(match global.kind {
            GlobalKind::Variable => CompletionItemKind::VARIABLE,
            GlobalKind::Function => CompletionItemKind::FUNCTION,
        }),
        detail: Some(global.detail.to_string()),
        ..Default::default()
    });
    keywords
        .chain(globals)
        .map(|item| CompletionData::new(TRIGGER_NONE).attach(item))
        .collect()
}
