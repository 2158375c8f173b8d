//! Bracket handler families and the registry that dispatches colon-chained
//! handler paths (`<item:minecraft:apple>`) to them.
//!
//! Segment 0 of a path selects the family. Everything after it is
//! interpreted by that family alone.

use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemTag, Documentation,
};
use tracing::debug;

use super::catalogs::ItemCatalog;
use super::item::{CompletionData, TRIGGER_COLON, TRIGGER_LT};

/// Name of the family used when a path does not start with a known one.
pub const DEFAULT_HANDLER: &str = "item";

pub trait BracketHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn supported(&self) -> bool {
        true
    }

    /// Completions for the segment following `path`. `path[0]` is this
    /// handler's own name.
    fn next(&self, path: &[String]) -> Vec<CompletionItem>;

    /// Fill in details for an item this handler produced.
    fn detail(&self, item: CompletionItem) -> CompletionItem {
        item
    }
}

/// A family without refinement data: only its name is completed.
#[derive(Debug, Clone)]
pub struct SimpleBracketHandler {
    name: &'static str,
    description: &'static str,
    supported: bool,
}

impl SimpleBracketHandler {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            supported: true,
        }
    }

    pub const fn unsupported(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            supported: false,
        }
    }
}

impl BracketHandler for SimpleBracketHandler {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn supported(&self) -> bool {
        self.supported
    }

    fn next(&self, _path: &[String]) -> Vec<CompletionItem> {
        Vec::new()
    }
}

const SIMPLE_HANDLERS: &[SimpleBracketHandler] = &[
    SimpleBracketHandler::new("ore", "Ore dictionary entry, e.g. <ore:ingotIron>"),
    SimpleBracketHandler::new("liquid", "Liquid stack, e.g. <liquid:water>"),
    SimpleBracketHandler::new("entity", "Entity definition, e.g. <entity:minecraft:sheep>"),
    SimpleBracketHandler::new("enchantment", "Enchantment definition, e.g. <enchantment:minecraft:protection>"),
    SimpleBracketHandler::new("potion", "Potion, e.g. <potion:minecraft:strength>"),
    SimpleBracketHandler::new("biome", "Biome, e.g. <biome:plains>"),
    SimpleBracketHandler::new("blockstate", "Block state, e.g. <blockstate:minecraft:log:axis=y>"),
    SimpleBracketHandler::new("creativetab", "Creative tab, e.g. <creativetab:misc>"),
];

/// `<item:mod:id>` backed by an [`ItemCatalog`].
#[derive(Debug, Clone)]
pub struct ItemBracketHandler {
    catalog: Arc<ItemCatalog>,
}

impl ItemBracketHandler {
    pub fn new(catalog: Arc<ItemCatalog>) -> Self {
        Self { catalog }
    }
}

impl BracketHandler for ItemBracketHandler {
    fn name(&self) -> &str {
        DEFAULT_HANDLER
    }

    fn description(&self) -> &str {
        "Item stack, e.g. <item:minecraft:apple>"
    }

    fn next(&self, path: &[String]) -> Vec<CompletionItem> {
        match path {
            [_] => self
                .catalog
                .mod_ids()
                .map(|(id, entry)| {
                    let item = CompletionItem {
                        label: id.to_string(),
                        kind: Some(CompletionItemKind::MODULE),
                        detail: (!entry.name.is_empty()).then(|| entry.name.clone()),
                        ..Default::default()
                    };
                    CompletionData::with_predecessor(TRIGGER_COLON, path.to_vec()).attach(item)
                })
                .collect(),
            [_, mod_id] => self
                .catalog
                .get_mod(mod_id)
                .map(|entry| {
                    entry
                        .items
                        .iter()
                        .map(|entry| {
                            let item = CompletionItem {
                                label: entry.id.clone(),
                                kind: Some(CompletionItemKind::VALUE),
                                ..Default::default()
                            };
                            CompletionData::with_predecessor(TRIGGER_COLON, path.to_vec())
                                .attach(item)
                        })
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn detail(&self, mut item: CompletionItem) -> CompletionItem {
        let Some(predecessor) = CompletionData::from_item(&item).and_then(|d| d.predecessor) else {
            return item;
        };
        match predecessor.as_slice() {
            [_] => {
                if let Some(entry) = self.catalog.get_mod(&item.label) {
                    item.detail = Some(entry.name.clone());
                    item.documentation = Some(Documentation::String(format!(
                        "{} items",
                        entry.items.len()
                    )));
                }
            }
            [_, mod_id] => {
                if let Some(entry) = self.catalog.find_item(mod_id, &item.label) {
                    item.detail = Some(entry.name.clone());
                    item.documentation = Some(Documentation::String(format!(
                        "<item:{}:{}>",
                        mod_id, entry.id
                    )));
                }
            }
            _ => {}
        }
        item
    }
}

/// Name-keyed table of handler families, fixed after startup.
#[derive(Default)]
pub struct BracketHandlerRegistry {
    handlers: Vec<Arc<dyn BracketHandler>>,
    by_name: HashMap<String, usize>,
}

impl std::fmt::Debug for BracketHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BracketHandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

impl BracketHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item family over `catalog` plus every simple family.
    pub fn with_defaults(catalog: Arc<ItemCatalog>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ItemBracketHandler::new(catalog)));
        for handler in SIMPLE_HANDLERS {
            registry.register(Arc::new(handler.clone()));
        }
        debug!("Registered bracket handlers: {:?}", registry.names());
        registry
    }

    /// Register a family, replacing any previous one of the same name.
    pub fn register(&mut self, handler: Arc<dyn BracketHandler>) {
        let name = handler.name().to_string();
        match self.by_name.get(&name) {
            Some(&index) => self.handlers[index] = handler,
            None => {
                self.by_name.insert(name, self.handlers.len());
                self.handlers.push(handler);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BracketHandler>> {
        self.by_name.get(name).map(|&index| &self.handlers[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Completions after `path`, delegated to the family named by `path[0]`.
    /// An empty path means the default family.
    pub fn next(&self, path: &[String]) -> Vec<CompletionItem> {
        if path.is_empty() {
            return self.next(&[DEFAULT_HANDLER.to_string()]);
        }
        match self.get(&path[0]) {
            Some(handler) => handler.next(path),
            None => {
                debug!("No bracket handler named {:?}", path[0]);
                Vec::new()
            }
        }
    }

    /// Details for an item produced by `next`, routed by its recorded path.
    pub fn detail(&self, item: CompletionItem) -> CompletionItem {
        let handler = CompletionData::from_item(&item)
            .and_then(|data| data.predecessor)
            .and_then(|path| path.first().and_then(|name| self.get(name)).cloned());
        match handler {
            Some(handler) => handler.detail(item),
            None => item,
        }
    }

    /// One item per family, as offered after `<`.
    pub fn handler_items(&self) -> Vec<CompletionItem> {
        self.handlers
            .iter()
            .map(|handler| {
                let item = CompletionItem {
                    label: handler.name().to_string(),
                    kind: Some(CompletionItemKind::CLASS),
                    tags: (!handler.supported()).then(|| vec![CompletionItemTag::DEPRECATED]),
                    ..Default::default()
                };
                CompletionData::new(TRIGGER_LT).attach(item)
            })
            .collect()
    }

    /// Fill in the description of the family named by `item.label`.
    pub fn describe(&self, mut item: CompletionItem) -> CompletionItem {
        if let Some(handler) = self.get(&item.label) {
            item.detail = Some(handler.description().to_string());
        }
        item
    }
}
