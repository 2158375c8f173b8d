//! Context-aware completion for ZenScript
//!
//! This module provides:
//! - Intent detection from trigger characters and the text around the cursor
//! - Colon-chained bracket handler resolution (`<item:mod:id>`)
//! - Catalogs for preprocessor directives, importable packages and globals

pub mod bracket_handler;
pub mod catalogs;
pub mod context;
pub mod item;
pub mod provider;

pub use bracket_handler::{
    BracketHandler, BracketHandlerRegistry, DEFAULT_HANDLER, ItemBracketHandler,
    SimpleBracketHandler,
};
pub use catalogs::{CatalogError, ItemCatalog};
pub use context::{CompletionCategory, CompletionContextResolver, ResolvedContext};
pub use item::CompletionData;
pub use provider::CompletionProvider;
