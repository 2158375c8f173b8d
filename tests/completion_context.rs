/// Integration tests for completion
///
/// Tests verify:
/// - Intent resolution for each trigger character and for manual requests
/// - Bracket handler paths against an item catalog loaded from disk
/// - Completion follows document edits made through a session
use std::sync::Arc;

use indoc::indoc;
use tower_lsp::lsp_types::{
    Documentation, Position, Range, TextDocumentContentChangeEvent, Url,
};

use zenscript_language_server::lsp::document::DocumentSnapshot;
use zenscript_language_server::lsp::features::completion::{
    BracketHandlerRegistry, CompletionCategory, CompletionContextResolver, CompletionProvider,
    ItemCatalog,
};
use zenscript_language_server::lsp::sessions::DocumentSessionManager;
use zenscript_language_server::lsp::settings::ZenScriptSettings;

const CATALOG: &str = r#"{
    "mods": {
        "minecraft": {
            "name": "Minecraft",
            "items": [
                { "id": "apple", "name": "Apple" },
                { "id": "stick", "name": "Stick" }
            ]
        },
        "thermalfoundation": {
            "name": "Thermal Foundation",
            "items": [ { "id": "material", "name": "Material" } ]
        }
    }
}"#;

fn registry() -> BracketHandlerRegistry {
    BracketHandlerRegistry::with_defaults(Arc::new(ItemCatalog::default()))
}

fn category_at_end(source: &str, trigger: Option<&str>) -> CompletionCategory {
    let registry = registry();
    let snapshot = DocumentSnapshot::build(source.to_string(), 1);
    CompletionContextResolver::new(&registry)
        .resolve(&snapshot, source.len(), trigger)
        .category
}

fn strings(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn labels(items: &[tower_lsp::lsp_types::CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

#[test]
fn test_import_dot_collects_package_chain() {
    assert_eq!(
        category_at_end("import foo.", Some(".")),
        CompletionCategory::Import {
            chain: strings(&["foo"])
        }
    );
    assert_eq!(
        category_at_end("import crafttweaker.item.", Some(".")),
        CompletionCategory::Import {
            chain: strings(&["crafttweaker", "item"])
        }
    );
}

#[test]
fn test_colon_inside_bracket_handler() {
    assert_eq!(
        category_at_end("<item:", Some(":")),
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["item"])
        }
    );
    assert_eq!(
        category_at_end("<foo:bar:", Some(":")),
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["item", "foo", "bar"])
        }
    );
    assert_eq!(
        category_at_end("val ingot = <ore:", Some(":")),
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["ore"])
        }
    );
}

#[test]
fn test_manual_preprocessor() {
    assert_eq!(category_at_end("#", None), CompletionCategory::Preprocessor);
    assert_eq!(category_at_end("#pri", None), CompletionCategory::Preprocessor);
    assert_eq!(
        category_at_end("print(1);\n#", None),
        CompletionCategory::Preprocessor
    );
    assert_eq!(category_at_end("# not a directive", None), CompletionCategory::Generic);
}

#[test]
fn test_manual_requests_infer_from_the_line() {
    assert_eq!(
        category_at_end("import crafttweaker", None),
        CompletionCategory::Import { chain: Vec::new() }
    );
    assert_eq!(
        category_at_end("recipes.remove(<item:minecraft:", None),
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["item", "minecraft"])
        }
    );
    assert_eq!(
        category_at_end("recipes.remove(<item:minecraft:apple>", None),
        CompletionCategory::Generic
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let source = indoc! {r#"
        import crafttweaker.item.IItemStack;
        val apple = <item:minecraft:
    "#};
    let offset = source.trim_end().len();
    let snapshot = DocumentSnapshot::build(source.to_string(), 1);
    let provider = CompletionProvider::new(Arc::new(registry()));
    let settings = ZenScriptSettings::default();

    let first = provider.complete(&snapshot, offset, Some(":"), &settings);
    let second = provider.complete(&snapshot, offset, Some(":"), &settings);
    assert_eq!(first, second);
    assert_eq!(
        first.0.category,
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["item", "minecraft"])
        }
    );
}

#[test]
fn test_item_paths_from_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(&path, CATALOG).unwrap();

    let catalog = ItemCatalog::load(&path).unwrap();
    let provider = CompletionProvider::new(Arc::new(BracketHandlerRegistry::with_defaults(
        Arc::new(catalog),
    )));
    let settings = ZenScriptSettings::default();

    let source = "<item:";
    let snapshot = DocumentSnapshot::build(source.to_string(), 1);
    let (_, mods) = provider.complete(&snapshot, source.len(), Some(":"), &settings);
    assert_eq!(labels(&mods), vec!["minecraft", "thermalfoundation"]);

    let thermal = provider.resolve(mods[1].clone());
    assert_eq!(thermal.detail.as_deref(), Some("Thermal Foundation"));
    assert_eq!(
        thermal.documentation,
        Some(Documentation::String("1 items".to_string()))
    );

    let source = "<item:minecraft:";
    let snapshot = DocumentSnapshot::build(source.to_string(), 1);
    let (_, items) = provider.complete(&snapshot, source.len(), Some(":"), &settings);
    assert_eq!(labels(&items), vec!["apple", "stick"]);

    let stick = provider.resolve(items[1].clone());
    assert_eq!(stick.detail.as_deref(), Some("Stick"));
    assert_eq!(
        stick.documentation,
        Some(Documentation::String("<item:minecraft:stick>".to_string()))
    );
}

#[test]
fn test_missing_catalog_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = ItemCatalog::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(error.to_string().contains("absent.json"), "{error}");
}

#[tokio::test]
async fn test_completion_follows_session_edits() {
    let catalog = ItemCatalog::from_json(CATALOG).unwrap();
    let provider = CompletionProvider::new(Arc::new(BracketHandlerRegistry::with_defaults(
        Arc::new(catalog),
    )));
    let settings = ZenScriptSettings::default();
    let sessions = DocumentSessionManager::new();
    let uri = Url::parse("file:///scripts/recipes.zs").unwrap();

    let session = sessions.open(uri.clone(), "recipes.remove();\n".to_string(), 1);
    let snapshot = session.snapshot().await;
    assert!(snapshot.tree.is_well_formed());

    // Type `<item:minecraft:` between the parentheses.
    let inside = Position::new(0, 15);
    let change = TextDocumentContentChangeEvent {
        range: Some(Range::new(inside, inside)),
        range_length: None,
        text: "<item:minecraft:".to_string(),
    };
    let snapshot = session.apply(vec![change], 2).await.unwrap();
    assert_eq!(snapshot.text, "recipes.remove(<item:minecraft:);\n");

    let offset = snapshot.offset_at(&Position::new(0, 31));
    let (resolved, items) = provider.complete(&snapshot, offset, Some(":"), &settings);
    assert_eq!(
        resolved.category,
        CompletionCategory::BracketHandlerPath {
            segments: strings(&["item", "minecraft"])
        }
    );
    assert_eq!(labels(&items), vec!["apple", "stick"]);

    // A stale change does not replace the snapshot.
    let stale = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: String::new(),
    };
    assert!(session.apply(vec![stale], 2).await.is_none());
    assert_eq!(sessions.get(&uri).unwrap().snapshot().await.version, 2);
}
