//! Completion catalogs: preprocessor directives, importable packages,
//! global symbols and the item catalog behind `<item:...>`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

/// Items known per mod id, as exported from a game instance.
///
/// ```json
/// { "mods": { "minecraft": { "name": "Minecraft", "items": [ { "id": "apple", "name": "Apple" } ] } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemCatalog {
    #[serde(default)]
    pub mods: BTreeMap<String, ModEntry>,
}

impl ItemCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&text)?;
        info!(
            "Loaded item catalog from {}: {} mods, {} items",
            path.display(),
            catalog.mods.len(),
            catalog.mods.values().map(|m| m.items.len()).sum::<usize>()
        );
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn mod_ids(&self) -> impl Iterator<Item = (&str, &ModEntry)> {
        self.mods.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn get_mod(&self, mod_id: &str) -> Option<&ModEntry> {
        self.mods.get(mod_id)
    }

    pub fn find_item(&self, mod_id: &str, item_id: &str) -> Option<&ItemEntry> {
        self.get_mod(mod_id)?.items.iter().find(|item| item.id == item_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    pub name: &'static str,
    pub description: &'static str,
    /// Unsupported directives are still listed but marked deprecated.
    pub supported: bool,
}

pub const PREPROCESSORS: &[Preprocessor] = &[
    Preprocessor {
        name: "debug",
        description: "Writes the compiled classes of this script to the debug folder.",
        supported: true,
    },
    Preprocessor {
        name: "ignoreBracketErrors",
        description: "Suppresses errors for bracket handlers that cannot be resolved in this script.",
        supported: true,
    },
    Preprocessor {
        name: "loader",
        description: "Loads this script with the named loader instead of the default one, e.g. `#loader contenttweaker`.",
        supported: true,
    },
    Preprocessor {
        name: "modloaded",
        description: "Only loads this script when every listed mod id is present.",
        supported: true,
    },
    Preprocessor {
        name: "norun",
        description: "It completely disables the script it’s added to from being loaded into the game.",
        supported: false,
    },
    Preprocessor {
        name: "priority",
        description: "Scripts with a higher priority are loaded first, e.g. `#priority 100`.",
        supported: true,
    },
    Preprocessor {
        name: "profile",
        description: "Logs how long this script took to load.",
        supported: true,
    },
    Preprocessor {
        name: "sideonly",
        description: "Only loads this script on the given side, `client` or `server`.",
        supported: true,
    },
];

pub fn find_preprocessor(name: &str) -> Option<&'static Preprocessor> {
    PREPROCESSORS.iter().find(|p| p.name == name)
}

/// A node in the importable package tree. Nodes with children are packages,
/// leaves are classes.
#[derive(Debug, Default)]
pub struct ImportNode {
    pub children: BTreeMap<String, ImportNode>,
}

impl ImportNode {
    pub fn is_package(&self) -> bool {
        !self.children.is_empty()
    }

    fn insert(&mut self, qualified_name: &str) {
        let mut node = self;
        for segment in qualified_name.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }
}

const IMPORTABLE_CLASSES: &[&str] = &[
    "crafttweaker.block.IBlock",
    "crafttweaker.block.IBlockDefinition",
    "crafttweaker.block.IBlockState",
    "crafttweaker.data.IData",
    "crafttweaker.enchantments.IEnchantment",
    "crafttweaker.enchantments.IEnchantmentDefinition",
    "crafttweaker.entity.IEntity",
    "crafttweaker.entity.IEntityDefinition",
    "crafttweaker.events.IEventManager",
    "crafttweaker.game.IGame",
    "crafttweaker.item.IIngredient",
    "crafttweaker.item.IItemDefinition",
    "crafttweaker.item.IItemStack",
    "crafttweaker.item.IWeightedIngredient",
    "crafttweaker.liquid.ILiquidDefinition",
    "crafttweaker.liquid.ILiquidStack",
    "crafttweaker.oredict.IOreDict",
    "crafttweaker.oredict.IOreDictEntry",
    "crafttweaker.player.IPlayer",
    "crafttweaker.potions.IPotion",
    "crafttweaker.recipes.ICraftingInfo",
    "crafttweaker.recipes.IFurnaceManager",
    "crafttweaker.recipes.IRecipeManager",
    "crafttweaker.world.IBiome",
    "crafttweaker.world.IBlockPos",
    "crafttweaker.world.IWorld",
    "mods.contenttweaker.VanillaFactory",
    "mods.jei.JEI",
];

pub static IMPORT_TREE: Lazy<ImportNode> = Lazy::new(|| {
    let mut root = ImportNode::default();
    for class in IMPORTABLE_CLASSES {
        root.insert(class);
    }
    root
});

/// Children of the package named by `chain`; an empty chain lists the roots.
pub fn import_children(chain: &[String]) -> Option<&'static BTreeMap<String, ImportNode>> {
    let mut node: &'static ImportNode = &IMPORT_TREE;
    for segment in chain {
        node = node.children.get(segment)?;
    }
    node.is_package().then_some(&node.children)
}

pub fn is_package_root(name: &str) -> bool {
    IMPORT_TREE
        .children
        .get(name)
        .is_some_and(ImportNode::is_package)
}

pub const KEYWORDS: &[&str] = &[
    "any", "as", "bool", "break", "byte", "double", "else", "false", "float", "for", "function",
    "global", "if", "import", "in", "instanceof", "int", "long", "null", "return", "short",
    "static", "string", "true", "val", "var", "version", "void", "while", "zenClass",
    "zenConstructor",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKind {
    Variable,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalSymbol {
    pub name: &'static str,
    pub kind: GlobalKind,
    /// Type of a variable, signature of a function.
    pub detail: &'static str,
}

pub const GLOBALS: &[GlobalSymbol] = &[
    GlobalSymbol { name: "brewing", kind: GlobalKind::Variable, detail: "crafttweaker.brewing.IBrewingManager" },
    GlobalSymbol { name: "client", kind: GlobalKind::Variable, detail: "crafttweaker.client.IClient" },
    GlobalSymbol { name: "events", kind: GlobalKind::Variable, detail: "crafttweaker.events.IEventManager" },
    GlobalSymbol { name: "format", kind: GlobalKind::Variable, detail: "crafttweaker.formatting.IFormatter" },
    GlobalSymbol { name: "furnace", kind: GlobalKind::Variable, detail: "crafttweaker.recipes.IFurnaceManager" },
    GlobalSymbol { name: "game", kind: GlobalKind::Variable, detail: "crafttweaker.game.IGame" },
    GlobalSymbol { name: "itemUtils", kind: GlobalKind::Variable, detail: "crafttweaker.item.IItemUtils" },
    GlobalSymbol { name: "loadedMods", kind: GlobalKind::Variable, detail: "crafttweaker.mods.ILoadedMods" },
    GlobalSymbol { name: "oreDict", kind: GlobalKind::Variable, detail: "crafttweaker.oredict.IOreDict" },
    GlobalSymbol { name: "recipes", kind: GlobalKind::Variable, detail: "crafttweaker.recipes.IRecipeManager" },
    GlobalSymbol { name: "server", kind: GlobalKind::Variable, detail: "crafttweaker.server.IServer" },
    GlobalSymbol { name: "isNull", kind: GlobalKind::Function, detail: "function(any)bool" },
    GlobalSymbol { name: "max", kind: GlobalKind::Function, detail: "function(int,int)int" },
    GlobalSymbol { name: "min", kind: GlobalKind::Function, detail: "function(int,int)int" },
    GlobalSymbol { name: "pow", kind: GlobalKind::Function, detail: "function(double,double)double" },
    GlobalSymbol { name: "print", kind: GlobalKind::Function, detail: "function(string)void" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "mods": {
            "minecraft": {
                "name": "Minecraft",
                "items": [ { "id": "apple", "name": "Apple" }, { "id": "stick", "name": "Stick" } ]
            },
            "thermal": { "name": "Thermal Expansion" }
        }
    }"#;

    #[test]
    fn test_item_catalog_from_json() {
        let catalog = ItemCatalog::from_json(SAMPLE).unwrap();
        let ids: Vec<_> = catalog.mod_ids().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["minecraft", "thermal"]);
        assert_eq!(
            catalog.find_item("minecraft", "stick").map(|i| i.name.as_str()),
            Some("Stick")
        );
        assert!(catalog.get_mod("thermal").unwrap().items.is_empty());
    }

    #[test]
    fn test_item_catalog_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let catalog = ItemCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.mods.len(), 2);
    }

    #[test]
    fn test_item_catalog_errors() {
        let missing = ItemCatalog::load(Path::new("/nonexistent/items.json"));
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
        assert!(matches!(ItemCatalog::from_json("{"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_norun_is_unsupported() {
        let norun = find_preprocessor("norun").unwrap();
        assert!(!norun.supported);
        assert!(find_preprocessor("loader").unwrap().supported);
    }

    #[test]
    fn test_import_tree_navigation() {
        let roots: Vec<_> = import_children(&[]).unwrap().keys().cloned().collect();
        assert_eq!(roots, vec!["crafttweaker", "mods"]);

        let chain = vec!["crafttweaker".to_string(), "item".to_string()];
        let classes = import_children(&chain).unwrap();
        assert!(classes.contains_key("IItemStack"));
        assert!(!classes["IItemStack"].is_package());

        let leaf = vec!["mods".to_string(), "jei".to_string(), "JEI".to_string()];
        assert!(import_children(&leaf).is_none());
        assert!(import_children(&["nope".to_string()]).is_none());

        assert!(is_package_root("crafttweaker"));
        assert!(!is_package_root("recipes"));
    }
}
