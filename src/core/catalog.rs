//! Recipe catalog — JSON loading and eager validation.
//!
//! The catalog is loaded once at startup against the deployment config and
//! is immutable afterwards. Every structural problem is caught here, not at
//! dispense time: a recipe that references a pump outside the bank must
//! never make it onto the menu.

use crate::core::error::Error;
use crate::core::types::{BarConfig, Recipe, RecipeBook};
use std::path::Path;

/// Immutable in-memory table of named recipes, in menu order.
#[derive(Debug, Clone)]
pub struct Catalog {
    recipes: RecipeBook,
}

impl Catalog {
    /// Load a recipe book from a JSON file and validate it against the
    /// configured pump bank.
    pub fn load(path: &Path, config: &BarConfig) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::catalog(path, format!("cannot read file: {}", e)))?;
        let mut book: RecipeBook = serde_json::from_str(&content)
            .map_err(|e| Error::catalog(path, format!("JSON parse error: {}", e)))?;

        name_recipes(&mut book);
        let problems = validate_book(&book, config);
        if !problems.is_empty() {
            return Err(Error::catalog(path, problems.join("; ")));
        }

        log::info!("loaded {} recipes from {}", book.len(), path.display());
        Ok(Self { recipes: book })
    }

    /// Build a catalog from an already-parsed book. Used by tests and
    /// embedders that source recipes elsewhere.
    pub fn from_book(mut book: RecipeBook, config: &BarConfig) -> Result<Self, Error> {
        name_recipes(&mut book);
        let problems = validate_book(&book, config);
        if !problems.is_empty() {
            return Err(Error::CatalogLoad {
                path: "<memory>".to_string(),
                reason: problems.join("; "),
            });
        }
        Ok(Self { recipes: book })
    }

    /// Look up a recipe by name.
    pub fn get(&self, name: &str) -> Result<&Recipe, Error> {
        self.recipes
            .get(name)
            .ok_or_else(|| Error::RecipeNotFound(name.to_string()))
    }

    /// Recipe names in menu (file) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Copy each book key into its recipe's `name` field.
fn name_recipes(book: &mut RecipeBook) {
    for (name, recipe) in book.iter_mut() {
        recipe.name.clone_from(name);
    }
}

/// Validate every recipe in a book. Returns all problems found (empty = valid).
fn validate_book(book: &RecipeBook, config: &BarConfig) -> Vec<String> {
    let mut problems = Vec::new();

    for (name, recipe) in book {
        if name.is_empty() {
            problems.push("recipe with empty name".to_string());
        }
        if recipe.ingredients.is_empty() {
            problems.push(format!("recipe '{}' has no ingredients", name));
        }
        for ingredient in &recipe.ingredients {
            if !ingredient.quantity.is_finite() || ingredient.quantity <= 0.0 {
                problems.push(format!(
                    "recipe '{}' ingredient '{}' has non-positive quantity {}",
                    name, ingredient.name, ingredient.quantity
                ));
            }
            if let Err(e) = config.resolve_slot(&ingredient.name, ingredient.motor) {
                problems.push(format!("recipe '{}': {}", name, e));
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn config() -> BarConfig {
        BarConfig {
            name: "test".to_string(),
            pumps: vec![40, 38, 36, 32, 37, 35, 33, 31, 23, 21],
            flow_rate: 15.0,
            motor_map: IndexMap::new(),
            max_count: 10,
            scale_by_count: true,
        }
    }

    const BOOK: &str = r#"
{
    "Mojito": {
        "ingredients": [
            {"name": "mint-syrup", "quantity": 30, "motor": 2},
            {"name": "rum", "quantity": 45, "motor": 5}
        ],
        "imgpath": "img/mojito.png"
    },
    "Cuba Libre": {
        "ingredients": [
            {"name": "rum", "quantity": 45, "motor": 5},
            {"name": "cola", "quantity": 120, "motor": 0}
        ]
    }
}
"#;

    #[test]
    fn test_load_valid_book() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, BOOK).unwrap();

        let catalog = Catalog::load(&path, &config()).unwrap();
        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["Mojito", "Cuba Libre"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("ghost.json"), &config()).unwrap_err();
        assert!(matches!(err, Error::CatalogLoad { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, "{\"Mojito\": [not json").unwrap();
        let err = Catalog::load(&path, &config()).unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_get_known_and_unknown() {
        let book: RecipeBook = serde_json::from_str(BOOK).unwrap();
        let catalog = Catalog::from_book(book, &config()).unwrap();

        let mojito = catalog.get("Mojito").unwrap();
        assert_eq!(mojito.name, "Mojito");
        assert_eq!(mojito.ingredients[0].name, "mint-syrup");

        let err = catalog.get("Negroni").unwrap_err();
        assert!(matches!(err, Error::RecipeNotFound(name) if name == "Negroni"));
    }

    #[test]
    fn test_rejects_unconfigured_pump() {
        let json = r#"{"Broken": {"ingredients": [{"name": "rum", "quantity": 45, "motor": 99}]}}"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        let err = Catalog::from_book(book, &config()).unwrap_err();
        assert!(err.to_string().contains("motor 99"));
    }

    #[test]
    fn test_rejects_empty_recipe() {
        let json = r#"{"Empty": {"ingredients": []}}"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        let err = Catalog::from_book(book, &config()).unwrap_err();
        assert!(err.to_string().contains("no ingredients"));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let json = r#"{"Flat": {"ingredients": [{"name": "soda", "quantity": 0, "motor": 1}]}}"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        let err = Catalog::from_book(book, &config()).unwrap_err();
        assert!(err.to_string().contains("non-positive quantity"));
    }

    #[test]
    fn test_reports_all_problems() {
        let json = r#"
{
    "A": {"ingredients": []},
    "B": {"ingredients": [{"name": "x", "quantity": -5, "motor": 50}]}
}
"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        let err = Catalog::from_book(book, &config()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no ingredients"));
        assert!(msg.contains("non-positive quantity"));
        assert!(msg.contains("motor 50"));
    }

    #[test]
    fn test_indirection_must_be_total() {
        let mut cfg = config();
        cfg.motor_map.insert(1, 0);
        cfg.motor_map.insert(2, 1);

        // motor 3 is authored but has no map entry — load must fail
        let json = r#"{"Gap": {"ingredients": [{"name": "gin", "quantity": 40, "motor": 3}]}}"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        assert!(Catalog::from_book(book, &cfg).is_err());

        // mapped motors resolve
        let json = r#"{"Ok": {"ingredients": [{"name": "gin", "quantity": 40, "motor": 2}]}}"#;
        let book: RecipeBook = serde_json::from_str(json).unwrap();
        assert!(Catalog::from_book(book, &cfg).is_ok());
    }
}
