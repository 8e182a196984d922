//! CLI subcommands — init, validate, menu, show, pour, prime.

use crate::core::catalog::Catalog;
use crate::core::error::Error;
use crate::core::sequencer::{plan_pour, Dispenser};
use crate::core::types::{BarConfig, DispenseResult, PourStep};
use crate::hardware::sim::SimBank;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a starter bar.yaml and recipes.json
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate config and recipe book without touching hardware
    Validate {
        /// Path to the deployment config
        #[arg(short, long, default_value = "bar.yaml")]
        config: PathBuf,

        /// Path to the recipe book
        #[arg(short, long, default_value = "recipes.json")]
        recipes: PathBuf,
    },

    /// List recipe names in menu order
    Menu {
        #[arg(short, long, default_value = "bar.yaml")]
        config: PathBuf,

        #[arg(short, long, default_value = "recipes.json")]
        recipes: PathBuf,
    },

    /// Show a recipe's pour plan — resolved pumps and run times
    Show {
        /// Recipe name
        name: String,

        /// Number of drinks
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,

        #[arg(short, long, default_value = "bar.yaml")]
        config: PathBuf,

        #[arg(short, long, default_value = "recipes.json")]
        recipes: PathBuf,
    },

    /// Pour a recipe on the simulated pump bank
    Pour {
        /// Recipe name
        name: String,

        /// Number of drinks
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,

        /// Print the plan without driving any pump
        #[arg(long)]
        dry_run: bool,

        #[arg(short, long, default_value = "bar.yaml")]
        config: PathBuf,

        #[arg(short, long, default_value = "recipes.json")]
        recipes: PathBuf,
    },

    /// Run one pump manually to prime or clean a line
    Prime {
        /// Motor number as authored in recipes
        motor: u32,

        /// Volume to move, in ml
        #[arg(short, long)]
        volume: f64,

        /// Print the run time without driving the pump
        #[arg(long)]
        dry_run: bool,

        #[arg(short, long, default_value = "bar.yaml")]
        config: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), Error> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { config, recipes } => cmd_validate(&config, &recipes),
        Commands::Menu { config, recipes } => cmd_menu(&config, &recipes),
        Commands::Show {
            name,
            count,
            config,
            recipes,
        } => cmd_show(&config, &recipes, &name, count),
        Commands::Pour {
            name,
            count,
            dry_run,
            config,
            recipes,
        } => cmd_pour(&config, &recipes, &name, count, dry_run),
        Commands::Prime {
            motor,
            volume,
            dry_run,
            config,
        } => cmd_prime(&config, motor, volume, dry_run),
    }
}

const STARTER_CONFIG: &str = r#"name: my-bar

# Relay header pins in slot order. Slot 0 is the first entry.
pumps: [23, 21, 19, 15, 13, 11, 7, 5, 31, 33, 35]

# ml per second, shared by every pump. Measure yours: run
# `barbot prime 1 --volume 100` into a jug and divide.
flow_rate: 1.75

# Recipes address pumps by motor number; map them onto slots here.
# Delete this block to address slots directly (0-based).
motor_map:
  1: 0
  2: 1
  3: 2
  4: 3
  5: 4
  6: 5
  7: 6
  8: 7
  9: 8
  10: 9
  11: 10

max_count: 10
scale_by_count: true
"#;

const STARTER_RECIPES: &str = r#"{
    "Mojito": {
        "ingredients": [
            {"name": "white rum", "quantity": 45, "motor": 1},
            {"name": "mint syrup", "quantity": 30, "motor": 2},
            {"name": "soda", "quantity": 90, "motor": 3}
        ]
    },
    "Cuba Libre": {
        "ingredients": [
            {"name": "white rum", "quantity": 45, "motor": 1},
            {"name": "cola", "quantity": 120, "motor": 4}
        ]
    }
}
"#;

fn cmd_init(path: &Path) -> Result<(), Error> {
    let config_path = path.join("bar.yaml");
    let recipes_path = path.join("recipes.json");
    for existing in [&config_path, &recipes_path] {
        if existing.exists() {
            return Err(Error::Config {
                path: existing.display().to_string(),
                reason: "already exists".to_string(),
            });
        }
    }

    std::fs::write(&config_path, STARTER_CONFIG).map_err(|e| Error::Config {
        path: config_path.display().to_string(),
        reason: format!("cannot write: {}", e),
    })?;
    std::fs::write(&recipes_path, STARTER_RECIPES).map_err(|e| Error::Config {
        path: recipes_path.display().to_string(),
        reason: format!("cannot write: {}", e),
    })?;

    println!("Initialized barbot project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}", recipes_path.display());
    Ok(())
}

/// Load and cross-validate the deployment config and recipe book.
fn load_bar(config: &Path, recipes: &Path) -> Result<(BarConfig, Catalog), Error> {
    let config = BarConfig::load(config)?;
    let catalog = Catalog::load(recipes, &config)?;
    Ok((config, catalog))
}

fn cmd_validate(config: &Path, recipes: &Path) -> Result<(), Error> {
    let (config, catalog) = load_bar(config, recipes)?;
    println!(
        "OK: {} ({} pumps, {:.2} ml/s, {} recipes)",
        config.name,
        config.pumps.len(),
        config.flow_rate,
        catalog.len()
    );
    Ok(())
}

fn cmd_menu(config: &Path, recipes: &Path) -> Result<(), Error> {
    let (_, catalog) = load_bar(config, recipes)?;
    for name in catalog.names() {
        println!("{}", name);
    }
    Ok(())
}

/// Display a pour plan to stdout.
fn print_plan(name: &str, count: u32, steps: &[PourStep]) {
    let total: Duration = steps.iter().map(|s| s.duration).sum();
    println!(
        "{} x{} ({} steps, {:.1}s):",
        name,
        count,
        steps.len(),
        total.as_secs_f64()
    );
    for step in steps {
        println!(
            "  {:<16} pump {} (pin {:>2})  {:.1}s",
            step.ingredient,
            step.slot,
            step.pump,
            step.duration.as_secs_f64()
        );
    }
}

fn cmd_show(config: &Path, recipes: &Path, name: &str, count: u32) -> Result<(), Error> {
    let (config, catalog) = load_bar(config, recipes)?;
    let recipe = catalog.get(name)?;
    let steps = plan_pour(&config, recipe, count)?;
    print_plan(&recipe.name, count, &steps);
    Ok(())
}

fn print_result(result: &DispenseResult) {
    if result.aborted {
        println!(
            "Aborted: {} of {} x{} poured in {:.1}s",
            result.completed.len(),
            result.recipe,
            result.count,
            result.total_elapsed.as_secs_f64()
        );
    } else {
        println!(
            "Poured {} x{}: {} steps in {:.1}s",
            result.recipe,
            result.count,
            result.completed.len(),
            result.total_elapsed.as_secs_f64()
        );
    }
}

fn cmd_pour(
    config: &Path,
    recipes: &Path,
    name: &str,
    count: u32,
    dry_run: bool,
) -> Result<(), Error> {
    let (config, catalog) = load_bar(config, recipes)?;
    let recipe = catalog.get(name)?.clone();

    if dry_run {
        let steps = plan_pour(&config, &recipe, count)?;
        print_plan(&recipe.name, count, &steps);
        println!("Dry run — no pumps driven.");
        return Ok(());
    }

    let bank = SimBank::verbose(config.pumps.len());
    let mut dispenser = Dispenser::new(config, bank)?;
    let result = dispenser.dispense(&recipe, count)?;
    print_result(&result);
    Ok(())
}

fn cmd_prime(config: &Path, motor: u32, volume: f64, dry_run: bool) -> Result<(), Error> {
    let config = BarConfig::load(config)?;

    if dry_run {
        let slot = config.resolve_slot("prime", motor)?;
        println!(
            "prime: motor {} -> pump {} (pin {}), {:.1}s for {} ml",
            motor,
            slot,
            config.pumps[slot],
            volume / config.flow_rate,
            volume
        );
        println!("Dry run — no pumps driven.");
        return Ok(());
    }

    let bank = SimBank::verbose(config.pumps.len());
    let mut dispenser = Dispenser::new(config, bank)?;
    let step = dispenser.prime(motor, volume)?;
    println!(
        "Primed pump {} (pin {}) for {:.1}s",
        step.slot,
        step.pump,
        step.duration.as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_starter_files() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        assert!(dir.path().join("bar.yaml").exists());
        assert!(dir.path().join("recipes.json").exists());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bar.yaml"), "exists").unwrap();
        assert!(cmd_init(dir.path()).is_err());
    }

    #[test]
    fn test_starter_files_validate() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        cmd_validate(&dir.path().join("bar.yaml"), &dir.path().join("recipes.json")).unwrap();
    }

    #[test]
    fn test_menu_and_show() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let config = dir.path().join("bar.yaml");
        let recipes = dir.path().join("recipes.json");
        cmd_menu(&config, &recipes).unwrap();
        cmd_show(&config, &recipes, "Mojito", 2).unwrap();
    }

    #[test]
    fn test_show_unknown_recipe() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let err = cmd_show(
            &dir.path().join("bar.yaml"),
            &dir.path().join("recipes.json"),
            "Negroni",
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RecipeNotFound(_)));
    }

    #[test]
    fn test_pour_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        cmd_pour(
            &dir.path().join("bar.yaml"),
            &dir.path().join("recipes.json"),
            "Cuba Libre",
            1,
            true,
        )
        .unwrap();
    }

    /// Config with an unrealistic flow rate so real pours finish instantly.
    fn write_fast_bar(dir: &Path) -> (PathBuf, PathBuf) {
        let config = dir.join("bar.yaml");
        let recipes = dir.join("recipes.json");
        std::fs::write(
            &config,
            r#"
name: fast
pumps: [23, 21, 19]
flow_rate: 50000
"#,
        )
        .unwrap();
        std::fs::write(
            &recipes,
            r#"{"Splash": {"ingredients": [{"name": "soda", "quantity": 30, "motor": 0}]}}"#,
        )
        .unwrap();
        (config, recipes)
    }

    #[test]
    fn test_pour_real() {
        let dir = tempfile::tempdir().unwrap();
        let (config, recipes) = write_fast_bar(dir.path());
        cmd_pour(&config, &recipes, "Splash", 2, false).unwrap();
    }

    #[test]
    fn test_pour_invalid_count() {
        let dir = tempfile::tempdir().unwrap();
        let (config, recipes) = write_fast_bar(dir.path());
        let err = cmd_pour(&config, &recipes, "Splash", 0, false).unwrap_err();
        assert!(matches!(err, Error::InvalidOrder { .. }));
    }

    #[test]
    fn test_prime_real_and_dry() {
        let dir = tempfile::tempdir().unwrap();
        let (config, _) = write_fast_bar(dir.path());
        cmd_prime(&config, 1, 20.0, true).unwrap();
        cmd_prime(&config, 1, 20.0, false).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_recipe_book() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bar.yaml");
        let recipes = dir.path().join("recipes.json");
        std::fs::write(&config, "name: x\npumps: [23]\nflow_rate: 1.75\n").unwrap();
        std::fs::write(
            &recipes,
            r#"{"Ghost": {"ingredients": [{"name": "rum", "quantity": 45, "motor": 9}]}}"#,
        )
        .unwrap();
        let err = cmd_validate(&config, &recipes).unwrap_err();
        assert!(matches!(err, Error::CatalogLoad { .. }));
    }
}
