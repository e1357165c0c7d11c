//! `tcomp config` command - Configuration management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., signatures_db, last_orders.3)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("signatures_db", "SQLite database holding the signatures table"),
    ("signatures_table", "Table queried for signature names (default: signatures)"),
    ("default_format", "Default output format (yaml, json, md, id)"),
    ("last_orders.<machine>", "Last manufacturing order of a machine, pre-fills new records"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    match cmd {
        ConfigCommands::Show(args) => run_show(args, project.as_ref()),
        ConfigCommands::Set(args) => run_set(args, project.as_ref()),
        ConfigCommands::Unset(args) => run_unset(args, project.as_ref()),
        ConfigCommands::Path => run_path(project.as_ref()),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, project: Option<&Project>) -> Result<()> {
    let config = Config::load_for(project);

    if let Some(key) = &args.key {
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    let db = config.signatures_db(project);
    print_config_value("signatures_db", Some(&db.display().to_string()));
    print_config_value("signatures_table", Some(config.signatures_table()));
    print_config_value("default_format", config.default_format.as_deref());

    if config.last_orders.is_empty() {
        print_config_value("last_orders", None);
    } else {
        println!("  {}:", style("last_orders").cyan());
        for (machine, order) in &config.last_orders {
            println!("    {}: {}", style(machine).cyan(), style(order).yellow());
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (TCOMP_SIGNATURES_DB, TCOMP_SIGNATURES_TABLE)");
    println!("  2. Project config (.tcomp/config.yaml)");
    println!("  3. Global config (~/.config/tcomp/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs, project: Option<&Project>) -> Result<()> {
    check_key(&args.key)?;
    let config_path = config_path(args.global, project)?;

    let mut root = read_mapping(&config_path)?;
    set_nested_value(&mut root, &args.key, &args.value);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&root).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope
    );

    Ok(())
}

fn run_unset(args: UnsetArgs, project: Option<&Project>) -> Result<()> {
    let config_path = config_path(args.global, project)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut root = read_mapping(&config_path)?;
    if !unset_nested_value(&mut root, &args.key) {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&root).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "project" };
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope
    );

    Ok(())
}

fn run_path(project: Option<&Project>) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => {
            println!("  {} {}", style("Global:").cyan(), path.display());
            println!("         {}", exists_note(&path));
        }
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }

    println!();
    match project {
        Some(project) => {
            let path = project.config_dir().join("config.yaml");
            println!("  {} {}", style("Project:").cyan(), path.display());
            println!("          {}", exists_note(&path));
        }
        None => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a tcomp project)").dim()
        ),
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<24} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'tcomp config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn exists_note(path: &std::path::Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn config_path(global: bool, project: Option<&Project>) -> Result<PathBuf> {
    if global {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory"))
    } else {
        project
            .map(|p| p.config_dir().join("config.yaml"))
            .ok_or_else(|| {
                miette::miette!(
                    help = "Run 'tcomp init' or pass --global",
                    "Not in a tcomp project"
                )
            })
    }
}

/// Accept the scalar keys and `last_orders.<machine>`
fn check_key(key: &str) -> Result<()> {
    let valid = match key.split_once('.') {
        None => matches!(key, "signatures_db" | "signatures_table" | "default_format"),
        Some(("last_orders", machine)) => machine.parse::<u32>().is_ok(),
        Some(_) => false,
    };
    if valid {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run 'tcomp config keys' to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key.split_once('.') {
        Some(("last_orders", machine)) => machine
            .parse::<u32>()
            .ok()
            .and_then(|m| config.last_orders.get(&m).cloned()),
        Some(_) => None,
        None => match key {
            "signatures_db" => config.signatures_db.as_ref().map(|p| p.display().to_string()),
            "signatures_table" => config.signatures_table.clone(),
            "default_format" => config.default_format.clone(),
            _ => None,
        },
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

fn read_mapping(path: &std::path::Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: Value = serde_yml::from_str(&content).unwrap_or(Value::Null);
    Ok(match parsed {
        Value::Mapping(_) => parsed,
        _ => Value::Mapping(Mapping::new()),
    })
}

/// Numeric path segments (machine numbers) are written as integer keys
fn yaml_key(part: &str) -> Value {
    match part.parse::<u64>() {
        Ok(n) => Value::Number(n.into()),
        Err(_) => Value::String(part.to_string()),
    }
}

fn find_key(map: &Mapping, part: &str) -> Option<Value> {
    [yaml_key(part), Value::String(part.to_string())]
        .into_iter()
        .find(|k| map.contains_key(k))
}

fn set_nested_value(root: &mut Value, key: &str, value: &str) {
    let parts: Vec<&str> = key.split('.').collect();
    let mut current = root;

    for (i, part) in parts.iter().enumerate() {
        let Value::Mapping(map) = current else {
            return;
        };
        if i == parts.len() - 1 {
            if let Some(existing) = find_key(map, part) {
                map.remove(&existing);
            }
            map.insert(yaml_key(part), Value::String(value.to_string()));
            return;
        }

        let k = find_key(map, part).unwrap_or_else(|| yaml_key(part));
        if !matches!(map.get(&k), Some(Value::Mapping(_))) {
            map.insert(k.clone(), Value::Mapping(Mapping::new()));
        }
        match map.get_mut(&k) {
            Some(next) => current = next,
            None => return,
        }
    }
}

fn unset_nested_value(root: &mut Value, key: &str) -> bool {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };

    let mut current = root;
    for part in parents {
        let Value::Mapping(map) = current else {
            return false;
        };
        let Some(k) = find_key(map, part) else {
            return false;
        };
        match map.get_mut(&k) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match current {
        Value::Mapping(map) => match find_key(map, last) {
            Some(k) => map.remove(&k).is_some(),
            None => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("signatures_db").is_ok());
        assert!(check_key("last_orders.12").is_ok());
        assert!(check_key("last_orders.lathe").is_err());
        assert!(check_key("editor").is_err());
    }

    #[test]
    fn test_set_and_unset_nested() {
        let mut root = Value::Mapping(Mapping::new());
        set_nested_value(&mut root, "signatures_table", "operators");
        set_nested_value(&mut root, "last_orders.3", "MO-3");
        set_nested_value(&mut root, "last_orders.3", "MO-33");

        let yaml = serde_yml::to_string(&root).unwrap();
        let config: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(config.signatures_table(), "operators");
        assert_eq!(config.last_orders.get(&3).map(String::as_str), Some("MO-33"));

        assert!(unset_nested_value(&mut root, "last_orders.3"));
        assert!(!unset_nested_value(&mut root, "last_orders.3"));
        assert!(unset_nested_value(&mut root, "signatures_table"));
    }

    #[test]
    fn test_unset_string_keyed_machine() {
        let mut root: Value = serde_yml::from_str("last_orders:\n  '5': MO-5\n").unwrap();
        assert!(unset_nested_value(&mut root, "last_orders.5"));
    }
}
