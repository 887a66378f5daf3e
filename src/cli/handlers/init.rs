use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::store::JsonStore;
use crate::io::workspace;

const CONFIG_TOML_TEMPLATE: &str = r##"[workspace]
name = "{name}"

[dates]
# Display language for date labels: "en" or "ru".
locale = "{locale}"

[scan]
# Run the recurrence scan before every `ch list`.
# Set to false if you prefer to run `ch scan` by hand.
on_list = true
"##;

/// Validate a locale argument before it reaches the config file.
fn validate_locale(locale: &str) -> Result<(), String> {
    match locale {
        "en" | "ru" => Ok(()),
        other => Err(format!(
            "unknown locale \"{}\" (expected \"en\" or \"ru\")",
            other
        )),
    }
}

/// Workspace name when `--name` is absent: the directory stem with
/// '-'/'_' word breaks title-cased, or "Chores" if nothing usable.
fn infer_name(dir: &Path) -> String {
    let words: Vec<String> = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Chores".to_string()
    } else {
        words.join(" ")
    }
}

fn render_config_toml(name: &str, locale: &str) -> String {
    CONFIG_TOML_TEMPLATE
        .replace("{name}", name)
        .replace("{locale}", locale)
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let chores_dir = cwd.join("chores");

    // Check if already initialized
    if chores_dir.is_dir() {
        return Err("chores workspace already exists in ./chores/".into());
    }

    // Check for parent workspace and warn
    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace::discover(parent)
    {
        let parent_dir = parent_root.join("chores");
        eprintln!("Note: parent workspace found at {}/", parent_dir.display());
        eprintln!("Creating new workspace in ./chores/");
    }

    let locale = args.locale.unwrap_or_else(|| "en".to_string());
    validate_locale(&locale)?;

    let name = args.name.unwrap_or_else(|| infer_name(&cwd));

    fs::create_dir_all(&chores_dir)?;
    fs::write(
        chores_dir.join("config.toml"),
        render_config_toml(&name, &locale),
    )?;
    JsonStore::create(&chores_dir.join("tasks.json"))?;

    println!("Initialized chores workspace: {}", name);
    Ok(())
}
