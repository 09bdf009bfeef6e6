//! pkgshelf CLI - terminal front end for the favorites shelf
//!
//! Plays the role the popup and options pages play in a browser: every
//! mutation goes through the coordinator handle, never straight to
//! storage.
//!
//! Usage:
//!   pkgshelf-cli list [--search <term>] [--tag <tag>] [--sort <order>]
//!   pkgshelf-cli save <name> [--version <v>] [--description <d>] [--note <n>] [--tag <t>]...
//!   pkgshelf-cli remove <name>
//!   pkgshelf-cli check <name>
//!   pkgshelf-cli import <file>
//!   pkgshelf-cli export [--format structured|text] [--output <path>]
//!   pkgshelf-cli settings [show | set <key> <value>]
//!   pkgshelf-cli stats
//!   pkgshelf-cli clear

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::EnvFilter;

use pkgshelf_lib::capture;
use pkgshelf_lib::coordinator::{self, CoordinatorHandle};
use pkgshelf_lib::export::ExportFormat;
use pkgshelf_lib::model::FavoriteCandidate;
use pkgshelf_lib::settings::Theme;
use pkgshelf_lib::storage::JsonFileBackend;
use pkgshelf_lib::store::FavoritesStore;
use pkgshelf_lib::views::{self, SortOrder};

#[derive(Debug)]
enum Command {
    List {
        search: String,
        tag: String,
        sort: SortOrder,
    },
    Save {
        candidate: FavoriteCandidate,
    },
    Remove {
        name: String,
    },
    Check {
        name: String,
    },
    Import {
        file: PathBuf,
    },
    Export {
        format: Option<ExportFormat>,
        output: Option<PathBuf>,
    },
    SettingsShow,
    SettingsSet {
        key: String,
        value: String,
    },
    Stats,
    Clear,
    Help,
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    match parse_args(&args) {
        Ok(cmd) => {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Error: failed to start runtime: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match runtime.block_on(run_command(cmd)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn flag_value<'a>(args: &'a [String], names: &[&str]) -> Option<&'a str> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn flag_values(args: &[String], names: &[&str]) -> Vec<String> {
    let mut values = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if names.contains(&args[i].as_str()) {
            if let Some(value) = args.get(i + 1) {
                values.push(value.clone());
                i += 1;
            }
        }
        i += 1;
    }
    values
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => Ok(Command::Help),
        "version" | "--version" | "-V" => Ok(Command::Version),

        "list" => {
            let rest = &args[2..];
            let sort = match flag_value(rest, &["--sort", "-s"]) {
                None | Some("newest") => SortOrder::Newest,
                Some("oldest") => SortOrder::Oldest,
                Some("name") => SortOrder::Name,
                Some(other) => return Err(format!("Unknown sort order: {}", other)),
            };
            Ok(Command::List {
                search: flag_value(rest, &["--search", "-q"]).unwrap_or_default().to_string(),
                tag: flag_value(rest, &["--tag", "-t"]).unwrap_or_default().to_string(),
                sort,
            })
        }

        "save" => {
            let name = args
                .get(2)
                .filter(|a| !a.starts_with('-'))
                .ok_or("Missing package name")?
                .clone();
            let rest = &args[3..];
            let tags = flag_values(rest, &["--tag", "-t"]);
            let candidate = FavoriteCandidate {
                name,
                version: flag_value(rest, &["--version"]).map(str::to_string),
                description: flag_value(rest, &["--description", "-d"]).map(str::to_string),
                tags: if tags.is_empty() { None } else { Some(tags) },
                note: flag_value(rest, &["--note", "-n"]).map(str::to_string),
                url: flag_value(rest, &["--url"]).map(str::to_string),
                saved_at: None,
            };
            Ok(Command::Save { candidate })
        }

        "remove" => {
            let name = args.get(2).ok_or("Missing package name")?.clone();
            Ok(Command::Remove { name })
        }

        "check" => {
            let name = args.get(2).ok_or("Missing package name")?.clone();
            Ok(Command::Check { name })
        }

        "import" => {
            let file = args.get(2).ok_or("Missing import file")?;
            Ok(Command::Import {
                file: PathBuf::from(file),
            })
        }

        "export" => {
            let rest = &args[2..];
            let format = match flag_value(rest, &["--format", "-f"]) {
                None => None,
                Some("structured") => Some(ExportFormat::Structured),
                Some("text") => Some(ExportFormat::Text),
                Some(other) => return Err(format!("Unknown export format: {}", other)),
            };
            Ok(Command::Export {
                format,
                output: flag_value(rest, &["--output", "-o"]).map(PathBuf::from),
            })
        }

        "settings" => match args.get(2).map(String::as_str) {
            None | Some("show") => Ok(Command::SettingsShow),
            Some("set") => {
                let key = args.get(3).ok_or("Missing settings key")?.clone();
                let value = args.get(4).ok_or("Missing settings value")?.clone();
                Ok(Command::SettingsSet { key, value })
            }
            Some(other) => Err(format!("Unknown settings subcommand: {}", other)),
        },

        "stats" => Ok(Command::Stats),
        "clear" => Ok(Command::Clear),

        _ => Err(format!("Unknown command: {}", args[1])),
    }
}

fn print_help() {
    println!(
        r#"pkgshelf CLI - local favorites shelf for registry packages

USAGE:
    pkgshelf-cli <COMMAND> [OPTIONS]

COMMANDS:
    list                List saved favorites
        --search, -q    Filter by search term (name, description, note)
        --tag, -t       Filter by tag
        --sort, -s      Sort order: newest (default), oldest, name

    save <NAME>         Save or update a favorite
        --version       Version string
        --description   Short description
        --note, -n      Free-text note
        --tag, -t       Tag (repeatable)
        --url           Source page URL

    remove <NAME>       Remove a favorite
    check <NAME>        Show whether a package is saved

    import <FILE>       Import a structured export; existing entries win

    export              Render the collection
        --format, -f    structured or text (default: settings)
        --output, -o    Write to a file instead of stdout

    settings show       Show current settings
    settings set <K> <V>
                        Set exportFormat, theme, notifications, or autoTag

    stats               Collection statistics
    clear               Remove all favorites (asks twice)

    help                Show this help message
    version             Show version information

EXAMPLES:
    pkgshelf-cli save react --version 18.2.0 --tag React
    pkgshelf-cli list --tag React --sort name
    pkgshelf-cli export --format text --output favorites.md
"#
    );
}

fn data_file_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("PKGSHELF_DATA_FILE") {
        return Ok(PathBuf::from(path));
    }
    dirs::data_dir()
        .map(|d| d.join("pkgshelf/favorites.json"))
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}

async fn connect() -> Result<CoordinatorHandle> {
    let backend = JsonFileBackend::new(data_file_path()?);
    coordinator::spawn(FavoritesStore::new(backend))
        .await
        .context("failed to start the favorites coordinator")
}

async fn run_command(cmd: Command) -> Result<()> {
    match cmd {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("pkgshelf-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::List { search, tag, sort } => {
            let handle = connect().await?;
            let collection = handle.list_fresh().await?;
            let filtered = views::filter(&collection, &search, &tag);
            let sorted = views::sort(&filtered, sort);

            if sorted.is_empty() {
                println!("No saved favorites found.");
                return Ok(());
            }

            println!("{:<28} {:<12} {}", "NAME", "VERSION", "TAGS");
            println!("{}", "-".repeat(72));
            for record in &sorted {
                println!(
                    "{:<28} {:<12} {}",
                    record.name,
                    record.version.as_deref().unwrap_or("latest"),
                    record.tags.join(", ")
                );
                if let Some(note) = record.note.as_deref().filter(|n| !n.is_empty()) {
                    println!("    note: {}", note);
                }
            }
            if sorted.len() < collection.len() {
                println!("\n{} of {} favorites shown", sorted.len(), collection.len());
            } else {
                println!("\n{} favorites", sorted.len());
            }
            Ok(())
        }
        Command::Save { mut candidate } => {
            let handle = connect().await?;
            // No explicit tags: fall back to the auto-tag heuristics when
            // the setting is on, as the page agent does
            if candidate.tags.is_none() && handle.settings().await?.auto_tag {
                let derived = capture::derive_tags(
                    &candidate.name,
                    candidate.description.as_deref().unwrap_or_default(),
                );
                if !derived.is_empty() {
                    candidate.tags = Some(derived);
                }
            }
            let name = candidate.name.clone();
            let collection = handle.save(candidate).await?;
            println!("Saved '{}' ({} favorites total)", name, collection.len());
            Ok(())
        }
        Command::Remove { name } => {
            let handle = connect().await?;
            let collection = handle.remove(&name).await?;
            println!("Removed '{}' ({} favorites left)", name, collection.len());
            Ok(())
        }
        Command::Check { name } => {
            let handle = connect().await?;
            if handle.check(&name).await? {
                println!("'{}' is saved", name);
            } else {
                println!("'{}' is not saved", name);
            }
            Ok(())
        }
        Command::Import { file } => {
            let handle = connect().await?;
            let payload = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {:?}", file))?;
            let result = handle.import(&payload).await?;
            println!(
                "Imported {} new favorites ({} total)",
                result.imported_count, result.total_count
            );
            Ok(())
        }
        Command::Export { format, output } => {
            let handle = connect().await?;
            let format = match format {
                Some(format) => format,
                None => handle.settings().await?.export_format,
            };
            let rendering = handle.export(format).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendering.content)
                        .with_context(|| format!("failed to write {:?}", path))?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    println!("{}", rendering.content);
                    eprintln!("Suggested filename: {}", rendering.suggested_filename);
                }
            }
            Ok(())
        }
        Command::SettingsShow => {
            let handle = connect().await?;
            let settings = handle.settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::SettingsSet { key, value } => {
            let handle = connect().await?;
            let mut settings = handle.settings().await?;
            match key.as_str() {
                "exportFormat" => {
                    settings.export_format = match value.as_str() {
                        "structured" => ExportFormat::Structured,
                        "text" => ExportFormat::Text,
                        _ => bail!("exportFormat must be 'structured' or 'text'"),
                    }
                }
                "theme" => {
                    settings.theme = match value.as_str() {
                        "light" => Theme::Light,
                        "dark" => Theme::Dark,
                        _ => bail!("theme must be 'light' or 'dark'"),
                    }
                }
                "notifications" => settings.notifications = parse_bool(&value)?,
                "autoTag" => settings.auto_tag = parse_bool(&value)?,
                _ => bail!("Unknown settings key: {}", key),
            }
            handle.save_settings(settings).await?;
            println!("Settings saved");
            Ok(())
        }
        Command::Stats => {
            let handle = connect().await?;
            let stats = handle.stats().await?;
            println!("Favorites Statistics");
            println!("{}", "-".repeat(30));
            println!("Packages: {}", stats.package_count);
            println!("Tags:     {}", stats.tag_count);
            println!("Size:     {:.2} KB", stats.approx_bytes as f64 / 1024.0);
            Ok(())
        }
        Command::Clear => {
            let handle = connect().await?;
            let count = handle.list_fresh().await?.len();
            if count == 0 {
                println!("No saved favorites to clear.");
                return Ok(());
            }

            // Destructive path asks twice, like the options page does
            let first = prompt(&format!(
                "This removes all {} saved favorites and cannot be undone. Continue? (yes/no): ",
                count
            ))?;
            if first.trim() != "yes" {
                println!("Aborted.");
                return Ok(());
            }
            let second = prompt("Please confirm again - really remove every favorite? (yes/no): ")?;
            if second.trim() != "yes" {
                println!("Aborted.");
                return Ok(());
            }

            handle.clear().await?;
            println!("All favorites cleared.");
            Ok(())
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => bail!("Expected true or false, got '{}'", value),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
