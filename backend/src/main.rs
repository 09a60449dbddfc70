//! csv2ttl CLI - Turn CSV files into RDF Turtle
//!
//! # Main Commands
//!
//! ```bash
//! csv2ttl init input.csv --id isbn --class bibo:Book -o mapping.json
//! csv2ttl generate input.csv -c mapping.json -o output.ttl
//! csv2ttl serve                    # Start HTTP server (port 3000)
//! csv2ttl config list              # Manage stored configurations
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! csv2ttl parse input.csv          # Just parse CSV to JSON
//! csv2ttl validate mapping.json    # Check a configuration
//! ```

use clap::{Parser, Subcommand};
use csv2ttl::{
    api::{start_server, DEFAULT_PORT, LOG_BROADCASTER},
    format_delimiter, generate_from_csv, load_config_json, parse_bytes_auto, validate_config, Config,
    ConfigError, ConfigRegistry, EntitySelection, DEFAULT_SPLIT_DELIMITER,
};
use std::fs;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Environment variable for the default server port.
const PORT_ENV: &str = "CSV2TTL_PORT";

#[derive(Parser)]
#[command(name = "csv2ttl")]
#[command(about = "Convert CSV files to RDF Turtle from a mapping configuration", long_about = None)]
struct Cli {
    /// Do not echo progress logs to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Turtle from a CSV file
    Generate {
        /// Input CSV file
        input: PathBuf,

        /// Mapping configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output Turtle file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the canonical effective configuration to this file
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Use a stored configuration
        #[arg(short, long, conflicts_with = "config")]
        template: Option<String>,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draft a mapping configuration for a CSV file
    Init {
        /// Input CSV file
        input: PathBuf,

        /// Identifier column of the main entity
        #[arg(long)]
        id: Option<String>,

        /// RDF class of the main entity
        #[arg(long)]
        class: Option<String>,

        /// Column identifying a derived entity, optionally `column=Name`
        #[arg(short, long = "entity")]
        entities: Vec<String>,

        /// Column whose cells hold several `;`-separated values
        #[arg(short, long)]
        multi: Vec<String>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a mapping configuration
    Validate {
        /// Configuration JSON file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $CSV2TTL_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage stored configurations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List all stored configurations
    List,

    /// Import a configuration JSON file
    Import {
        /// Configuration JSON file to import
        file: PathBuf,
        /// Name for the stored configuration
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show a stored configuration
    Show {
        /// Configuration ID
        id: String,
    },

    /// Delete a stored configuration
    Delete {
        /// Configuration ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOG_BROADCASTER.set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Generate {
            input,
            config,
            delimiter,
            output,
            save_config,
            template,
        } => cmd_generate(
            &input,
            config.as_deref(),
            template.as_deref(),
            delimiter,
            output.as_deref(),
            save_config.as_deref(),
        ),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Init {
            input,
            id,
            class,
            entities,
            multi,
            delimiter,
            output,
        } => cmd_init(
            &input,
            id.as_deref(),
            class.as_deref(),
            &entities,
            &multi,
            delimiter,
            output.as_deref(),
        ),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Config { action } => cmd_config(action),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_generate(
    input: &Path,
    config_path: Option<&Path>,
    template: Option<&str>,
    delimiter: Option<char>,
    output: Option<&Path>,
    save_config: Option<&Path>,
) -> CliResult<()> {
    eprintln!("📄 Processing: {}", input.display());
    let bytes = fs::read(input)?;

    let mut registry = ConfigRegistry::new();
    let (config, stored_id) = match (config_path, template) {
        (Some(path), _) => (load_config_json(&fs::read_to_string(path)?)?, None),
        (None, Some(id)) => (registry.get(id)?.config.clone(), Some(id.to_string())),
        (None, None) => {
            let headers = parse_bytes_auto(&bytes, delimiter)?.headers;
            let (stored, score) = registry
                .find_compatible(&headers)
                .into_iter()
                .next()
                .ok_or("No configuration given and no stored configuration matches these columns (try `csv2ttl init`)")?;
            eprintln!("   Using stored configuration: {} ({:.0}% match)", stored.name, score * 100.0);
            (stored.config.clone(), Some(stored.id.clone()))
        }
    };

    let result = match generate_from_csv(&bytes, delimiter, &config) {
        Ok(result) => result,
        Err(e) => {
            if let Some(errors) = e.validation_errors() {
                for err in errors {
                    eprintln!("   - {}", err);
                }
            }
            return Err(e.into());
        }
    };

    if let Some(id) = stored_id {
        registry.touch(&id)?;
    }

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.csv_info.delimiter));
    eprintln!("   Rows: {}", result.generation.stats.rows);
    for stats in &result.generation.stats.entities {
        eprintln!(
            "   {}: {} resources ({} duplicates, {} rows without identifier)",
            stats.entity, stats.resources, stats.duplicates, stats.skipped_rows
        );
    }

    if let Some(path) = save_config {
        fs::write(path, result.generation.canonical_config_json()?)?;
        eprintln!("   💾 Configuration saved to: {}", path.display());
    }

    write_output(&result.generation.turtle, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(input: &Path, delimiter: Option<char>, output: Option<&Path>) -> CliResult<()> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_bytes_auto(&fs::read(input)?, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows_as_json())?;
    write_output(&json, output)?;

    Ok(())
}

/// `column` or `column=Name`.
fn parse_entity_arg(arg: &str) -> EntitySelection {
    match arg.split_once('=') {
        Some((column, name)) => EntitySelection::new(column.trim(), Some(name.trim())),
        None => EntitySelection::new(arg.trim(), None),
    }
}

fn cmd_init(
    input: &Path,
    id_column: Option<&str>,
    class: Option<&str>,
    entities: &[String],
    multi: &[String],
    delimiter: Option<char>,
    output: Option<&Path>,
) -> CliResult<()> {
    eprintln!("📄 Drafting configuration for: {}", input.display());

    let parsed = parse_bytes_auto(&fs::read(input)?, delimiter)?;
    let mut config = Config::scaffold(&parsed.headers, &parsed.rows);

    if let Some(main) = config.entities.first_mut() {
        if let Some(column) = id_column {
            if !parsed.headers.iter().any(|h| h == column) {
                return Err(format!("Unknown column: {}", column).into());
            }
            main.csv_identifier_column = column.to_string();
        }
        if let Some(class) = class {
            main.rdf_class = class.to_string();
        }
    }

    let selections: Vec<EntitySelection> = entities.iter().map(|e| parse_entity_arg(e)).collect();
    config.add_derived_entities(&selections)?;
    for column in multi {
        config.set_multi_value(column, DEFAULT_SPLIT_DELIMITER)?;
    }

    eprintln!("   Columns: {}", parsed.headers.join(", "));
    eprintln!("   Entities: {}", config.entities.len());
    if let Err(errors) = validate_config(&config) {
        eprintln!("   Still to fill in:");
        for err in errors {
            eprintln!("     - {}", err);
        }
    }

    write_output(&config.to_json()?, output)?;
    Ok(())
}

fn cmd_validate(input: &Path) -> CliResult<()> {
    eprintln!("✔️  Validating: {}", input.display());

    let config = load_config_json(&fs::read_to_string(input)?)?;
    match validate_config(&config) {
        Ok(()) => {
            eprintln!("✅ Configuration valid ({} entities)", config.entities.len());
            Ok(())
        }
        Err(errors) => {
            for err in &errors {
                eprintln!("   - {}", err);
            }
            Err(ConfigError::Validation { errors }.into())
        }
    }
}

async fn cmd_serve(port: Option<u16>) -> CliResult<()> {
    let port = match port {
        Some(port) => port,
        None => match std::env::var(PORT_ENV) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("Invalid {}: {}", PORT_ENV, raw))?,
            Err(_) => DEFAULT_PORT,
        },
    };
    start_server(port).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction) -> CliResult<()> {
    let mut registry = ConfigRegistry::new();

    match action {
        ConfigAction::List => {
            let configs = registry.list();
            if configs.is_empty() {
                eprintln!("📋 No configurations stored yet.");
                eprintln!("   Use 'csv2ttl config import <file>' to add one.");
                return Ok(());
            }

            eprintln!("📋 Stored configurations ({}):\n", configs.len());
            for c in configs {
                println!("  📄 {} ({})", c.name, c.id);
                println!("     Columns: {}", c.csv_columns.join(", "));
                println!("     Uses: {}", c.use_count);
                if let Some(ref last) = c.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        ConfigAction::Import { file, name } => {
            eprintln!("📥 Importing configuration from: {}", file.display());
            let id = registry.import(&file, name.as_deref())?;
            eprintln!("✅ Configuration saved with ID: {}", id);
        }

        ConfigAction::Show { id } => {
            let c = registry.get(&id)?;
            println!("📄 Configuration: {} ({})\n", c.name, c.id);
            println!("CSV Columns: {}", c.csv_columns.join(", "));
            println!("Created: {}", c.created_at);
            println!("Uses: {}", c.use_count);
            println!("\nConfig:");
            println!("{}", c.config.to_json()?);
        }

        ConfigAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("🗑️  Configuration deleted: {}", id);
        }
    }

    Ok(())
}
