//! NFL Matchup Dataset CLI
//!
//! Imports raw game results and builds the per-week matchup training table.

use clap::{Parser, Subcommand};
use gridiron::{Config, Result};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Build NFL matchup training datasets from game results", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raw results commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Build the matchup dataset and replace the stored table
    Build {
        /// Only build these seasons (repeatable)
        #[arg(long = "season")]
        seasons: Vec<u16>,
        /// Also write the dataset as CSV
        #[arg(long)]
        csv: Option<String>,
    },
    /// Dataset store commands
    Dataset {
        #[command(subcommand)]
        action: DatasetCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import a TheSportsDB events JSON file
    Import {
        /// Path to the events JSON document
        file: String,
        /// Season for events that do not name one
        #[arg(long)]
        season: Option<u16>,
    },
    /// Show raw results status
    Status,
}

#[derive(Subcommand)]
enum DatasetCommands {
    /// List stored tables with their columns and row counts
    Inspect,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Import { file, season } => commands::data_import(&config, &file, season),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Build { seasons, csv } => commands::build(&config, &seasons, csv),
        Commands::Dataset { action } => match action {
            DatasetCommands::Inspect => commands::dataset_inspect(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use gridiron::data::sportsdb::load_events_file;
    use gridiron::data::{Database, DatasetBuilder, DatasetStore};
    use gridiron::features::schedule::current_week;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        // Create data directory
        for path in [&config.data.results_path, &config.data.dataset_path] {
            if let Some(parent) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        println!("Created data directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to choose seasons and weeks", config_path);
        println!("  2. Run 'gridiron data import <events.json>' to load game results");
        println!("  3. Run 'gridiron build' to create the matchup dataset");
        println!("  4. Run 'gridiron dataset inspect' to check the stored table");

        Ok(())
    }

    pub fn data_import(config: &Config, file: &str, season: Option<u16>) -> Result<()> {
        let db = Database::open(&config.data.results_path)?;

        println!("Importing events from {}...", file);
        let games = load_events_file(file, season)?;

        if games.is_empty() {
            println!("No played games found in {}", file);
            return Ok(());
        }

        let count = db.upsert_games(&games)?;
        println!("Stored {} games in results database", count);

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.results_path)?;
        let stats = db.get_stats()?;

        println!("Results Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.results_path);
        println!("  Games:    {}", stats.game_count);
        if !stats.seasons.is_empty() {
            let seasons: Vec<String> = stats.seasons.iter().map(|s| s.to_string()).collect();
            println!("  Seasons:  {}", seasons.join(", "));
        }
        if let (Some(earliest), Some(latest)) = (stats.earliest_game, stats.latest_game) {
            println!("  Range:    {} to {}", earliest, latest);
        }
        println!(
            "  Current week: {}",
            current_week(chrono::Local::now().date_naive())
        );

        Ok(())
    }

    pub fn build(config: &Config, seasons: &[u16], csv: Option<String>) -> Result<()> {
        let db = Database::open(&config.data.results_path)?;
        let builder = DatasetBuilder::from_config(&db, config)?.with_seasons(seasons);

        let seasons = builder.seasons();
        println!("Building dataset for seasons {:?}...", seasons);
        let dataset = builder.build()?;

        let mut store = DatasetStore::open(&config.data.dataset_path)?;
        let summary = store.replace(&dataset, &seasons)?;
        println!(
            "Saved {} games ({} columns) to table {} in {}",
            summary.rows, summary.columns, summary.table, config.data.dataset_path
        );

        if let Some(path) = csv {
            let file = std::fs::File::create(&path)?;
            dataset.write_csv(std::io::BufWriter::new(file))?;
            println!("Wrote CSV to {}", path);
        }

        Ok(())
    }

    pub fn dataset_inspect(config: &Config) -> Result<()> {
        let store = DatasetStore::open(&config.data.dataset_path)?;
        let tables = store.describe()?;

        println!("Dataset Store");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.dataset_path);

        if tables.is_empty() {
            println!("  No tables found. Run 'gridiron build' first.");
            return Ok(());
        }

        for table in tables {
            println!("\n  Table:    {}", table.name);
            println!("  Rows:     {}", table.row_count);
            println!("  Columns:  {}", table.columns.len());
            for (i, (name, ty)) in table.columns.iter().take(10).enumerate() {
                println!("    {:>3}. {:<24} {}", i + 1, name, ty);
            }
            if table.columns.len() > 10 {
                println!("    ... and {} more", table.columns.len() - 10);
            }
            println!("  Key columns: {}", table.key_columns.join(", "));
        }

        Ok(())
    }
}
