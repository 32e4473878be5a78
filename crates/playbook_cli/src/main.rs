//! Playbook CLI
//!
//! Formation templates, validation, import/export, route figures and
//! headless play playback from the command line.

#[cfg(feature = "cli")]
use anyhow::{bail, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use playbook_cli::FormationSource;
#[cfg(feature = "cli")]
use playbook_core::FlipAxis;
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "playbook")]
#[command(about = "Football formations, routes and play timelines", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (YAML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Axis {
    Horizontal,
    Vertical,
}

#[cfg(feature = "cli")]
impl From<Axis> for FlipAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => FlipAxis::Horizontal,
            Axis::Vertical => FlipAxis::Vertical,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// List built-in formation templates
    Templates,

    /// Validate formations (rosters of all given formations are combined)
    Validate {
        /// Template id (repeatable)
        #[arg(long = "template")]
        templates: Vec<String>,

        /// Formation JSON file (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },

    /// Print a formation as JSON
    Export {
        /// Template id
        #[arg(long, conflicts_with = "file")]
        template: Option<String>,

        /// Formation JSON file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Mirror the formation before printing
        #[arg(long, value_enum)]
        flip: Option<Axis>,
    },

    /// Import a formation JSON file into the custom formation store
    Import {
        /// Formation store directory
        #[arg(long)]
        store: PathBuf,

        /// Formation JSON file
        file: PathBuf,
    },

    /// Save a template as a custom formation
    Save {
        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        template: String,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        flip: Option<Axis>,
    },

    /// List custom formations
    Customs {
        #[arg(long)]
        store: PathBuf,
    },

    /// Interpolated player positions of a play at a time
    Interpolate {
        /// Play sequence JSON file
        #[arg(long)]
        play: PathBuf,

        /// Time in ms
        #[arg(long)]
        at: f64,
    },

    /// Phase boundaries of a play
    Phases {
        #[arg(long)]
        play: PathBuf,
    },

    /// Play a sequence start to finish and report sampled frames
    Simulate {
        #[arg(long)]
        play: PathBuf,

        /// Playback rate
        #[arg(long, default_value_t = 1.0)]
        rate: f64,

        /// Sample every N frames
        #[arg(long, default_value_t = 30)]
        every: usize,
    },

    /// Depth, length and timing of a route, points as "x,y;x,y;..."
    Route {
        #[arg(long)]
        points: String,
    },

    /// JSON schema of the formation export format
    Schema,
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(feature = "cli")]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn single_source(template: Option<String>, file: Option<PathBuf>) -> Result<FormationSource> {
    match (template, file) {
        (Some(id), None) => Ok(FormationSource::Template(id)),
        (None, Some(path)) => Ok(FormationSource::File(path)),
        _ => bail!("Give exactly one of --template or --file"),
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = playbook_cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Templates => {
            for row in playbook_cli::template_summaries() {
                println!(
                    "{:<16} {:<18} {:<10} {:<16} {} players",
                    row.id,
                    row.name,
                    row.formation_type,
                    row.personnel.unwrap_or_default(),
                    row.players
                );
            }
        }

        Commands::Validate { templates, files } => {
            let sources: Vec<_> = templates
                .into_iter()
                .map(FormationSource::Template)
                .chain(files.into_iter().map(FormationSource::File))
                .collect();
            let report = playbook_cli::validate_formations(&sources)?;
            print_json(&report)?;
            if !report.valid {
                std::process::exit(2);
            }
        }

        Commands::Export { template, file, flip } => {
            let source = single_source(template, file)?;
            let formation = match flip {
                Some(axis) => playbook_cli::flip_formation(&source, axis.into())?,
                None => playbook_cli::resolve_formation(&source)?,
            };
            print_json(&formation)?;
        }

        Commands::Import { store, file } => {
            let formation = playbook_cli::import_formation(&store, &file)?;
            println!("Imported '{}' as {}", formation.name, formation.id);
        }

        Commands::Save { store, template, name, flip } => {
            let formation = playbook_cli::save_custom(&store, &template, &name, flip.map(Into::into))?;
            println!("Saved '{}' as {}", formation.name, formation.id);
        }

        Commands::Customs { store } => {
            for formation in playbook_cli::list_custom(&store)? {
                println!("{:<48} {:<24} {}", formation.id, formation.name, formation.formation_type.as_str());
            }
        }

        Commands::Interpolate { play, at } => {
            let play = playbook_cli::read_play(&play)?;
            print_json(&playbook_cli::interpolate_play(&play, at))?;
        }

        Commands::Phases { play } => {
            let play = playbook_cli::read_play(&play)?;
            print_json(&playbook_cli::phase_marks(&play, &config))?;
        }

        Commands::Simulate { play, rate, every } => {
            let play = playbook_cli::read_play(&play)?;
            let report = playbook_cli::simulate_play(play, &config, rate, every)?;
            print_json(&report)?;
        }

        Commands::Route { points } => {
            let points = playbook_cli::parse_points(&points)?;
            print_json(&playbook_cli::route_report(points, &config)?)?;
        }

        Commands::Schema => print_json(&playbook_cli::formation_schema()?)?,
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("playbook CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
