//! Stencil CLI - render template fragments from the command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use stencil::{Engine, EngineConfig, FixSuggestion, FragmentStore, Params, StencilError};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Stencil - logic-light template rendering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to stdout
    Render {
        /// Template name (filename stem)
        template: String,

        /// Fragment directory, repeatable; later directories win on
        /// name collisions
        #[arg(short, long = "dir", required = true)]
        dirs: Vec<PathBuf>,

        /// JSON file with render parameters
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// YAML engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List loaded fragment names
    List {
        /// Fragment directory, repeatable
        #[arg(short, long = "dir", required = true)]
        dirs: Vec<PathBuf>,

        /// YAML engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            template,
            dirs,
            params,
            config,
        } => render(&template, &dirs, params.as_deref(), config.as_deref()),
        Commands::List { dirs, config } => list(&dirs, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        let suggestion = e
            .downcast_ref::<StencilError>()
            .and_then(|err| err.fix_suggestion());
        if let Some(suggestion) = suggestion {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn render(
    template: &str,
    dirs: &[PathBuf],
    params_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let params = load_params(params_path)?;
    let store = FragmentStore::load(dirs, &config)?;
    let mut engine = Engine::new(store, config);
    let output = engine.render(template, &params)?;
    println!("{output}");
    Ok(())
}

fn list(dirs: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = FragmentStore::load(dirs, &config)?;
    for name in store.names() {
        println!("{name}");
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_params(path: Option<&Path>) -> Result<Params> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading params file {}", path.display()))?;
            let params = serde_json::from_str::<Params>(&text)
                .map_err(|e| StencilError::InvalidParams(e.to_string()))
                .with_context(|| format!("parsing params file {}", path.display()))?;
            Ok(params)
        }
        None => Ok(Params::new()),
    }
}
