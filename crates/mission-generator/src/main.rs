//! # Mission Generator CLI
//!
//! Generates one mission from a template file and writes it as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mission_domain::MissionTemplate;
use mission_generator::{GeneratorConfig, LogFormat, MissionGenerator};
use mission_library::Library;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mission-generator")]
#[command(about = "Generate a combat flight mission from a template")]
struct Args {
    /// Definition library bundle (JSON)
    #[arg(short, long, default_value = "data/library.json")]
    library: PathBuf,

    /// Mission template (JSON)
    #[arg(short, long, default_value = "data/template.json")]
    template: PathBuf,

    /// Override the template's RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output file; the mission is printed to stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print only the plain-text briefing
    #[arg(long)]
    briefing_only: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = GeneratorConfig::from_env();
    init_tracing(&config);

    let args = Args::parse();

    tracing::info!(
        version = mission_generator::VERSION,
        library = %args.library.display(),
        template = %args.template.display(),
        "Starting mission generator"
    );

    let library = Library::load(&args.library)
        .with_context(|| format!("loading library {}", args.library.display()))?;

    let raw = fs::read_to_string(&args.template)
        .with_context(|| format!("reading template {}", args.template.display()))?;
    let mut template: MissionTemplate = serde_json::from_str(&raw)
        .with_context(|| format!("parsing template {}", args.template.display()))?;
    if let Some(seed) = args.seed {
        template.seed = Some(seed);
    }

    let mission = MissionGenerator::new(&library, config).generate(&template)?;

    let rendered = if args.briefing_only {
        mission.briefing.plain_text.clone()
    } else {
        serde_json::to_string_pretty(&mission)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), seed = mission.seed, "Mission written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn init_tracing(config: &GeneratorConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
