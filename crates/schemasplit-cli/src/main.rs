use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use log::{error, info, warn};

use schemasplit_core::{Pipeline, RunReport};
use schemasplit_core::config::{self, CONFIG_FILE_NAME, SplitConfig};
use schemasplit_core::emit::MemorySink;
use schemasplit_core::error::RunError;
use schemasplit_core::pipeline::parse_keyword_list;

#[derive(Parser)]
#[command(
    name = "schemasplit",
    about = "Split an OpenAPI document into standalone JSON Schema files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one JSON Schema file per definition and per parameter list
    Split {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory. Its contents are replaced.
        #[arg(short, long)]
        output: PathBuf,

        /// Extra definition keywords, comma separated (e.g. components.responses)
        #[arg(short = 'p', long, value_name = "KEYWORDS")]
        extra_properties: Option<String>,

        /// Config file (defaults to .schemasplit.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// List the files that would be written without touching the output directory
        #[arg(long)]
        dry_run: bool,
    },

    /// Initialize a new schemasplit configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            input,
            output,
            extra_properties,
            config,
            dry_run,
        } => cmd_split(
            &input,
            &output,
            extra_properties.as_deref(),
            config,
            dry_run,
        ),

        Commands::Init { force } => cmd_init(force).map(|()| ExitCode::SUCCESS),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "schemasplit", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load the config file given on the command line, or the default one from
/// the current directory.
fn load_config(path: Option<PathBuf>) -> Result<SplitConfig> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    match config::load_config(&path).map_err(|e| anyhow::anyhow!(e))? {
        Some(cfg) => Ok(cfg),
        None if explicit => anyhow::bail!("config file {} not found", path.display()),
        None => Ok(SplitConfig::default()),
    }
}

fn cmd_split(
    input: &Path,
    output: &Path,
    extra_properties: Option<&str>,
    config: Option<PathBuf>,
    dry_run: bool,
) -> Result<ExitCode> {
    let mut cfg = load_config(config)?;
    if let Some(raw) = extra_properties {
        cfg.definition_keywords.extend(parse_keyword_list(raw));
    }
    let pipeline = Pipeline::new(cfg);

    let result = if dry_run {
        let mut sink = MemorySink::new();
        let result = pipeline.run_with_sink(input, &mut sink);
        for path in sink.files().keys() {
            println!("{}", output.join(path).display());
        }
        result
    } else {
        pipeline.run(input, output)
    };

    Ok(exit_code(result, output))
}

/// A run that loaded the document exits 0, even when conversion or
/// extraction stopped early. Load and prepare failures exit 1.
fn exit_code(result: Result<RunReport, RunError>, output: &Path) -> ExitCode {
    match result {
        Ok(report) => {
            log_report(&report, output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn log_report(report: &RunReport, output: &Path) {
    for skipped in &report.extract.skipped {
        info!("skipped {}: {}", skipped.location, skipped.reason);
    }
    if report.is_complete() {
        info!(
            "Successfully generated {} schemas in {}",
            report.extract.written.len(),
            output.display()
        );
    } else {
        warn!(
            "Schema generation did not complete; {} files were kept in {}",
            report.extract.written.len(),
            output.display()
        );
    }
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
