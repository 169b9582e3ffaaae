mod config;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig, load_config};
use crate::input::{InputError, load_plates};
use crate::model::controls::ControlPolicy;
use crate::pipeline::stage1_parse::{ParseError, run_stage1};
use crate::pipeline::stage3_controls::run_stage3;
use crate::pipeline::stage4_qc::{QcError, Stage4Inputs, run_stage4};
use crate::pipeline::stage5_tables::{Stage5Inputs, run_stage5};
use crate::pipeline::stage6_report::{ReportPaths, Stage6Input, write_reports};
use crate::report::ReportError;

const DEFAULT_INPUT_DIR: &str = "Luminex Documents";

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Qc(#[from] QcError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Parser)]
#[command(
    name = "kira-luminexqc",
    version,
    about = "Aggregate multi-plate Luminex readouts and flag replicate-control QC"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse every plate, build the result tables and write them out.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding one `<protocol>_<plate><type>` folder per plate.
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,
    /// Output directory (default: parent of --input).
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    protocol: Option<String>,
    #[arg(long)]
    plate_count: Option<u32>,
    /// Plate-type suffix; repeat for several types.
    #[arg(long = "plate-type")]
    plate_types: Vec<String>,
    #[arg(long)]
    bead_cutoff: Option<u32>,
    #[arg(long)]
    cv_warning: Option<f64>,
    #[arg(long)]
    cv_error: Option<f64>,
    #[arg(long)]
    zsc_warning: Option<f64>,
    #[arg(long)]
    zsc_error: Option<f64>,
    /// Comma-separated control name substrings (switches to the explicit-list policy).
    #[arg(long, value_delimiter = ',')]
    control_names: Vec<String>,
    /// Pool control name variants on the first hyphen.
    #[arg(long)]
    pool_controls: bool,
    /// Emit one z-score detail row per plate for every control.
    #[arg(long)]
    perplate_controls: bool,
    /// Emit the diagnostic bead count sheet.
    #[arg(long)]
    bead_counts: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Run(args) => {
            let config = resolve_config(&args)?;
            logging::init_logging(config.verbose);
            let out_dir = resolve_output_dir(&args.input, args.out.as_deref());
            execute(&config, &args.input, &out_dir)?;
            Ok(())
        }
    }
}

fn resolve_config(args: &RunArgs) -> Result<PipelineConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(protocol) = &args.protocol {
        config.protocol = protocol.clone();
    }
    if let Some(n) = args.plate_count {
        config.plate_count = n;
    }
    if !args.plate_types.is_empty() {
        config.plate_types = args.plate_types.clone();
    }
    let t = &mut config.thresholds;
    if let Some(v) = args.bead_cutoff {
        t.bead_cutoff = v;
    }
    if let Some(v) = args.cv_warning {
        t.cv_warning = v;
    }
    if let Some(v) = args.cv_error {
        t.cv_error = v;
    }
    if let Some(v) = args.zsc_warning {
        t.zsc_warning = v;
    }
    if let Some(v) = args.zsc_error {
        t.zsc_error = v;
    }

    if !args.control_names.is_empty() {
        config.control_policy = ControlPolicy::ExplicitList {
            names: args.control_names.clone(),
        };
    }
    if args.pool_controls {
        match &mut config.control_policy {
            ControlPolicy::Substring { pool_variants } => *pool_variants = true,
            ControlPolicy::ExplicitList { .. } => {
                return Err(ConfigError::Invalid(
                    "--pool-controls only applies to the substring control policy".to_string(),
                ));
            }
        }
    }
    config.include_perplate_controls |= args.perplate_controls;
    config.include_bead_counts |= args.bead_counts;
    config.verbose |= args.verbose;

    config.validate()?;
    Ok(config)
}

/// Outputs land next to the input directory unless `--out` says otherwise.
fn resolve_output_dir(input_dir: &Path, out: Option<&Path>) -> PathBuf {
    if let Some(out) = out {
        return out.to_path_buf();
    }
    match input_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn execute(
    config: &PipelineConfig,
    input_dir: &Path,
    out_dir: &Path,
) -> Result<ReportPaths, RunError> {
    let plates = load_plates(input_dir, config)?;
    let stage1 = run_stage1(&plates, config)?;
    tracing::info!(
        "parsed {} plates: {} beads, {} samples",
        stage1.plates.len(),
        stage1.bead_names.len(),
        stage1.samples.len()
    );

    let stage3 = run_stage3(&stage1.samples, &config.control_policy, config.plate_count);
    let qc = run_stage4(&Stage4Inputs {
        samples: &stage1.samples,
        bead_names: &stage1.bead_names,
        groups: &stage3.groups,
        thresholds: &config.thresholds,
        include_perplate: config.include_perplate_controls,
    })?;

    let tables = run_stage5(&Stage5Inputs {
        bead_names: &stage1.bead_names,
        samples: &stage1.samples,
        bead_counts: &stage1.bead_counts,
        qc: &qc,
        ordinary: &stage3.ordinary,
        thresholds: &config.thresholds,
        include_perplate: config.include_perplate_controls,
        include_bead_counts: config.include_bead_counts,
    });

    let paths = write_reports(
        &Stage6Input {
            config,
            plates: &stage1.plates,
            bead_names: &stage1.bead_names,
            tables: &tables,
            qc: &qc,
            n_samples: stage1.samples.len(),
            n_ordinary: stage3.ordinary.len(),
            tool_version: env!("CARGO_PKG_VERSION"),
        },
        out_dir,
    )?;
    Ok(paths)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
