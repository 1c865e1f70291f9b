//! Build Plate CLI
//!
//! Generate boards, inspect core zones and summarize seeded batches.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plate_core::board::SCRAP;
use plate_core::model::resolve_model_path;
use plate_core::{
    compute_core, generate_board, BatchSummary, BoardGenerator, BoardParams, BoardRequest,
    BoardResponse, CoreSizeRule, Geometry, GeneratorConfig, LazyModelSource, PowderCategory,
    ProbabilitySource, UniformSource,
};

#[derive(Parser)]
#[command(name = "plate")]
#[command(about = "Difficulty-calibrated build plate boards", long_about = None)]
struct Cli {
    /// Config preset; ignored when PLATE_CONFIG_PATH is set
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BoardArgs {
    #[arg(long, default_value_t = 7)]
    rows: usize,

    #[arg(long, default_value_t = 7)]
    cols: usize,

    /// Virgin or Recycled
    #[arg(long, default_value = "Virgin")]
    powder: String,

    /// Thermal annealing flag (0 or 1)
    #[arg(long, default_value_t = 0)]
    ta: u8,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long)]
    target_rate: Option<f64>,

    #[arg(long)]
    min_failures: Option<usize>,

    /// Model artifact (defaults to PLATE_MODEL_PATH or artifacts/scrap_model.json)
    #[arg(long, conflicts_with = "uniform")]
    model: Option<PathBuf>,

    /// Skip the model and use this probability everywhere
    #[arg(long)]
    uniform: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one board
    Generate {
        #[command(flatten)]
        board: BoardArgs,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the JSON payload instead of the ASCII board
        #[arg(long)]
        json: bool,
    },

    /// Print the core mask for a geometry
    Core {
        #[arg(long)]
        rows: usize,

        #[arg(long)]
        cols: usize,

        #[arg(long, value_enum, default_value_t = RuleArg::Tiered)]
        rule: RuleArg,
    },

    /// Generate many seeded boards in parallel and summarize them
    Stats {
        #[command(flatten)]
        board: BoardArgs,

        #[arg(long, default_value_t = 1000)]
        boards: u64,

        /// First seed; boards use consecutive seeds
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleArg {
    Tiered,
    Legacy,
}

impl From<RuleArg> for CoreSizeRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Tiered => CoreSizeRule::Tiered,
            RuleArg::Legacy => CoreSizeRule::LegacyTable,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(preset: Option<&str>) -> Result<GeneratorConfig> {
    if std::env::var_os(plate_core::config::CONFIG_PATH_ENV).is_some() {
        return Ok(GeneratorConfig::from_env()?);
    }
    Ok(match preset {
        Some(name) => GeneratorConfig::preset(name)?,
        None => GeneratorConfig::default(),
    })
}

fn source_for(args: &BoardArgs) -> Result<Box<dyn ProbabilitySource>> {
    if let Some(p) = args.uniform {
        if !(0.0..=1.0).contains(&p) {
            bail!("--uniform must be in [0, 1], got {p}");
        }
        return Ok(Box::new(UniformSource(p)));
    }
    let path = args.model.clone().unwrap_or_else(resolve_model_path);
    tracing::info!(path = %path.display(), "using model artifact");
    Ok(Box::new(LazyModelSource::new(path)))
}

fn request_for(args: &BoardArgs, seed: Option<u64>) -> BoardRequest {
    BoardRequest {
        rows: args.rows,
        cols: args.cols,
        powder: args.powder.clone(),
        ta: args.ta,
        temperature: args.temperature,
        target_rate: args.target_rate,
        min_failures: args.min_failures,
        seed,
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.preset.as_deref())?;

    match cli.command {
        Commands::Generate { board, seed, json } => {
            let generator = BoardGenerator::new(source_for(&board)?, config);
            let response = generate_board(&generator, &request_for(&board, seed))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_board(&response);
            }
        }

        Commands::Core { rows, cols, rule } => {
            let geometry = Geometry::new(rows, cols)?;
            let mask = compute_core(geometry.rows(), geometry.cols(), rule.into());
            for row in mask.to_rows() {
                let line: String = row.iter().map(|&c| if c { 'C' } else { '.' }).collect();
                println!("{line}");
            }
            println!("core cells: {}  non-core cells: {}", mask.count_true(), mask.count_false());
        }

        Commands::Stats { board, boards, seed } => {
            if boards == 0 {
                bail!("--boards must be at least 1");
            }
            let geometry = Geometry::new(board.rows, board.cols)?;
            let powder: PowderCategory = board.powder.parse()?;
            let annealed = plate_core::geometry::annealing_from_flag(board.ta)?;
            let defaults = &config.defaults;
            let params = BoardParams::new(
                geometry,
                powder,
                annealed,
                board.temperature.unwrap_or(defaults.temperature),
                board.target_rate,
                board.min_failures.unwrap_or(defaults.min_failures),
            )?;

            let generator = BoardGenerator::new(source_for(&board)?, config);
            let seeds: Vec<u64> = (0..boards).map(|i| seed.wrapping_add(i)).collect();
            let results = generator.generate_batch(&params, &seeds);
            if let Some(Err(err)) = results.iter().find(|r| r.is_err()) {
                return Err(err.clone()).context("batch generation failed");
            }

            let summary = BatchSummary::from_results(&results);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn print_board(response: &BoardResponse) {
    println!(
        "{}x{} {} ta={} transform={}",
        response.rows,
        response.cols,
        response.powder,
        response.ta,
        response.transform.as_str()
    );
    for (board_row, core_row) in response.board.iter().zip(&response.core) {
        let line: String = board_row
            .iter()
            .zip(core_row)
            .map(|(&cell, &core)| {
                let mark = if cell == SCRAP { '#' } else { '.' };
                if core == 1 {
                    format!("[{mark}]")
                } else {
                    format!(" {mark} ")
                }
            })
            .collect();
        println!("{line}");
    }
    println!(
        "forced={} mean_prob={:.3} target={} required={} seed={}",
        response.forced,
        response.mean_prob,
        response
            .target_rate
            .map(|t| format!("{t:.3}"))
            .unwrap_or_else(|| "-".to_string()),
        response.required_failures,
        response.generated_with_seed
    );
}
