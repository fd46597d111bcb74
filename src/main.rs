use clap::{Parser, ValueEnum};
use heat_stencil::config::{RemainderPolicy, SimulationConfig};
use heat_stencil::data::Grid;
use heat_stencil::heat_error::HeatError;
use heat_stencil::io::{DEFAULT_OUTPUT_FILE, print_grid, save_grid};
use heat_stencil::solver;
use std::io;
use std::path::PathBuf;

/// Row-decomposed 2-D heat diffusion
#[derive(Parser)]
#[command(name = "heat-stencil", version)]
struct Cli {
    /// JSON file with simulation parameters (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid edge length N
    #[arg(long)]
    grid_size: Option<usize>,

    /// Number of time steps T
    #[arg(long)]
    steps: Option<usize>,

    /// Diffusion coefficient
    #[arg(long)]
    alpha: Option<f64>,

    /// Keep global row 0 at the source temperature for the whole run
    #[arg(long)]
    pin_source: bool,

    /// Handling of the rows left over when workers do not divide N
    #[arg(long, value_enum)]
    remainder: Option<RemainderArg>,

    /// Worker threads for the in-process backend
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Output file for the assembled grid
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Also echo the grid to stdout
    #[arg(long)]
    print: bool,

    /// Run as one rank of an mpirun launch
    #[cfg(feature = "mpi-support")]
    #[arg(long)]
    mpi: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RemainderArg {
    Truncate,
    AssignToLast,
    Reject,
}

impl From<RemainderArg> for RemainderPolicy {
    fn from(arg: RemainderArg) -> Self {
        match arg {
            RemainderArg::Truncate => RemainderPolicy::Truncate,
            RemainderArg::AssignToLast => RemainderPolicy::AssignToLast,
            RemainderArg::Reject => RemainderPolicy::Reject,
        }
    }
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig, HeatError> {
        let mut cfg = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(n) = self.grid_size {
            cfg.grid_size = n;
        }
        if let Some(t) = self.steps {
            cfg.time_steps = t;
        }
        if let Some(a) = self.alpha {
            cfg.alpha = a;
        }
        if self.pin_source {
            cfg.pin_source = true;
        }
        if let Some(r) = self.remainder {
            cfg.remainder = r.into();
        }
        Ok(cfg)
    }

    #[cfg(feature = "mpi-support")]
    fn run(&self, cfg: &SimulationConfig) -> Result<Option<Grid>, HeatError> {
        if self.mpi {
            let comm = heat_stencil::algs::communicator::MpiComm::new()?;
            return solver::run_rank(cfg, &comm);
        }
        solver::run_local(cfg, self.workers).map(Some)
    }

    #[cfg(not(feature = "mpi-support"))]
    fn run(&self, cfg: &SimulationConfig) -> Result<Option<Grid>, HeatError> {
        solver::run_local(cfg, self.workers).map(Some)
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = cli.simulation_config().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let grid = cli.run(&cfg).unwrap_or_else(|e| {
        eprintln!("Simulation error: {}", e);
        std::process::exit(1);
    });

    // only the coordinator holds a grid
    if let Some(grid) = grid {
        save_grid(&grid, &cli.output).unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });
        if cli.print {
            print_grid(&grid, io::stdout().lock()).unwrap_or_else(|e| {
                eprintln!("Output error: {}", e);
                std::process::exit(1);
            });
        }
    }
}
