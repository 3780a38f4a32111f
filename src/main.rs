use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;
use vm_manager::{ReplacementAlgorithm, SimConfig, Simulator};
use vmsim::{
    driver::{self, DriverError},
    trace::TraceReader,
};

#[derive(Parser)]
#[command(name = "vmsim")]
#[command(about = "Replay a memory reference trace through a demand-paged VM", long_about = None)]
struct Cli {
    /// Reference trace to replay
    #[arg(short = 'f', long)]
    trace: PathBuf,

    /// Number of physical frames
    #[arg(short = 'm', long, default_value_t = 16)]
    frames: usize,

    /// Number of swap slots
    #[arg(short = 's', long, default_value_t = 4096)]
    swap_slots: usize,

    /// Replacement algorithm: lru or clock
    #[arg(short = 'a', long, default_value_t = ReplacementAlgorithm::Lru)]
    algorithm: ReplacementAlgorithm,

    /// Seed for clock sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Print the page directory after the run
    #[arg(long)]
    dump: bool,

    /// Name of the swap image
    #[arg(long)]
    swap_name: Option<String>,
}

fn run(cli: Cli) -> Result<(), DriverError> {
    let mut config = SimConfig {
        frame_count: cli.frames,
        swap_slots: cli.swap_slots,
        algorithm: cli.algorithm,
        seed: cli.seed,
        ..SimConfig::default()
    };
    if let Some(name) = cli.swap_name {
        config.swap_name = name;
    }

    let mut sim = Simulator::init(config)?;
    let trace = TraceReader::open(&cli.trace)?;
    let replay = driver::replay(&mut sim, trace)?;

    if cli.dump {
        let stdout = io::stdout();
        sim.dump_page_directory(&mut stdout.lock())?;
    }
    print!("{}", replay.counters);
    if replay.stamp_mismatches > 0 {
        error!(
            "{} references landed in a frame holding another page",
            replay.stamp_mismatches
        );
    }
    sim.teardown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
