use anyhow::Context;
use clap::Parser;
use sjf_model::{
    PolicyKind, SchedEvent, SimConfig, SimError,
    sim::{Outcome, Sim, bernoulli_workload},
};
use std::{path::PathBuf, process::ExitCode};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sjf-sim", about = "Simulate shortest-job-first dispatch on virtual processors")]
struct Args {
    /// TOML file with the process table and run settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of processors
    #[arg(long)]
    cpus: Option<usize>,

    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Wall-clock milliseconds per simulated time unit (0 = no pacing)
    #[arg(long)]
    time_unit_ms: Option<u64>,

    /// Replace the table with a random workload spanning this many ticks
    #[arg(long)]
    random: Option<u64>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the dispatch timeline
    #[arg(long)]
    timeline: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            match err.downcast_ref::<SimError>() {
                Some(sim) if !sim.is_init() => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(cpus) = args.cpus {
        config.num_cpus = cpus;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(ms) = args.time_unit_ms {
        config.time_unit_ms = ms;
    }
    if let Some(ticks) = args.random {
        config.processes = bernoulli_workload(ticks, 0.3, 0.3, 2, 6, args.seed);
    }

    println!(
        "Multi-CPU {:?} scheduling: {} processes on {} processors",
        config.policy,
        config.processes.len(),
        config.num_cpus
    );

    let outcome = Sim::new(config).run()?;
    if args.timeline {
        print_timeline(&outcome);
    }
    println!("{}", outcome.report);

    Ok(())
}

fn print_timeline(outcome: &Outcome) {
    let name = |process: usize| outcome.records[process].name.as_str();
    for event in &outcome.events {
        match *event {
            SchedEvent::Dispatched { cpu, process, at } => {
                println!("t={at:<4} cpu{cpu} start {}", name(process))
            }
            SchedEvent::Completed { cpu, process, at } => {
                println!("t={at:<4} cpu{cpu} done  {}", name(process))
            }
            SchedEvent::IdleAdvance { cpu, from, to } => {
                println!("t={from:<4} cpu{cpu} idle until {to}")
            }
            SchedEvent::Stalled { .. } => {}
        }
    }
}
