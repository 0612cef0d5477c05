use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use tick_sched::{
    PolicyKind, Scheduler, Sim, SimConfig, SimReport,
    config::DEFAULT_HISTORY_TAIL,
    sim::Workload,
};

/// Tick-driven single-CPU scheduling simulator.
///
/// Generates a Bernoulli workload of short and long CPU-bound jobs that block
/// on I/O at random, runs it under the chosen dispatch policy and prints
/// response and turnaround statistics.
#[derive(Debug, Parser)]
struct Opts {
    /// Dispatch policy: fifo, round-robin or fair-share.
    #[clap(short = 'p', long, default_value = "fifo")]
    policy: String,

    /// Seed for both the workload and the I/O model.
    #[clap(short = 's', long, default_value = "0")]
    seed: u64,

    /// Length of the arrival window in ticks.
    #[clap(long, default_value = "500")]
    arrival_ticks: u64,

    /// Probability of a job arriving on each tick of the window.
    #[clap(long, default_value = "0.3")]
    p_arrival: f64,

    /// Probability that an arriving job is short.
    #[clap(long, default_value = "0.3")]
    p_short: f64,

    /// Quanta needed by a short job.
    #[clap(long, default_value = "2")]
    short_quanta: u64,

    /// Quanta needed by a long job.
    #[clap(long, default_value = "6")]
    long_quanta: u64,

    /// Per-tick probability that a job stays CPU bound, in [0, 1].
    #[clap(short = 'u', long, default_value = "0.8")]
    cpu_utilization: f64,

    /// Stop after this many ticks even if jobs remain.
    #[clap(short = 't', long, default_value = "10000")]
    max_ticks: u64,

    /// History entries kept per process in snapshots.
    #[clap(long, default_value_t = DEFAULT_HISTORY_TAIL)]
    history_tail: usize,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let loglevel = match opts.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };

    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        loglevel,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let policy: PolicyKind = opts
        .policy
        .parse()
        .with_context(|| format!("Invalid --policy {:?}", opts.policy))?;

    let workload = Workload {
        ticks: opts.arrival_ticks,
        p_arrival: opts.p_arrival,
        p_short: opts.p_short,
        short_quanta: opts.short_quanta,
        long_quanta: opts.long_quanta,
        cpu_utilization: opts.cpu_utilization,
        seed: opts.seed,
    };
    let jobs = workload.generate();
    info!("Generated {} jobs over {} ticks", jobs.len(), opts.arrival_ticks);

    let sched = Scheduler::from_config(&SimConfig {
        policy,
        seed: opts.seed,
        history_tail: opts.history_tail,
    });
    let mut sim = Sim::new(jobs, sched).context("Invalid workload")?;

    while !sim.all_jobs_completed() && sim.sched.now() < opts.max_ticks {
        let now = sim.sched.now();
        let events = sim
            .step()
            .with_context(|| format!("Simulation failed at t={now}"))?;
        for event in events {
            debug!("t={} {:?}", now, event);
        }
    }

    if !sim.all_jobs_completed() {
        info!("Stopped after {} ticks with jobs remaining", opts.max_ticks);
    }

    println!("{}", SimReport::from_sim(&sim));
    Ok(())
}
