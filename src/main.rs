//! Race Lab CLI
//!
//! Runs the concurrent counter demonstration twice — unsynchronized first,
//! then mutex-guarded — and prints both reports.
//!
//! # Output Format
//!
//! Reports are written to stdout, one block per run:
//! run label, expected value, final counter value, and a verdict line
//! (`OK` or `FAIL: <n> increments lost to the race`).
//!
//! A stats line is written to stderr after each run:
//! `mode=… workers=… expected=… actual=… lost=… elapsed_ms=…`
//!
//! # Exit Codes
//!
//! - `0`: Both runs completed (a demonstrated lossy race is an outcome,
//!   not an error)
//! - `2`: Invalid arguments

use race_lab::{
    Experiment, ExperimentConfig, JitterSleep, MicroSleep, Pacing, StdoutSink, YieldHint,
};
use std::env;
use std::io;
use std::sync::Arc;

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS]

OPTIONS:
    --increments=<N>    Increments per worker (default: 1000)
    --workers=<N>       Concurrent workers (default: 2, minimum: 2)
    --pause-us=<N>      Fixed race-window sleep in microseconds
                        (default: 1; 0 means a bare scheduler yield)
    --jitter-us=<N>     Use a seeded jittered sleep up to N microseconds
                        instead of the fixed pause
    --seed=<N>          Jitter seed (default: 0x5eed, used with --jitter-us)
    --help, -h          Show this help message",
        exe.to_string_lossy()
    );
}

fn main() -> io::Result<()> {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "race-lab".into());

    let mut increments: u64 = 1000;
    let mut workers: usize = 2;
    let mut pause_us: u64 = 1;
    let mut jitter_us: Option<u64> = None;
    let mut seed: u64 = 0x5eed;

    for arg in args {
        let Some(flag) = arg.to_str() else {
            eprintln!("invalid argument: {:?}", arg);
            std::process::exit(2);
        };
        if let Some(value) = flag.strip_prefix("--increments=") {
            increments = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --increments value: {}", value);
                std::process::exit(2);
            });
            if increments == 0 {
                eprintln!("--increments must be >= 1");
                std::process::exit(2);
            }
            continue;
        }
        if let Some(value) = flag.strip_prefix("--workers=") {
            workers = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --workers value: {}", value);
                std::process::exit(2);
            });
            if workers < 2 {
                eprintln!("--workers must be >= 2");
                std::process::exit(2);
            }
            continue;
        }
        if let Some(value) = flag.strip_prefix("--pause-us=") {
            pause_us = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --pause-us value: {}", value);
                std::process::exit(2);
            });
            continue;
        }
        if let Some(value) = flag.strip_prefix("--jitter-us=") {
            let n: u64 = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --jitter-us value: {}", value);
                std::process::exit(2);
            });
            if n == 0 {
                eprintln!("--jitter-us must be >= 1 (use --pause-us=0 for no sleep)");
                std::process::exit(2);
            }
            jitter_us = Some(n);
            continue;
        }
        if let Some(value) = flag.strip_prefix("--seed=") {
            seed = value.parse().unwrap_or_else(|_| {
                eprintln!("invalid --seed value: {}", value);
                std::process::exit(2);
            });
            continue;
        }
        match flag {
            "--help" | "-h" => {
                print_usage(&exe);
                return Ok(());
            }
            other => {
                eprintln!("unknown argument: {}", other);
                print_usage(&exe);
                std::process::exit(2);
            }
        }
    }

    let pacing: Arc<dyn Pacing> = match jitter_us {
        Some(max) => Arc::new(JitterSleep::new(max, seed)),
        None if pause_us == 0 => Arc::new(YieldHint),
        None => Arc::new(MicroSleep::from_micros(pause_us)),
    };

    let experiment = Experiment::new(ExperimentConfig {
        increments_per_worker: increments,
        workers,
        pacing,
    })?;

    let sink = StdoutSink::new();
    let (unsafe_run, safe_run) = experiment.run_demo(&sink)?;
    eprintln!("{}", unsafe_run.stats_line());
    eprintln!("{}", safe_run.stats_line());

    Ok(())
}
