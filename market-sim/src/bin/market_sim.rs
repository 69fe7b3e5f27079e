use std::env;

use market_sim::{EventLog, MarketConfig, Simulation};

fn print_usage() {
    println!("market-sim [options]");
    println!("options:");
    println!("  --seed <n>       fix the random seed");
    println!("  --ticks <n>      number of ticks to simulate (default 50)");
    println!("  --config <path>  JSON config; flags above override it");
}

/// The argument following `flag`.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} needs a value"))
}

fn flag_number(args: &[String], i: usize, flag: &str) -> Result<u64, String> {
    let raw = flag_value(args, i, flag)?;
    raw.parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got {raw:?}"))
}

fn parse_config(args: &[String]) -> Result<MarketConfig, String> {
    let mut config = MarketConfig::default();
    let mut seed = None;
    let mut ticks = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => seed = Some(flag_number(args, i, "--seed")?),
            "--ticks" => ticks = Some(flag_number(args, i, "--ticks")?),
            "--config" => {
                let path = flag_value(args, i, "--config")?;
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("failed to read {path}: {e}"))?;
                config = MarketConfig::from_json(&json).map_err(|e| e.to_string())?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 2;
    }

    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(ticks) = ticks {
        config = config.with_horizon(ticks);
    }
    Ok(config)
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_config(args)?;
    let mut sim = Simulation::new(config).map_err(|e| e.to_string())?;
    let mut log = EventLog::new();
    sim.run(&mut log);
    for line in log.lines() {
        println!("{line}");
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return;
    }
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        print_usage();
        std::process::exit(1);
    }
}
