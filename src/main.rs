//! tofkeys - diagnostic harness for the time-of-flight keyboard

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tofkeys::config::{self, TofkeysConfig};
use tofkeys::driver::{Driver, MemorySink, RunOptions, Tick};
use tofkeys::keyboard::{DetachedResetLine, Keyboard, ResetSequencer};
use tofkeys::sensors::{SensorChannel, SimulatedSensor};
use tofkeys::{telemetry, viz};
use tracing::warn;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor {
            config: config_path,
            ticks,
            json,
        } => {
            telemetry::init_tracing("info")?;
            let cfg = config::load_config(&config_path)?;

            if !json {
                println!("Monitoring {} simulated keys...", cfg.keyboard.channels);
                println!("  Poll interval: {} ms", cfg.poll.interval_ms);
                println!("  Glitch ratio: {}", cfg.keyboard.glitch_ratio);
                println!();
            }

            let mut driver = build_driver(&cfg)?;
            let mut sink = MemorySink::new(cfg.keyboard.channels);

            let stop = Arc::new(AtomicBool::new(false));
            let handler_stop = Arc::clone(&stop);
            ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))?;

            let mut options = RunOptions::new(cfg.poll.interval()).with_stop(stop);
            if let Some(ticks) = ticks {
                options = options.with_max_ticks(ticks);
            }

            driver.run(&mut sink, &options, |tick| {
                if json {
                    match serde_json::to_string(tick) {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!(error = %e, "unable to encode tick"),
                    }
                } else {
                    print_tick(tick);
                }
            })?;

            if !json {
                println!();
                print!("{}", driver.keyboard().range_report());
            }
        }

        Commands::Meter { config: config_path } => {
            // Keep log lines off the meter screen unless asked for
            telemetry::init_tracing("error")?;
            let cfg = config::load_config(&config_path)?;

            let mut driver = build_driver(&cfg)?;
            let mut sink = MemorySink::new(cfg.keyboard.channels);
            viz::run_meter(&mut driver, &mut sink, cfg.poll.interval())?;

            print!("{}", driver.keyboard().range_report());
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let kb = &cfg.keyboard;
                    println!("Configuration is valid!");
                    println!("  Channels: {}", kb.channels);
                    println!("  Sentinel bounds: min {} / max {}", kb.sentinel_min, kb.sentinel_max);
                    println!("  Precision: {} places", kb.precision);
                    println!(
                        "  Glitch filter: below {:.0}% of {:?}",
                        kb.glitch_ratio * 100.0,
                        kb.glitch_reference
                    );
                    println!(
                        "  Reset: {} us pulse, {} ms settle",
                        cfg.reset.pulse_us, cfg.reset.settle_ms
                    );
                    println!("  Poll interval: {} ms", cfg.poll.interval_ms);
                    println!(
                        "  Volume: first {:.0}% of travel, x{}",
                        cfg.volume.max_depth * 100.0,
                        cfg.volume.scale
                    );
                    println!("  Keys: {}", cfg.keys.len());
                    for (index, key) in cfg.keys.iter().enumerate() {
                        println!("    - key {} -> {:?}", index, key.notes());
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../tofkeys.example.yaml");

            let path = "tofkeys.yaml";
            if std::path::Path::new(path).exists() {
                println!("tofkeys.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created tofkeys.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Reset the (detached) multiplexer and bring up simulated sensors
fn build_driver(cfg: &TofkeysConfig) -> Result<Driver> {
    let mut reset = ResetSequencer::new(DetachedResetLine::new())
        .with_pulse(cfg.reset.pulse())
        .with_settle(cfg.reset.settle());

    let keyboard = Keyboard::bring_up(
        cfg.keyboard.channels,
        &cfg.keyboard.settings(),
        &mut reset,
        |channel| Ok(Box::new(SimulatedSensor::new(cfg.simulated(channel))) as Box<dyn SensorChannel>),
    )
    .context("Unable to set up the keyboard")?;

    Ok(Driver::new(keyboard, cfg.volume.pipeline())
        .with_press(cfg.press.detector())
        .with_keys(cfg.keys.clone()))
}

fn print_tick(tick: &Tick) {
    let levels: Vec<String> = tick.levels.iter().map(|l| format!("{:>5.2}", l)).collect();
    if tick.notes.is_empty() {
        println!("{:>5}  {}", tick.index, levels.join(" "));
    } else {
        println!("{:>5}  {}  notes {:?}", tick.index, levels.join(" "), tick.notes);
    }
}
