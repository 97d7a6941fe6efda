mod czml;
mod predict;
mod run;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

use crate::predict::{parse_all, Satellite};
use crate::run::{ConvertOptions, RunReport, TIME_FORMAT};
use crate::web::{AppState, Config};

#[derive(Parser)]
#[command(name = "overpass")]
#[command(about = "Satellite pass computation and replay rendering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        config: Option<String>,
    },
    /// Compute passes for an elements file once
    Compute {
        elements: String,
        /// Run options as JSON, same fields as the `convert_options` form part
        #[arg(long, default_value = "{}")]
        options: String,
        #[arg(long)]
        config: Option<String>,
    },
    /// Validate an elements file
    Validate { elements: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()),
        Commands::Compute {
            elements,
            options,
            config,
        } => compute(&elements, &options, config.as_deref()),
        Commands::Validate { elements } => validate(&elements),
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    match Config::load(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

fn serve(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn compute(path: &str, options: &str, config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let text = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let run_config = match ConvertOptions::from_json(options).and_then(|o| o.into_run_config()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid options: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.ensure_directories() {
        eprintln!("Error creating directories: {}", e);
        return ExitCode::FAILURE;
    }

    match AppState::new(config).visibility_run(run_config).execute(&text) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &RunReport) {
    for satellite in &report.results.satellites {
        println!(
            "{} (NORAD {}): {} passes",
            satellite.name,
            satellite.norad_id,
            satellite.passes.len()
        );
        for pass in &satellite.passes {
            let peak = pass
                .samples
                .iter()
                .max_by(|a, b| a.elevation_deg.total_cmp(&b.elevation_deg));
            match peak {
                Some(p) => println!(
                    "  {} -> {} ({:.0} s)  max {:.1}° at az {:.1}°  {} samples",
                    pass.window.rise.format(TIME_FORMAT),
                    pass.window.set.format(TIME_FORMAT),
                    pass.window.duration_seconds(),
                    p.elevation_deg,
                    p.azimuth_deg,
                    pass.samples.len()
                ),
                None => println!(
                    "  {} -> {}  no samples",
                    pass.window.rise.format(TIME_FORMAT),
                    pass.window.set.format(TIME_FORMAT)
                ),
            }
        }
    }
    if let Some(document) = &report.document {
        println!("Replay document: {}", document);
    }
    for entry in &report.record.default {
        println!("Catalog document: {}", entry.path);
    }
}

fn validate(path: &str) -> ExitCode {
    let text = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sets = match parse_all(&text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Parsed {} element sets", sets.len());
    let mut failed = false;
    for (i, set) in sets.into_iter().enumerate() {
        match Satellite::from_set(set) {
            Ok(sat) => println!(
                "  {}: {} (NORAD {}, period {:.1} min)",
                i + 1,
                sat.name(),
                sat.norad_id(),
                sat.period_minutes()
            ),
            Err(e) => {
                println!("  {}: {}", i + 1, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
