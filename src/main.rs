use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;

use irarc_rust_reconfiguration::domain::config::ReconfigurationConfig;
use irarc_rust_reconfiguration::domain::decoder::plan::{ReconfigurationResult, ReconfigurationStatus};
use irarc_rust_reconfiguration::domain::utils::report::write_slot_plan;
use irarc_rust_reconfiguration::{logger, reconfigure_from_file};

#[derive(Parser)]
#[command(name = "irarc")]
#[command(version, about = "Incremental slot reconfiguration with minimum disruption")]
struct Cli {
    /// Problem instance (links and connections) as JSON
    #[arg(long)]
    problem: String,

    /// Optional run configuration as JSON
    #[arg(long)]
    config: Option<String>,

    /// Solver time limit in seconds, overrides the configuration file
    #[arg(long)]
    time_limit: Option<f64>,

    /// Write the slot plan as CSV to this file
    #[arg(long)]
    report: Option<String>,

    /// Print the full result as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init();

    let config = match &cli.config {
        Some(path) => ReconfigurationConfig::from_file(path).with_context(|| format!("Failed to load configuration '{}'", path))?,
        None => ReconfigurationConfig::default(),
    }
    .with_time_limit(cli.time_limit);

    let (topology, result) = reconfigure_from_file(&cli.problem, config).with_context(|| format!("Failed to reconfigure '{}'", cli.problem))?;

    if let Some(path) = &cli.report {
        let file = File::create(path).with_context(|| format!("Failed to create report '{}'", path))?;
        write_slot_plan(file, &topology, &result)?;
        log::info!("Slot plan written to '{}'.", path);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn print_summary(result: &ReconfigurationResult) {
    let status = match result.status {
        ReconfigurationStatus::Optimal => result.status.to_string().green().bold(),
        ReconfigurationStatus::TimedOut => result.status.to_string().yellow().bold(),
        ReconfigurationStatus::Infeasible | ReconfigurationStatus::Unbounded => result.status.to_string().red().bold(),
    };
    println!("Status: {}", status);

    let Some(objective) = result.objective_value else {
        return;
    };

    println!("Objective: {:.6}", objective);
    let disrupted: Vec<String> = result.disruptions.iter().map(|id| id.to_string()).collect();
    println!("Disruptions ({}): {}", disrupted.len(), disrupted.join(", "));

    for assignment in &result.assignments {
        println!(
            "  {} on {}: {} ({} carried over, {} fresh)",
            assignment.connection, assignment.link, assignment.slots, assignment.carried_over, assignment.fresh
        );
    }

    let order: Vec<String> = result.move_order.iter().map(|id| id.to_string()).collect();
    println!("Move order: {}", order.join(" -> ").cyan());
}
