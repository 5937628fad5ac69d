//! Run projections for a batch of scenarios from a JSON input file
//!
//! Outputs the monthly projection series as CSV and prints per-scenario
//! summaries and milestones.

use anyhow::{Context, Result};
use clap::Parser;
use finsim::{ScenarioInput, ScenarioRunner, SimulationOutcome};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "project", about = "Project financial scenarios month by month")]
struct Args {
    /// JSON file holding one scenario input or an array of them
    input: PathBuf,

    /// Write the projection series to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the milestone table for each scenario
    #[arg(long)]
    milestones: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let inputs: Vec<ScenarioInput> = match serde_json::from_str(&raw) {
        Ok(batch) => batch,
        Err(_) => {
            let single: ScenarioInput = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", args.input.display()))?;
            vec![single]
        }
    };
    println!("Loaded {} scenario(s) from {}", inputs.len(), args.input.display());

    let start = Instant::now();
    let outcomes = ScenarioRunner::run_batch(&inputs).context("projection failed")?;
    println!("Projections complete in {:?}", start.elapsed());

    for outcome in &outcomes {
        print_summary(outcome);
        if args.milestones {
            print_milestones(outcome);
        }
    }

    if let Some(path) = &args.output {
        write_csv(path, &outcomes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote projection series to {}", path.display());
    }

    Ok(())
}

fn print_summary(outcome: &SimulationOutcome) {
    let s = &outcome.summary;
    println!("\n=== Scenario {} ({}) ===", outcome.scenario_id, outcome.scenario_name);
    println!("Months projected:   {}", s.total_months);
    println!("Start net worth:    {}", s.start_net_worth);
    println!("End net worth:      {}", s.end_net_worth);
    println!("Total growth:       {}", s.total_growth);
    if s.annualized_return_valid {
        println!("Annualized return:  {:.2}%", s.annualized_return * 100.0);
    } else {
        println!("Annualized return:  n/a (non-positive starting net worth)");
    }
    println!("Avg monthly growth: {:.3}%", s.avg_monthly_growth_rate * 100.0);
}

fn print_milestones(outcome: &SimulationOutcome) {
    println!("Milestones:");
    for m in &outcome.milestones {
        match (m.achieved_period, m.years_away) {
            (Some(period), Some(years)) => println!(
                "  {:<22} {} reached {} ({:.1}y, p={:.2})",
                m.name, m.target_amount, period, years, m.probability
            ),
            _ => println!("  {:<22} {} not reached", m.name, m.target_amount),
        }
    }
}

fn write_csv(path: &PathBuf, outcomes: &[SimulationOutcome]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "scenario_id",
        "scenario_name",
        "period",
        "net_worth",
        "income",
        "expenses",
        "interest",
    ])?;

    for outcome in outcomes {
        for point in &outcome.projections {
            writer.write_record([
                outcome.scenario_id.to_string(),
                outcome.scenario_name.clone(),
                point.period.to_string(),
                format!("{:.2}", point.net_worth.to_major_f64()),
                format!("{:.2}", point.total_income.to_major_f64()),
                format!("{:.2}", point.total_expenses.to_major_f64()),
                format!("{:.2}", point.total_interest.to_major_f64()),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
