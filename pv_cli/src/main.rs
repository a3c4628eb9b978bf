//! # Solarium CLI
//!
//! Runs the sizing pipeline on a JSON project record and prints either a
//! text summary followed by the JSON result, or the JSON result alone.
//!
//! ```text
//! pv_cli --sample > project.json
//! pv_cli --input project.json --financial tariff.json --json --pretty
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pv_core::{calculate, CalcError, CalcResult, CalculationResult, FinancialParams, ProjectInput};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project input file (JSON); the sample project is used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Financial parameter overrides (JSON); unspecified fields keep the input's values
    #[arg(short, long)]
    financial: Option<PathBuf>,

    #[arg(long, help = "Print the sample project input and exit", default_value_t = false)]
    sample: bool,

    #[arg(long, help = "Print only the JSON result envelope", default_value_t = false)]
    json: bool,

    #[arg(long, help = "Pretty-print JSON output", default_value_t = false)]
    pretty: bool,
}

/// Result wrapped with run metadata. The metadata stays out of the engine
/// so its output is identical for identical input.
#[derive(Serialize)]
struct RunEnvelope<'a> {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    engine_version: &'static str,
    result: &'a CalculationResult,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Overlay the fields present in `overrides` onto `base`.
fn merge_financial(base: &FinancialParams, overrides: serde_json::Value) -> CalcResult<FinancialParams> {
    let mut merged = serde_json::to_value(base)?;
    if let (Some(target), serde_json::Value::Object(fields)) = (merged.as_object_mut(), overrides) {
        target.extend(fields);
    }
    Ok(serde_json::from_value(merged)?)
}

fn load_input(args: &Args) -> CalcResult<ProjectInput> {
    let mut input = match &args.input {
        Some(path) => serde_json::from_str(&read_file(path)?)?,
        None => {
            debug!("no input file given, using the sample project");
            ProjectInput::sample()
        }
    };
    if let Some(path) = &args.financial {
        let overrides: serde_json::Value = serde_json::from_str(&read_file(path)?)?;
        input.financial = merge_financial(&input.financial, overrides)?;
    }
    Ok(input)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> CalcResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

fn print_summary(result: &CalculationResult) {
    println!("═══════════════════════════════════════");
    println!("  PV SIZING RESULTS");
    println!("═══════════════════════════════════════");
    println!();

    if let Some(report) = &result.report {
        let t = &report.technical;
        let e = &report.energy;
        let f = &report.financial;
        let p = &report.projection;

        println!("Customer: {} ({}, {})", report.customer.name, report.site.city, report.site.state);
        println!("Objective: {}", report.customer.objective);
        println!();
        println!("System:");
        println!("  Modules:   {} x {}", t.module_count, t.module);
        println!("  Inverter:  {}", t.inverter);
        println!("  Power:     {:.2} kWp", t.installed_power_kwp);
        println!("  Strings:   {} x {} modules", t.string_count, t.modules_per_string);
        println!("  Area:      {:.1} m²", t.occupied_area_m2);
        println!();
        println!("Energy:");
        println!("  Monthly:      {:.1} kWh", e.monthly_generation_kwh);
        println!("  Annual:       {:.0} kWh", e.annual_generation_kwh);
        println!("  Compensation: {:.1}%", e.compensation_pct);
        println!("  De-rated:     {:.1} kWh/month", e.derated.energy_month_kwh);
        println!();
        println!("Compatibility:");
        println!("  Inverter ratio: {:.2} {}", t.power_ratio, status_icon(report.compatibility.inverter.compatible));
        println!("  Strings:        {}", status_icon(report.compatibility.strings.compatible));
        println!("  Area:           {}", status_icon(report.compatibility.area.compatible()));
        println!();
        println!("Financial:");
        println!("  Investment:     R$ {:.2}", f.total_investment);
        println!("  Annual savings: R$ {:.2}", f.annual_savings);
        println!("  Payback:        {:.1} years (discounted {:.1})", f.simple_payback_years, p.discounted_payback_years);
        println!(
            "  Gross:          discounted payback {:.1} years, NPV R$ {:.2}",
            p.gross_discounted_payback_years, p.gross_npv
        );
        println!("  NPV:            R$ {:.2}", p.npv);
        println!(
            "  IRR:            {:.2}%{}",
            p.irr.value * 100.0,
            if p.irr.converged { "" } else { " (not converged)" }
        );
        println!("  CO₂ avoided:    {:.2} t/year", f.co2_avoided_t_per_year);
        println!();

        if !report.recommendations.is_empty() {
            println!("Recommendations:");
            for r in &report.recommendations {
                println!("  - {}", r);
            }
            println!();
        }
        if !report.suggestions.is_empty() {
            println!("Suggestions:");
            for s in &report.suggestions {
                println!("  - {}", s);
            }
            println!();
        }
    }

    for w in &result.warnings {
        println!("Warning: {}", w);
    }
    for e in &result.errors {
        println!("Error:   {}", e);
    }

    println!("═══════════════════════════════════════");
    println!("  RESULT: {}", if result.valid { "VALID" } else { "INVALID" });
    println!("═══════════════════════════════════════");
}

fn run(args: &Args) -> CalcResult<bool> {
    if args.sample {
        println!("{}", to_json(&ProjectInput::sample(), args.pretty)?);
        return Ok(true);
    }

    let input = load_input(args)?;
    let result = calculate(&input);
    let envelope = RunEnvelope {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION"),
        result: &result,
    };

    if args.json {
        println!("{}", to_json(&envelope, args.pretty)?);
    } else {
        print_summary(&result);
        println!();
        println!("JSON Output (for API use):");
        println!("{}", to_json(&envelope, true)?);
    }
    Ok(result.valid)
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(code = e.error_code(), "{}", e);
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::from(2)
        }
    }
}
