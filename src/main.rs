use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use serde::Serialize;

use roll_nester::render;
use roll_nester::types::{EfficiencyResult, Model, Order, OrderLine};

#[derive(Parser)]
#[command(
    name = "roll_nester",
    about = "Fabric roll nesting and waste efficiency calculator"
)]
struct Cli {
    /// Read a full order as JSON from this file ('-' for stdin)
    #[arg(long, conflicts_with_all = ["lines", "widths"])]
    input: Option<String>,

    /// Order lines as WxD:qty in mm (e.g. 2400x2100:2 1100x1800:3)
    #[arg(long = "lines", num_args = 1..)]
    lines: Vec<String>,

    /// Candidate roll widths in mm (e.g. 1900 2050 2400 3000)
    #[arg(long = "widths", num_args = 0..)]
    widths: Vec<u32>,

    /// Quote identifier for the report
    #[arg(long, default_value = "Q-CLI")]
    quote_id: String,

    /// Product model: blinds or header
    #[arg(long, default_value = "blinds", value_parser = parse_model)]
    model: Model,

    /// Emit the full report as JSON
    #[arg(long)]
    json: bool,

    /// Show ASCII layout of the packed roll
    #[arg(long)]
    layout: bool,

    /// Log engine activity to stderr
    #[arg(long)]
    verbose: bool,
}

/// Report envelope around the engine result. `calc_id`, `version` and
/// `message` are caller-layer fields; the engine never generates them.
#[derive(Serialize)]
struct Report {
    calc_id: String,
    quote_id: String,
    results: Vec<RoundedLine>,
    totals: RoundedTotals,
    version: String,
    message: String,
}

#[derive(Serialize)]
struct RoundedLine {
    line_id: String,
    waste_factor_pct: f64,
    utilization: f64,
    used_length_mm: f64,
    blind_area_m2: f64,
    roll_area_m2: f64,
    waste_area_m2: f64,
    roll_width_mm: u32,
    pieces: usize,
    levels: usize,
}

#[derive(Serialize)]
struct RoundedTotals {
    eff_pct: f64,
    waste_pct: f64,
    total_area_m2: f64,
    total_used_area_m2: f64,
    total_waste_area_m2: f64,
    total_pieces: usize,
    total_levels: usize,
}

fn parse_model(s: &str) -> Result<Model, String> {
    match s {
        "blinds" => Ok(Model::Blinds),
        "header" => Ok(Model::Header),
        _ => Err(format!("invalid model '{}', expected: blinds or header", s)),
    }
}

fn parse_line(s: &str, idx: usize) -> Result<OrderLine, String> {
    let (dims, qty) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid line '{}', expected WxD:qty", s))?;
    let (w, d) = dims
        .split_once('x')
        .ok_or_else(|| format!("invalid dimensions '{}', expected WxD", dims))?;
    let width_mm = w
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let drop_mm = d
        .parse::<u32>()
        .map_err(|_| format!("invalid drop in '{}'", s))?;
    let qty = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok(OrderLine {
        line_id: format!("L{}", idx + 1),
        width_mm,
        drop_mm,
        qty,
        fabric_code: None,
        series: None,
    })
}

fn read_order(cli: &Cli) -> Result<Order, String> {
    if let Some(path) = &cli.input {
        let raw = if path == "-" {
            std::io::read_to_string(std::io::stdin()).map_err(|e| e.to_string())?
        } else {
            std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?
        };
        return serde_json::from_str(&raw).map_err(|e| format!("invalid order JSON: {}", e));
    }

    if cli.lines.is_empty() {
        return Err("no order given: use --input or --lines".to_string());
    }
    let lines = cli
        .lines
        .iter()
        .enumerate()
        .map(|(i, s)| parse_line(s, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Order {
        quote_id: cli.quote_id.clone(),
        model: cli.model,
        available_widths_mm: cli.widths.clone(),
        lines,
    })
}

/// Opaque 8-hex calculation id, unique enough for log correlation.
fn new_calc_id(quote_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    quote_id.hash(&mut hasher);
    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        now.subsec_nanos().hash(&mut hasher);
        now.as_secs().hash(&mut hasher);
    }
    format!("{:08x}", hasher.finish() as u32)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn build_report(quote_id: &str, result: &EfficiencyResult) -> Report {
    Report {
        calc_id: new_calc_id(quote_id),
        quote_id: quote_id.to_string(),
        results: result
            .results
            .iter()
            .map(|l| RoundedLine {
                line_id: l.line_id.clone(),
                waste_factor_pct: round2(l.waste_factor_pct),
                utilization: round2(l.utilization),
                used_length_mm: round2(l.used_length_mm),
                blind_area_m2: round3(l.blind_area_m2),
                roll_area_m2: round3(l.roll_area_m2),
                waste_area_m2: round3(l.waste_area_m2),
                roll_width_mm: l.roll_width_mm,
                pieces: l.pieces,
                levels: l.levels,
            })
            .collect(),
        totals: RoundedTotals {
            eff_pct: round2(result.totals.eff_pct),
            waste_pct: round2(result.totals.waste_pct),
            total_area_m2: round3(result.totals.total_area_m2),
            total_used_area_m2: round3(result.totals.total_used_area_m2),
            total_waste_area_m2: round3(result.totals.total_waste_area_m2),
            total_pieces: result.totals.total_pieces,
            total_levels: result.totals.total_levels,
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "ok".to_string(),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let order = read_order(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let packed = roll_nester::compute_layout(&order).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let report = build_report(&order.quote_id, &packed.result);

    if cli.json {
        let body = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        println!("{}", body);
    } else {
        for l in &report.results {
            println!(
                "{}: {} piece{}, blind {:.3} m2, waste {:.3} m2, utilization {:.2}%",
                l.line_id,
                l.pieces,
                if l.pieces == 1 { "" } else { "s" },
                l.blind_area_m2,
                l.waste_area_m2,
                l.utilization,
            );
        }
        println!(
            "Summary: roll {}mm, {}mm used, {} level{}, {:.2}% efficiency, {:.2}% waste",
            packed.layout.roll_width_mm,
            packed.layout.used_length_mm,
            report.totals.total_levels,
            if report.totals.total_levels == 1 { "" } else { "s" },
            report.totals.eff_pct,
            report.totals.waste_pct,
        );
    }

    if cli.layout {
        print!("{}", render::render_roll(&packed.layout, &packed.pieces));
    }
}
