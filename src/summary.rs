use analytics::{Comparison, PerformanceReport};
use backtester::{PeriodWarning, PortfolioSnapshot};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn metric_rows(report: &PerformanceReport) -> [(&'static str, String); 6] {
    [
        ("Trading days", report.observations.to_string()),
        ("Total return", pct(report.total_return)),
        ("Annualized return", pct(report.annualized_return)),
        ("Annualized volatility", pct(report.annualized_volatility)),
        ("Sharpe ratio", ratio(report.sharpe_ratio)),
        ("Max drawdown", pct(report.max_drawdown)),
    ]
}

/// Strategy metrics, side by side with the benchmark when one was compared.
pub fn performance_table(
    strategy: &PerformanceReport,
    comparison: Option<&Comparison>,
    benchmark: Option<&str>,
) -> Table {
    let mut table = table();

    match comparison {
        Some(cmp) => {
            table.set_header(vec!["Metric", "Strategy", benchmark.unwrap_or("Benchmark")]);
            for ((name, s), (_, b)) in metric_rows(&cmp.strategy).into_iter().zip(metric_rows(&cmp.benchmark)) {
                table.add_row(vec![name.to_string(), s, b]);
            }
            table.add_row(vec!["Excess total return".to_string(), pct(cmp.excess_total_return), String::new()]);
            table.add_row(vec![
                "Excess annualized return".to_string(),
                pct(cmp.excess_annualized_return),
                String::new(),
            ]);
            table.add_row(vec!["Tracking error".to_string(), pct(cmp.tracking_error), String::new()]);
            table.add_row(vec!["Information ratio".to_string(), ratio(cmp.information_ratio), String::new()]);
        }
        None => {
            table.set_header(vec!["Metric", "Strategy"]);
            for (name, value) in metric_rows(strategy) {
                table.add_row(vec![name.to_string(), value]);
            }
        }
    }

    table
}

/// The portfolio chosen at the last rebalance.
pub fn holdings_table(snapshot: &PortfolioSnapshot) -> Table {
    let mut table = table();
    table.set_header(vec![
        Cell::new(format!("Holdings from {}", snapshot.rebalance_date)),
        Cell::new("Score"),
        Cell::new("Weight"),
    ]);
    for ranked in &snapshot.ranked {
        let weight = snapshot.portfolio.weight(&ranked.instrument).unwrap_or(0.0);
        table.add_row(vec![ranked.instrument.clone(), format!("{:.3}", ranked.score), pct(weight)]);
    }
    if snapshot.ranked.is_empty() {
        table.add_row(vec!["(cash)".to_string(), String::new(), String::new()]);
    }
    table
}

pub fn warnings_table(warnings: &[PeriodWarning]) -> Table {
    let mut table = table();
    table.set_header(vec!["Period", "Kind", "Instrument", "Message"]);
    for w in warnings {
        table.add_row(vec![
            format!("{} .. {}", w.period.start, w.period.end),
            w.kind.to_string(),
            w.instrument.clone().unwrap_or_default(),
            w.message.clone(),
        ]);
    }
    table
}
