use std::path::Path;

use rightsize_core::Term;
use rightsize_metrics::max_duration_hours;

pub fn run(config: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    println!(
        "{:<8} {:>10} {:>14} {:>7} {:>11} {:>10}",
        "TERM", "DAYS", "THRESHOLD_DAYS", "POINTS", "DELTA_DAYS", "MAX_HOURS"
    );
    for term in &config.terms {
        println!("{}", format_row(term)?);
    }
    Ok(())
}

fn format_row(term: &Term) -> anyhow::Result<String> {
    Ok(format!(
        "{:<8} {:>10} {:>14} {:>7} {:>11} {:>10}",
        term.name.as_str(),
        term.duration_in_days,
        term.threshold_in_days,
        term.plots_datapoints,
        term.plots_datapoint_delta_in_days,
        max_duration_hours(term.name.as_str())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_includes_max_hours() {
        let row = format_row(&Term::medium()).unwrap();
        let columns: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(columns, ["medium", "7", "2", "7", "1", "168"]);
    }
}
