//! Term window gating — decides whether a term has enough history.
//!
//! The data-sufficiency scan walks backward from the monitoring end time
//! one measurement interval at a time and looks for the sample closest to
//! each expected timestamp. A matched sample contributes the gap back to
//! the previous anchor, so contiguous samples add up to the span they
//! actually cover. The scan never errors: anything that cannot be
//! computed is reported as insufficient data.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use rightsize_core::{ConfigResult, ContainerResults, Term, TermName, WindowConfig};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Start of the monitoring window, `duration_in_days` before `end_time`.
///
/// Returns `None` when the end time is unknown or the subtraction cannot
/// be represented.
pub fn monitoring_start_time(
    end_time: Option<DateTime<Utc>>,
    duration_in_days: f64,
) -> Option<DateTime<Utc>> {
    let end_time = end_time?;
    end_time.checked_sub_signed(days(duration_in_days)?)
}

/// Maximum hours a term may report as observed.
pub fn max_duration_hours(term_name: &str) -> ConfigResult<f64> {
    let hours = match term_name.parse::<TermName>()? {
        TermName::Short => 24.0,
        TermName::Medium => 168.0,
        TermName::Long => 360.0,
        TermName::Fixed => 24.0,
    };
    Ok(hours)
}

/// Sum of the recorded interval durations, in hours, capped at the term's
/// maximum and rounded to two decimals.
pub fn capped_observed_duration(results: &ContainerResults, term_name: &str) -> ConfigResult<f64> {
    let max_hours = max_duration_hours(term_name)?;
    let observed_minutes: f64 = results
        .values()
        .map(|r| r.duration_in_minutes)
        .filter(|m| m.is_finite() && *m > 0.0)
        .sum();
    let hours = (observed_minutes / 60.0).min(max_hours);
    Ok((hours * 100.0).round() / 100.0)
}

/// Evaluates data sufficiency for terms using the configured tolerance
/// and buffer.
#[derive(Debug, Clone)]
pub struct WindowEvaluator {
    settings: WindowConfig,
}

impl WindowEvaluator {
    pub fn new(settings: WindowConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &WindowConfig {
        &self.settings
    }

    /// Whether `results` cover at least the term's threshold, less the
    /// configured buffer, walking back from `monitoring_end_time`.
    pub fn has_minimum_data(
        &self,
        results: &ContainerResults,
        term: &Term,
        monitoring_end_time: DateTime<Utc>,
        measurement_duration_minutes: f64,
    ) -> bool {
        if results.is_empty() {
            return false;
        }

        let Some(covered) = self.coverage_minutes(
            results,
            term,
            monitoring_end_time,
            measurement_duration_minutes,
        ) else {
            warn!(
                term = %term.name,
                end = %monitoring_end_time,
                measurement_duration_minutes,
                "coverage scan failed, treating term as insufficient"
            );
            return false;
        };

        let required = term.threshold_in_days * 24.0 * 60.0 - self.settings.buffer_minutes;
        debug!(
            term = %term.name,
            covered_minutes = covered,
            required_minutes = required,
            "coverage scan complete"
        );
        covered >= required
    }

    fn coverage_minutes(
        &self,
        results: &ContainerResults,
        term: &Term,
        end: DateTime<Utc>,
        measurement_duration_minutes: f64,
    ) -> Option<f64> {
        let step = minutes(measurement_duration_minutes)?;
        if step <= TimeDelta::zero() {
            return None;
        }
        let tolerance = TimeDelta::try_seconds(self.settings.tolerance_seconds)?;
        let window_start = end.checked_sub_signed(days(term.duration_in_days)?)?;

        let mut cursor = end;
        let mut covered = 0.0;
        while cursor > window_start {
            let lo = cursor.checked_sub_signed(tolerance)?;
            let hi = cursor.checked_add_signed(tolerance)?;
            let closest = results
                .range(lo..=hi)
                .map(|(ts, _)| *ts)
                .min_by_key(|ts| (*ts - cursor).num_milliseconds().abs());

            let next = match closest {
                Some(ts) => {
                    let offset = (cursor - ts).num_milliseconds() as f64 / MILLIS_PER_MINUTE;
                    covered += measurement_duration_minutes + offset;
                    ts.checked_sub_signed(step)?
                }
                None => cursor.checked_sub_signed(step)?,
            };
            // A late sample must not pull the cursor back up.
            cursor = if next < cursor {
                next
            } else {
                cursor.checked_sub_signed(step)?
            };
        }
        Some(covered)
    }
}

impl Default for WindowEvaluator {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

fn days(value: f64) -> Option<TimeDelta> {
    millis(value * MILLIS_PER_DAY)
}

fn minutes(value: f64) -> Option<TimeDelta> {
    millis(value * MILLIS_PER_MINUTE)
}

fn millis(value: f64) -> Option<TimeDelta> {
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rightsize_core::{ConfigError, IntervalResult, index_results};

    fn end_time() -> DateTime<Utc> {
        "2024-03-10T12:00:00Z".parse().unwrap()
    }

    fn make_result(end: DateTime<Utc>, duration_in_minutes: f64) -> IntervalResult {
        IntervalResult {
            interval_start: None,
            interval_end: end,
            duration_in_minutes,
            metrics: Default::default(),
        }
    }

    /// `count` one-minute samples ending exactly at `end`.
    fn minute_samples(end: DateTime<Utc>, count: i64) -> ContainerResults {
        index_results((0..count).map(|i| make_result(end - TimeDelta::minutes(i), 1.0)))
    }

    /// 90-minute threshold over a one-day window.
    fn test_term() -> Term {
        Term {
            name: TermName::Short,
            duration_in_days: 1.0,
            threshold_in_days: 0.0625,
            plots_datapoints: 4,
            plots_datapoint_delta_in_days: 0.25,
        }
    }

    #[test]
    fn start_time_subtracts_duration() {
        let start = monitoring_start_time(Some(end_time()), 1.0).unwrap();
        assert_eq!(start, "2024-03-09T12:00:00Z".parse::<DateTime<Utc>>().unwrap());

        let start = monitoring_start_time(Some(end_time()), 0.25).unwrap();
        assert_eq!(start, "2024-03-10T06:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn start_time_undetermined_without_end() {
        assert_eq!(monitoring_start_time(None, 1.0), None);
        assert_eq!(monitoring_start_time(Some(end_time()), f64::NAN), None);
    }

    #[test]
    fn empty_results_never_sufficient() {
        let evaluator = WindowEvaluator::default();
        let empty = ContainerResults::new();
        for term in [Term::short(), Term::medium(), Term::long(), test_term()] {
            assert!(!evaluator.has_minimum_data(&empty, &term, end_time(), 15.0));
        }
    }

    #[test]
    fn sufficient_at_exact_lower_bound() {
        // 90 min threshold − 1 min buffer = 89 min.
        let evaluator = WindowEvaluator::default();
        let results = minute_samples(end_time(), 89);
        assert!(evaluator.has_minimum_data(&results, &test_term(), end_time(), 1.0));
    }

    #[test]
    fn insufficient_one_minute_below_bound() {
        let evaluator = WindowEvaluator::default();
        let results = minute_samples(end_time(), 88);
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end_time(), 1.0));
    }

    #[test]
    fn overshoot_is_accepted() {
        let evaluator = WindowEvaluator::default();
        let results = minute_samples(end_time(), 600);
        assert!(evaluator.has_minimum_data(&results, &test_term(), end_time(), 1.0));
    }

    #[test]
    fn samples_within_tolerance_count() {
        // Every sample lands 20s early; re-anchoring keeps them all matched.
        let evaluator = WindowEvaluator::default();
        let end = end_time();
        let results = index_results((0..7).map(|i| {
            make_result(end - TimeDelta::minutes(15 * i) - TimeDelta::seconds(20), 15.0)
        }));
        let term = Term {
            threshold_in_days: 105.0 / 1440.0,
            ..test_term()
        };
        // 7 matches: 15 min each, plus 20 s on the first anchor.
        assert!(evaluator.has_minimum_data(&results, &term, end, 15.0));
    }

    #[test]
    fn samples_older_than_duration_ignored() {
        // A 144-minute window over 400 minutes of samples.
        let evaluator = WindowEvaluator::default();
        let results = minute_samples(end_time(), 400);
        let term = Term {
            duration_in_days: 0.1,
            threshold_in_days: 200.0 / 1440.0,
            plots_datapoints: 1,
            plots_datapoint_delta_in_days: 0.1,
            ..test_term()
        };
        let covered = evaluator
            .coverage_minutes(&results, &term, end_time(), 1.0)
            .unwrap();
        assert_eq!(covered, 144.0);
        assert!(!evaluator.has_minimum_data(&results, &term, end_time(), 1.0));
    }

    #[test]
    fn late_samples_within_tolerance_count() {
        // Every sample lands 20s after its grid point. The first match
        // loses 20s, the rest re-anchor onto the sample itself.
        let evaluator = WindowEvaluator::default();
        let end = end_time();
        let results = index_results((0..7).map(|i| {
            make_result(end - TimeDelta::minutes(15 * i) + TimeDelta::seconds(20), 15.0)
        }));
        let covered = evaluator
            .coverage_minutes(&results, &test_term(), end, 15.0)
            .unwrap();
        assert!((covered - (7.0 * 15.0 - 20.0 / 60.0)).abs() < 1e-9);
        assert!(evaluator.has_minimum_data(&results, &test_term(), end, 15.0));
    }

    #[test]
    fn late_sample_never_moves_cursor_forward() {
        // With a 15s step the sample 20s ahead would re-anchor the cursor
        // past its current position. It must be counted once and the walk
        // must still finish.
        let evaluator = WindowEvaluator::default();
        let end = end_time();
        let results = index_results([make_result(end + TimeDelta::seconds(20), 0.25)]);
        let term = Term {
            duration_in_days: 2.0 / 1440.0,
            ..test_term()
        };
        let covered = evaluator
            .coverage_minutes(&results, &term, end, 0.25)
            .unwrap();
        assert!((covered - (0.25 - 20.0 / 60.0)).abs() < 1e-9);
        assert!(!evaluator.has_minimum_data(&results, &term, end, 0.25));
    }

    #[test]
    fn samples_outside_tolerance_ignored() {
        // Every sample sits 45 s off the 15-minute grid, beyond the 30 s
        // tolerance, so nothing is ever matched.
        let evaluator = WindowEvaluator::default();
        let end = end_time();
        let results = index_results((0..200).map(|i| {
            make_result(end - TimeDelta::minutes(15 * i) - TimeDelta::seconds(45), 15.0)
        }));
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end, 15.0));
    }

    #[test]
    fn gaps_reduce_coverage() {
        let evaluator = WindowEvaluator::default();
        let end = end_time();
        // 100 samples with a 20-sample hole in the middle → 80 min.
        let results = index_results(
            (0..100)
                .filter(|i| !(40..60).contains(i))
                .map(|i| make_result(end - TimeDelta::minutes(i), 1.0)),
        );
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end, 1.0));
    }

    #[test]
    fn invalid_measurement_duration_is_insufficient() {
        let evaluator = WindowEvaluator::default();
        let results = minute_samples(end_time(), 200);
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end_time(), 0.0));
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end_time(), f64::NAN));
        assert!(!evaluator.has_minimum_data(&results, &test_term(), end_time(), -5.0));
    }

    #[test]
    fn max_duration_for_known_terms() {
        assert_eq!(max_duration_hours("short").unwrap(), 24.0);
        assert_eq!(max_duration_hours("medium").unwrap(), 168.0);
        assert_eq!(max_duration_hours("long").unwrap(), 360.0);
        assert_eq!(max_duration_hours("fixed").unwrap(), 24.0);
    }

    #[test]
    fn max_duration_unknown_term_is_config_error() {
        let err = max_duration_hours("yearly").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTerm(_)));
        assert!(max_duration_hours("").is_err());

        let err = max_duration_hours("short_term").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTerm(name) if name == "short_term"));
        let err = max_duration_hours(" long ").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTerm(name) if name == " long "));
    }

    #[test]
    fn observed_duration_sums_and_rounds() {
        let end = end_time();
        let results = index_results(
            (0..7).map(|i| make_result(end - TimeDelta::minutes(15 * i), 15.1)),
        );
        // 105.7 min → 1.7616 h → 1.76
        assert_eq!(capped_observed_duration(&results, "short").unwrap(), 1.76);
    }

    #[test]
    fn observed_duration_is_capped() {
        let end = end_time();
        let results = index_results(
            (0..200).map(|i| make_result(end - TimeDelta::minutes(15 * i), 15.0)),
        );
        // 50 h observed, short term caps at 24.
        assert_eq!(capped_observed_duration(&results, "short").unwrap(), 24.0);
        assert_eq!(capped_observed_duration(&results, "medium").unwrap(), 50.0);
        assert!(capped_observed_duration(&results, "bogus").is_err());
    }
}
