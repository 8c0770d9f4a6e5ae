//! Run report generation and formatting
//!
//! **Purpose:** Summarize an optimizer run on the console and export the full
//! record as JSON.

use crate::search::sequencer::PhaseTotals;
use crate::search::{LocalSearchStats, SearchOutcome, SearchParams, Termination, TrajectoryResult};
use crate::Result;
use serde::{Deserialize, Serialize};
use slidewise_common::catalog::CatalogStats;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Complete record of one optimizer run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub session: SessionInfo,
    pub input: InputInfo,
    pub settings: SearchSettings,
    pub result: ResultSummary,
    /// Per-worker statistics, ordered by worker index
    pub trajectories: Vec<TrajectoryResult>,
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Run start (RFC 3339)
    pub timestamp: String,
    pub elapsed_seconds: f64,
    pub version: String,
    pub git_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    pub path: PathBuf,
    pub catalog: CatalogStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub time_limit_seconds: f64,
    pub workers: usize,
    pub seed: u64,
    pub max_iterations: Option<u64>,
    pub stall_limit: u64,
}

impl From<&SearchParams> for SearchSettings {
    fn from(params: &SearchParams) -> Self {
        Self {
            time_limit_seconds: params.time_limit.as_secs_f64(),
            workers: params.workers,
            seed: params.seed,
            max_iterations: params.max_iterations,
            stall_limit: params.stall_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub slides: usize,
    pub photos_shown: usize,
    pub total_score: u64,
    pub termination: Termination,
    pub phases: PhaseTotals,
    pub initial_local_search: LocalSearchStats,
    pub output_file: PathBuf,
}

impl RunReport {
    pub fn new(
        started_at: chrono::DateTime<chrono::Utc>,
        input_path: &Path,
        catalog: CatalogStats,
        params: &SearchParams,
        outcome: &SearchOutcome,
        photos_shown: usize,
        output_file: &Path,
    ) -> Self {
        Self {
            session: SessionInfo {
                timestamp: started_at.to_rfc3339(),
                elapsed_seconds: outcome.elapsed.as_secs_f64(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                git_hash: env!("GIT_HASH").to_string(),
            },
            input: InputInfo {
                path: input_path.to_path_buf(),
                catalog,
            },
            settings: SearchSettings::from(params),
            result: ResultSummary {
                slides: outcome.solution.len(),
                photos_shown,
                total_score: outcome.total_score,
                termination: outcome.termination,
                phases: outcome.phases,
                initial_local_search: outcome.initial_local_search,
                output_file: output_file.to_path_buf(),
            },
            trajectories: outcome.trajectories.clone(),
        }
    }

    /// Export report to a pretty-printed JSON file
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Import report from JSON file
    pub fn import_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let report: RunReport = serde_json::from_reader(file)?;
        Ok(report)
    }
}

/// CLI formatter for run results
pub struct CliFormatter;

impl CliFormatter {
    /// One-line catalog description
    ///
    /// Example: `Catalog: 4 photos (2 H, 2 V), 6 tags, 3 candidate slides`
    pub fn format_catalog(stats: &CatalogStats) -> String {
        format!(
            "Catalog: {} photos ({} H, {} V), {} tags, {} candidate slides",
            stats.photos, stats.horizontal, stats.vertical, stats.distinct_tags, stats.candidate_slides
        )
    }

    pub fn format_termination(termination: Termination) -> &'static str {
        match termination {
            Termination::EmptyUniverse => "nothing to sequence",
            Termination::Converged => "local optimum",
            Termination::Stalled => "no further improvement",
            Termination::IterationCap => "iteration cap reached",
            Termination::TimeLimit => "time limit reached",
            Termination::Cancelled => "cancelled",
        }
    }

    /// Per-worker table
    pub fn format_trajectories(trajectories: &[TrajectoryResult]) -> String {
        let mut output = String::new();
        if trajectories.is_empty() {
            return output;
        }

        output.push_str("┌────────┬────────────┬──────────┬──────────────┐\n");
        output.push_str("│ Worker │      Total │   Rounds │ Improvements │\n");
        output.push_str("├────────┼────────────┼──────────┼──────────────┤\n");
        for t in trajectories {
            output.push_str(&format!(
                "│ {:6} │ {:10} │ {:8} │ {:12} │\n",
                t.worker, t.total, t.rounds, t.improvements
            ));
        }
        output.push_str("└────────┴────────────┴──────────┴──────────────┘\n");
        output
    }

    /// Run summary printed to stdout
    pub fn format_summary(report: &RunReport) -> String {
        let mut output = String::new();
        let result = &report.result;

        output.push_str(&Self::format_catalog(&report.input.catalog));
        output.push('\n');
        output.push_str(&format!(
            "Slideshow: {} slides, {} photos, score {}\n",
            result.slides, result.photos_shown, result.total_score
        ));
        output.push_str(&format!(
            "Phases: greedy {} -> local search {} -> final {}\n",
            result.phases.construction, result.phases.local_search, result.phases.final_total
        ));
        output.push_str(&format!(
            "Stopped after {:.1}s: {}\n",
            report.session.elapsed_seconds,
            Self::format_termination(result.termination)
        ));
        output.push_str(&Self::format_trajectories(&report.trajectories));
        output.push_str(&format!("Written to {}\n", result.output_file.display()));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{optimize, CancelHandle};
    use slidewise_common::{Catalog, SlideUniverse};
    use std::time::Duration;

    fn sample_report() -> RunReport {
        let catalog = Catalog::parse("4\nH 2 cat dog\nH 2 dog bird\nV 1 cat\nV 1 bird\n").unwrap();
        let universe = SlideUniverse::generate(&catalog);
        let params = SearchParams::default()
            .with_time_limit(Duration::from_secs(10))
            .with_max_iterations(Some(10));
        let outcome = optimize(&universe, &params, &CancelHandle::new());
        let shown = outcome.solution.photo_groups(&universe).iter().map(Vec::len).sum();

        RunReport::new(
            chrono::Utc::now(),
            Path::new("sample.txt"),
            catalog.stats(),
            &params,
            &outcome,
            shown,
            Path::new("slideshow.sol"),
        )
    }

    #[test]
    fn test_report_fields() {
        let report = sample_report();
        assert_eq!(report.input.catalog.photos, 4);
        assert_eq!(report.input.catalog.candidate_slides, 3);
        assert!(report.result.total_score >= 1);
        assert_eq!(report.settings.max_iterations, Some(10));
        assert_eq!(report.trajectories.len(), 1);
    }

    #[test]
    fn test_export_and_import_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report();

        report.export_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"total_score\""));
        assert!(!text.contains("\"order\""), "slide orders stay out of the report");

        let imported = RunReport::import_json(&path).unwrap();
        assert_eq!(imported.result.total_score, report.result.total_score);
        assert_eq!(imported.result.termination, report.result.termination);
    }

    #[test]
    fn test_summary_mentions_score_and_output() {
        let report = sample_report();
        let summary = CliFormatter::format_summary(&report);
        assert!(summary.contains(&format!("score {}", report.result.total_score)));
        assert!(summary.contains("slideshow.sol"));
        assert!(summary.contains("Catalog: 4 photos (2 H, 2 V)"));
    }
}
