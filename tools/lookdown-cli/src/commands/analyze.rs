//! Concentration statistics and charts for a pose table.

use std::path::PathBuf;

use lookdown_analysis_core::{ConcentrationAnalyzer, ConcentrationReport, IdentityStats};
use lookdown_common::config::{AnalysisConfig, AppConfig, LookDownParsing};
use lookdown_common::error::LookdownError;
use lookdown_pose_model::table::{read_table, write_table, TableRow};
use lookdown_report_engine::ReportRenderer;

pub struct AnalyzeArgs {
    pub csv: PathBuf,
    pub timeline: Option<PathBuf>,
    pub bar_chart: Option<PathBuf>,
    pub cleaned_csv: Option<PathBuf>,
    pub json: bool,
    pub permissive_look_down: bool,
    pub nose_sentinel: Option<f64>,
    pub nose_tolerance: Option<f64>,
}

impl AnalyzeArgs {
    fn analysis_config(&self, base: &AnalysisConfig) -> AnalysisConfig {
        let mut config = base.clone();
        if self.permissive_look_down {
            config.look_down_parsing = LookDownParsing::Permissive;
        }
        if let Some(value) = self.nose_sentinel {
            config.nose_sentinel.value = value;
        }
        if let Some(tolerance) = self.nose_tolerance {
            config.nose_sentinel.tolerance = tolerance;
        }
        config
    }
}

pub fn run(args: AnalyzeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let csv = LookdownError::require_file(&args.csv)?;
    let analysis = args.analysis_config(&config.analysis);

    tracing::info!(path = %csv.display(), "Loading pose table");
    let rows = read_table(&csv)?;
    if rows.is_empty() {
        return Err(LookdownError::EmptyTable { path: csv }.into());
    }

    let report = ConcentrationAnalyzer::new(analysis).analyze(rows)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_preprocess(&report);
        println!();
        println!("Concentration Statistics:");
        for line in format_stats_table(&report.stats) {
            println!("{line}");
        }
    }

    if let Some(path) = &args.cleaned_csv {
        let rows: Vec<TableRow> = report.records.iter().map(TableRow::from).collect();
        write_table(path, &rows)?;
        println!("Cleaned table saved to: {}", path.display());
    }

    if report.stats.is_empty() {
        tracing::warn!("No tracked identity survived preprocessing; skipping charts");
        return Ok(());
    }

    if args.timeline.is_none() && args.bar_chart.is_none() {
        return Ok(());
    }

    let renderer = ReportRenderer::new(config.report.clone())?;
    if let Some(path) = &args.timeline {
        renderer.write_timeline(&report.timelines, path)?;
        println!("Timeline saved to: {}", path.display());
    }
    if let Some(path) = &args.bar_chart {
        renderer.write_bar_chart(&report.stats, path)?;
        println!("Bar chart saved to: {}", path.display());
    }

    Ok(())
}

fn print_preprocess(report: &ConcentrationReport) {
    let p = &report.preprocess;
    println!("Rows: {}", p.input_rows);
    println!("  Without tracking id: {}", p.missing_identity);
    println!("  Nose at (0,0): {}", p.nose_at_origin);
    println!("  Dropped for missing or sentinel nose: {}", p.invalid_nose);
    println!("  Without a look_down verdict: {}", p.missing_look_down);
    println!("  Retained: {}", p.retained);
}

fn format_stats_table(stats: &[IdentityStats]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>11}  {:>12}  {:>16}  {:>22}",
        "Tracking ID", "Total Frames", "Look Down Frames", "Concentration Rate (%)"
    )];
    lines.extend(stats.iter().map(|s| {
        format!(
            "{:>11}  {:>12}  {:>16}  {:>22.2}",
            s.tracking_id, s.total_frames, s.look_down_frames, s.concentration_rate
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AnalyzeArgs {
        AnalyzeArgs {
            csv: PathBuf::from("pose_output_selected.csv"),
            timeline: None,
            bar_chart: None,
            cleaned_csv: None,
            json: false,
            permissive_look_down: false,
            nose_sentinel: None,
            nose_tolerance: None,
        }
    }

    #[test]
    fn flags_override_analysis_config() {
        let mut a = args();
        a.permissive_look_down = true;
        a.nose_tolerance = Some(0.5);
        let config = a.analysis_config(&AnalysisConfig::default());
        assert_eq!(config.look_down_parsing, LookDownParsing::Permissive);
        assert_eq!(config.nose_sentinel.value, 0.0);
        assert_eq!(config.nose_sentinel.tolerance, 0.5);
    }

    #[test]
    fn stats_table_is_aligned() {
        let lines = format_stats_table(&[IdentityStats {
            tracking_id: 2,
            total_frames: 10,
            look_down_frames: 3,
            concentration_rate: 70.0,
        }]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len());
        assert!(lines[1].ends_with("70.00"));
    }

    #[test]
    fn cleaned_table_holds_only_aggregated_rows() {
        let dir = std::env::temp_dir().join("lookdown_test_cli_cleaned");
        let _ = std::fs::remove_dir_all(&dir);
        let cleaned = dir.join("cleaned.csv");

        let mut a = args();
        a.csv = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/sample-session/pose_output.csv");
        a.cleaned_csv = Some(cleaned.clone());
        run(a, &AppConfig::default()).unwrap();

        let rows = read_table(&cleaned).unwrap();
        assert_eq!(rows.len(), 21);
        assert!(rows.iter().all(|r| r.tracking_id.is_some() && r.look_down.is_some()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_table_is_reported() {
        let mut a = args();
        a.csv = std::env::temp_dir().join("lookdown_no_such_table.csv");
        let err = run(a, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("File not found"), "{err}");
    }
}
