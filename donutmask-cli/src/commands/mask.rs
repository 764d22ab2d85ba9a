//! Mask command - displace the points of a GeoJSON file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use donutmask::config::ConfigFile;
use donutmask::coord::Crs;
use donutmask::masking::{MaskingEngine, UnmaskablePoint};
use donutmask::metrics::MetricsReport;
use donutmask::telemetry::RunStats;
use donutmask::{Analysis, AnalysisOutcome};

use super::common::{load_settings, CrsArg};
use crate::error::CliError;
use crate::geojson;

/// Arguments for the mask command.
#[derive(Debug, Args)]
pub struct MaskArgs {
    /// GeoJSON FeatureCollection of Point features to mask
    #[arg(short, long)]
    pub input: PathBuf,

    /// GeoJSON FeatureCollection of Polygon/MultiPolygon boundaries
    #[arg(short, long)]
    pub regions: Option<PathBuf>,

    /// Minimum displacement in meters
    #[arg(long)]
    pub min: Option<f64>,

    /// Maximum displacement in meters
    #[arg(long)]
    pub max: Option<f64>,

    /// Compare DBSCAN clusters before and after masking with this radius in meters
    #[arg(long)]
    pub bandwidth: Option<f64>,

    /// Minimum neighbourhood size of a DBSCAN core point
    #[arg(long)]
    pub min_points: Option<usize>,

    /// Draws allowed per point before giving up on it
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seed for a reproducible run (default: fresh OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Mask points on all CPU cores
    #[arg(long)]
    pub parallel: bool,

    /// Stop after this many seconds, reporting unfinished points
    #[arg(long)]
    pub time_budget: Option<u64>,

    /// CRS of the input points and regions
    #[arg(long, value_enum, default_value = "wgs84")]
    pub source_crs: CrsArg,

    /// CRS of the written masked points
    #[arg(long, value_enum)]
    pub display_crs: Option<CrsArg>,

    /// Write masked points to this GeoJSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the metrics report to this JSON file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Settings file (default: ~/.donutmask/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the mask command.
pub fn run(args: MaskArgs) -> Result<(), CliError> {
    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&args, &mut settings);
    let masking_config = settings.to_masking_config()?;
    let cluster_config = settings.to_cluster_config()?;

    let source_crs = Crs::from(args.source_crs);
    let points = geojson::read_points(&args.input, source_crs)?;
    info!(path = %args.input.display(), points = points.len(), "Loaded points");

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, finishing current points...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let mut engine = MaskingEngine::new(masking_config)?.with_cancellation(cancel);
    if let Some(path) = &args.regions {
        let regions = geojson::read_regions(path, source_crs)?;
        info!(path = %path.display(), regions = regions.len(), "Loaded regions");
        engine = engine.with_regions(Arc::new(regions));
    }

    let mut analysis = Analysis::new(engine);
    if let Some(config) = cluster_config {
        analysis = analysis.with_clustering(config)?;
    }

    let outcome = analysis.run(&points)?;
    print_summary(&outcome);

    if let Some(path) = &args.output {
        geojson::write_json(path, &geojson::masked_collection(&points, &outcome.run))?;
        println!("Masked points written to {}", path.display());
    }
    if let Some(path) = &args.report {
        write_report(path, &outcome)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// CLI flags take precedence over the settings file.
fn apply_overrides(args: &MaskArgs, settings: &mut ConfigFile) {
    if let Some(min) = args.min {
        settings.masking.min_distance_m = min;
    }
    if let Some(max) = args.max {
        settings.masking.max_distance_m = max;
    }
    if let Some(attempts) = args.max_attempts {
        settings.masking.max_attempts_per_point = attempts;
    }
    if let Some(bandwidth) = args.bandwidth {
        settings.clustering.enabled = true;
        settings.clustering.bandwidth_m = Some(bandwidth);
    }
    if let Some(min_points) = args.min_points {
        settings.clustering.min_points = min_points;
    }
    if args.parallel {
        settings.run.parallel = true;
    }
    if args.seed.is_some() {
        settings.run.seed = args.seed;
    }
    if args.time_budget.is_some() {
        settings.run.time_budget_secs = args.time_budget;
    }
    if let Some(crs) = args.display_crs {
        settings.run.display_crs = crs.into();
    }
}

fn print_summary(outcome: &AnalysisOutcome) {
    let run = &outcome.run;
    let stats = &run.stats;
    let total = run.masked.len() + run.unmaskable.len();

    println!();
    println!(
        "Masked {} of {} points in {:.2}s ({:.1} draws per point)",
        run.masked.len(),
        total,
        stats.elapsed.as_secs_f64(),
        stats.draws_per_point()
    );
    if run.cancelled {
        println!("Run was cancelled before all points were processed");
    }

    if let Some(report) = &outcome.report {
        println!(
            "Mean center displacement: {:.2} meters",
            report.displacement_display()
        );
        println!("Privacy rating: {}/100 (higher is better)", report.privacy_rating());
        if let Some(clusters) = &report.clusters {
            println!("Before masking: {}", clusters.before);
            println!("After masking: {}", clusters.after);
            println!("Clusters lost/added: {}", clusters.delta);
        }
    }

    if !run.unmaskable.is_empty() {
        println!();
        println!("Unmaskable points:");
        for point in &run.unmaskable {
            println!("  {}: {}", point.id, point.reason);
        }
    }
    println!();
}

/// JSON report; never contains coordinates or offsets.
#[derive(Serialize)]
struct ReportFile<'a> {
    metrics: Option<&'a MetricsReport>,
    stats: &'a RunStats,
    cancelled: bool,
    unmaskable: &'a [UnmaskablePoint],
}

fn write_report(path: &Path, outcome: &AnalysisOutcome) -> Result<(), CliError> {
    let report = ReportFile {
        metrics: outcome.report.as_ref(),
        stats: &outcome.run.stats,
        cancelled: outcome.run.cancelled,
        unmaskable: &outcome.run.unmaskable,
    };
    geojson::write_json(path, &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MaskArgs,
    }

    fn parse(argv: &[&str]) -> MaskArgs {
        TestCli::parse_from(std::iter::once("mask").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&[
            "--input",
            "points.geojson",
            "--min",
            "20",
            "--max",
            "80",
            "--bandwidth",
            "150",
            "--seed",
            "4",
            "--parallel",
            "--display-crs",
            "web-mercator",
        ]);
        let mut settings = ConfigFile::default();
        apply_overrides(&args, &mut settings);

        assert_eq!(settings.masking.min_distance_m, 20.0);
        assert_eq!(settings.masking.max_distance_m, 80.0);
        assert!(settings.clustering.enabled);
        assert_eq!(settings.clustering.bandwidth_m, Some(150.0));
        assert_eq!(settings.run.seed, Some(4));
        assert!(settings.run.parallel);
        assert_eq!(settings.run.display_crs, Crs::WebMercator);
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let args = parse(&["--input", "points.geojson"]);
        let mut settings = ConfigFile::default();
        settings.run.seed = Some(11);
        apply_overrides(&args, &mut settings);
        assert_eq!(settings.run.seed, Some(11));
        assert!(!settings.clustering.enabled);
        assert_eq!(args.source_crs, CrsArg::Wgs84);
    }
}
