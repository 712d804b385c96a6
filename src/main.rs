//! Viewport-adaptive DBSCAN clustering tool
//!
//! Reads geographic points from CSV files, clusters them with a radius given
//! directly in meters or derived from a map viewport, and writes the input
//! records annotated with a cluster label column or one summary row per
//! cluster.

use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use map_clusterizer::cluster::dbscan::{Cluster, db_scan};
use map_clusterizer::cluster::distance::geo_metric;
use map_clusterizer::cluster::geometry::aggregate;
use map_clusterizer::cluster::point::GeoPoint;
use map_clusterizer::cluster::threshold::{DEFAULT_SPAN_FACTOR, Region, Span, threshold};

#[cfg(test)]
mod main_test;

const OUTLIER_LABEL: i32 = -1;

#[derive(Parser)]
#[command(name = "map_clusterize")]
#[command(about = "Viewport-adaptive DBSCAN clustering over CSV points", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude columns
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Clustering radius in meters (overrides the viewport-derived radius)
    #[arg(short, long)]
    eps: Option<f64>,

    /// Viewport latitude span in degrees; the radius becomes the span
    /// ground distance divided by the factor
    #[arg(long)]
    lat_delta: Option<f64>,

    /// Viewport center latitude in degrees
    #[arg(long, default_value_t = 0.0)]
    center_lat: f64,

    /// Viewport center longitude in degrees
    #[arg(long, default_value_t = 0.0)]
    center_lon: f64,

    /// Divisor converting the viewport span distance into the radius
    #[arg(long, default_value_t = DEFAULT_SPAN_FACTOR)]
    factor: f64,

    /// Minimum points in a neighborhood (the point itself counts)
    #[arg(short = 'm', long, default_value_t = 1)]
    min_points: usize,

    /// Write one summary row per cluster instead of labeled points
    #[arg(short, long)]
    summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .init();
    }

    // Read points and CSV records from file (read once, reuse for output)
    let (points, csv_records) = match read_points_and_csv(&args.input) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error reading CSV: {}", e);
            std::process::exit(1);
        }
    };

    if points.is_empty() {
        eprintln!("No points found in CSV file");
        std::process::exit(1);
    }

    let eps = match resolve_eps(&args) {
        Ok(eps) => eps,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    debug!(
        points = points.len(),
        eps,
        min_points = args.min_points,
        "running clustering pass"
    );

    let (clusters, outliers) = match db_scan(&points, eps, args.min_points, geo_metric) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Clustering failed: {}", e);
            std::process::exit(1);
        }
    };

    debug!(
        clusters = clusters.len(),
        outliers = outliers.len(),
        "clustering pass complete"
    );

    let out: Box<dyn Write> = match &args.output {
        None => Box::new(std::io::stdout()),
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error creating {:?}: {}", path, e);
                std::process::exit(1);
            }
        },
    };

    let result = if args.summary {
        write_summary_csv(out, &points, &clusters, &outliers)
    } else {
        let labels = build_labels(&clusters, points.len());
        write_labeled_csv(out, &csv_records, &labels)
    };

    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }
}

/// CSV records type alias for readability
type CsvRecords = Vec<Vec<String>>;

/// Picks the clustering radius from the command line
///
/// An explicit `--eps` wins; otherwise the radius is derived from the
/// viewport described by `--lat-delta` and the center coordinates.
fn resolve_eps(args: &Args) -> Result<f64, String> {
    if let Some(eps) = args.eps {
        return Ok(eps);
    }
    if args.factor <= 0.0 {
        return Err(format!("--factor must be positive (got {})", args.factor));
    }
    match args.lat_delta {
        Some(latitude_delta) => {
            let region = Region::new(
                GeoPoint::new(args.center_lat, args.center_lon),
                Span {
                    latitude_delta,
                    longitude_delta: latitude_delta,
                },
            );
            Ok(threshold(&region, args.factor))
        }
        None => Err("either --eps or --lat-delta is required".to_string()),
    }
}

/// Reads points and CSV records from a file in a single pass
///
/// Expected format: `latitude,longitude` (header row is optional, extra
/// columns are preserved in the output)
///
/// # Returns
///
/// A tuple `(points, records)` where:
/// - `points` are parsed points for clustering
/// - `records` are raw CSV records for output preservation
fn read_points_and_csv(
    filename: &PathBuf,
) -> Result<(Vec<GeoPoint>, CsvRecords), Box<dyn std::error::Error>> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(file);

    let mut points = Vec::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result?;
        let record_vec: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        records.push(record_vec);
    }

    if records.is_empty() {
        return Ok((points, records));
    }

    let start_idx = if has_header(&records) { 1 } else { 0 };

    for (i, record) in records.iter().enumerate().skip(start_idx) {
        if record.len() < 2 {
            return Err(format!("row {}: expected latitude,longitude columns", i + 1).into());
        }

        let lat: f64 = record[0]
            .trim()
            .parse()
            .map_err(|e| format!("row {}: invalid latitude: {}", i + 1, e))?;
        let lon: f64 = record[1]
            .trim()
            .parse()
            .map_err(|e| format!("row {}: invalid longitude: {}", i + 1, e))?;
        points.push(GeoPoint::new(lat, lon));
    }

    Ok((points, records))
}

/// Determines whether the first record is a header row
fn has_header(records: &CsvRecords) -> bool {
    match records.first() {
        Some(first) if !first.is_empty() => first[0].parse::<f64>().is_err(),
        _ => false,
    }
}

/// Creates a labels array from clusters
///
/// `labels[i]` = cluster ID for point i, or -1 for outliers
fn build_labels(clusters: &[Cluster], num_points: usize) -> Vec<i32> {
    let mut labels = vec![OUTLIER_LABEL; num_points];

    for cluster in clusters {
        for &idx in &cluster.points {
            labels[idx] = cluster.id as i32;
        }
    }

    labels
}

/// Writes the input records with an appended cluster label column
///
/// Uses pre-read CSV records to preserve any additional columns
fn write_labeled_csv<W: Write>(
    out: W,
    csv_records: &CsvRecords,
    labels: &[i32],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);

    let start_idx = if has_header(csv_records) {
        let mut header = csv_records[0].clone();
        header.push("cluster".to_string());
        writer.write_record(&header)?;
        1
    } else {
        0
    };

    for (i, record) in csv_records.iter().enumerate().skip(start_idx) {
        let mut row = record.clone();
        row.push(labels[i - start_idx].to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes one summary row per cluster: id, size, center, and radius
///
/// Outliers are appended as singleton rows labeled -1 so the output still
/// covers every input point.
fn write_summary_csv<W: Write>(
    out: W,
    points: &[GeoPoint],
    clusters: &[Cluster],
    outliers: &[usize],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);

    writer.write_record([
        "cluster",
        "size",
        "center_latitude",
        "center_longitude",
        "radius_m",
    ])?;

    for cluster in clusters {
        let members: Vec<GeoPoint> = cluster.points.iter().map(|&i| points[i]).collect();
        let summary = aggregate(cluster.id, members);
        writer.write_record(&[
            cluster.id.to_string(),
            summary.members.len().to_string(),
            summary.center.latitude.to_string(),
            summary.center.longitude.to_string(),
            summary.radius.to_string(),
        ])?;
    }

    for &i in outliers {
        writer.write_record(&[
            OUTLIER_LABEL.to_string(),
            "1".to_string(),
            points[i].latitude.to_string(),
            points[i].longitude.to_string(),
            "0".to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
