#[cfg(test)]
mod tests {
    use crate::{
        Args, build_labels, has_header, read_points_and_csv, resolve_eps, write_labeled_csv,
        write_summary_csv,
    };
    use clap::Parser;
    use map_clusterizer::cluster::dbscan::{Cluster, db_scan};
    use map_clusterizer::cluster::distance::geo_metric;
    use map_clusterizer::cluster::point::GeoPoint;
    use std::fs;
    use std::path::PathBuf;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).expect("Failed to create test CSV");
        path
    }

    #[test]
    fn test_cluster_csv_end_to_end() {
        let test_csv = "latitude,longitude
40.7128,-74.0060
40.7130,-74.0062
40.7132,-74.0064
40.7500,-73.9900
40.7502,-73.9902
40.7504,-73.9904
40.8000,-73.9500
41.0000,-74.0000";

        let test_file = temp_csv("map_clusterize_end_to_end.csv", test_csv);

        let (points, records) = read_points_and_csv(&test_file).expect("Failed to read CSV");
        assert_eq!(points.len(), 8);
        assert_eq!(records.len(), 9);

        // Two dense downtown groups, two isolated points
        let (clusters, outliers) = db_scan(&points, 500.0, 3, geo_metric).unwrap();
        assert_eq!(clusters.len(), 2);
        let mut noise = outliers.clone();
        noise.sort();
        assert_eq!(noise, vec![6, 7]);

        let labels = build_labels(&clusters, points.len());
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1, -1, -1]);

        fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_read_points_without_header() {
        let test_file = temp_csv(
            "map_clusterize_no_header.csv",
            "40.7128,-74.0060\n41.0000,-74.0000\n",
        );

        let (points, records) = read_points_and_csv(&test_file).expect("Failed to read CSV");
        assert_eq!(points.len(), 2);
        assert_eq!(records.len(), 2);
        assert!(!has_header(&records));
        assert_eq!(points[0], GeoPoint::new(40.7128, -74.0060));

        fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_read_points_rejects_malformed_rows() {
        let test_file = temp_csv(
            "map_clusterize_malformed.csv",
            "latitude,longitude\n40.7128,not-a-number\n",
        );

        let err = read_points_and_csv(&test_file).unwrap_err();
        assert!(err.to_string().contains("invalid longitude"));

        fs::remove_file(&test_file).ok();
    }

    #[test]
    fn test_build_labels() {
        let clusters = vec![
            Cluster {
                id: 0,
                points: vec![1, 2],
            },
            Cluster {
                id: 1,
                points: vec![4, 5],
            },
        ];

        let labels = build_labels(&clusters, 6);
        assert_eq!(labels, vec![-1, 0, 0, -1, 1, 1]);
    }

    #[test]
    fn test_resolve_eps_explicit_wins() {
        let args = Args::parse_from(["map_clusterize", "--eps", "42.0", "--lat-delta", "1.0"]);
        assert_eq!(resolve_eps(&args).unwrap(), 42.0);
    }

    #[test]
    fn test_resolve_eps_from_viewport() {
        let args = Args::parse_from(["map_clusterize", "--lat-delta", "0.5"]);
        // a one-degree span divided by the default factor of 50
        let eps = resolve_eps(&args).unwrap();
        assert!((eps - 2223.9).abs() < 0.1, "got {}", eps);
    }

    #[test]
    fn test_resolve_eps_requires_a_radius_source() {
        let args = Args::parse_from(["map_clusterize"]);
        assert!(resolve_eps(&args).is_err());

        let args = Args::parse_from(["map_clusterize", "--lat-delta", "1.0", "--factor", "0"]);
        assert!(resolve_eps(&args).is_err());
    }

    #[test]
    fn test_write_labeled_csv_appends_cluster_column() {
        let records = vec![
            vec!["latitude".to_string(), "longitude".to_string()],
            vec!["40.7128".to_string(), "-74.0060".to_string()],
            vec!["41.0000".to_string(), "-74.0000".to_string()],
        ];
        let labels = vec![0, -1];

        let mut buf = Vec::new();
        write_labeled_csv(&mut buf, &records, &labels).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "latitude,longitude,cluster");
        assert_eq!(lines[1], "40.7128,-74.0060,0");
        assert_eq!(lines[2], "41.0000,-74.0000,-1");
    }

    #[test]
    fn test_write_summary_csv_covers_clusters_and_outliers() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.001, 0.0),
            GeoPoint::new(1.0, 1.0),
        ];
        let clusters = vec![Cluster {
            id: 0,
            points: vec![0, 1],
        }];
        let outliers = vec![2];

        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &points, &clusters, &outliers).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "cluster,size,center_latitude,center_longitude,radius_m"
        );
        assert!(lines[1].starts_with("0,2,0.0005,0,"));
        assert_eq!(lines[2], "-1,1,1,1,0");
    }
}
