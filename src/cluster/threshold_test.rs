#[cfg(test)]
mod tests {
    use crate::cluster::distance::haversine;
    use crate::cluster::point::GeoPoint;
    use crate::cluster::threshold::{
        DEFAULT_SPAN_FACTOR, Region, Span, span_distance, threshold,
    };

    fn region(latitude_delta: f64) -> Region {
        Region::new(
            GeoPoint::new(0.0, 0.0),
            Span {
                latitude_delta,
                longitude_delta: latitude_delta,
            },
        )
    }

    #[test]
    fn test_span_distance_offsets_full_delta_each_side() {
        let r = Region::new(
            GeoPoint::new(10.0, 20.0),
            Span {
                latitude_delta: 0.5,
                longitude_delta: 0.25,
            },
        );
        let expected = haversine(GeoPoint::new(9.5, 20.0), GeoPoint::new(10.5, 20.0));
        assert_eq!(span_distance(&r), expected);
        // one degree along the meridian
        assert!((span_distance(&r) - 111_194.93).abs() < 0.1);
    }

    #[test]
    fn test_zero_span_yields_zero() {
        assert_eq!(span_distance(&region(0.0)), 0.0);
        assert_eq!(threshold(&region(0.0), DEFAULT_SPAN_FACTOR), 0.0);
    }

    #[test]
    fn test_threshold_divides_by_factor() {
        let r = region(0.5);
        assert_eq!(threshold(&r, 50.0), span_distance(&r) / 50.0);
        assert_eq!(threshold(&r, 1.0), span_distance(&r));
    }

    #[test]
    fn test_doubling_the_span_never_decreases_epsilon() {
        for delta in [0.0005, 0.001, 0.01, 0.1, 1.0, 5.0, 20.0] {
            let narrow = threshold(&region(delta), DEFAULT_SPAN_FACTOR);
            let wide = threshold(&region(delta * 2.0), DEFAULT_SPAN_FACTOR);
            assert!(wide >= narrow, "delta {}: {} < {}", delta, wide, narrow);
        }
    }

    #[test]
    fn test_epsilon_tracks_the_geodesic_span_ratio() {
        let narrow = threshold(&region(0.001), DEFAULT_SPAN_FACTOR);
        let wide = threshold(&region(1.0), DEFAULT_SPAN_FACTOR);

        assert!(wide > narrow);
        let span_ratio = span_distance(&region(1.0)) / span_distance(&region(0.001));
        assert!((wide / narrow - span_ratio).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "span factor")]
    fn test_non_positive_factor_panics() {
        threshold(&region(0.5), 0.0);
    }
}
