use fieldhand_types::models::GeoPoint;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometres.
///
/// Inputs are not range-checked; a non-finite coordinate yields a non-finite
/// distance, so callers must reject those first.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let p = GeoPoint::new(12.9, 77.6);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = GeoPoint::new(12.90, 77.60);
        let b = GeoPoint::new(12.95, 77.62);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn nearby_village_distance() {
        let d = distance_km(GeoPoint::new(12.90, 77.60), GeoPoint::new(12.95, 77.62));
        assert!((d - 5.967).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn non_finite_input_propagates() {
        let d = distance_km(GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(1.0, 0.0));
        assert!(!d.is_finite());
    }
}
