//! Route geometry.

use std::f64::consts::PI;

use crate::vehicle::model::Location;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const DESTINATION_NAME: &str = "Gangnam Station";
pub const DESTINATION: Location = Location::at(37.4979, 127.0276);

/// Great-circle distance in metres (haversine).
pub fn distance_m(from: &Location, to: &Location) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Planar heading from `from` to `to` in degrees, 0 = north, clockwise positive.
pub fn heading_deg(from: &Location, to: &Location) -> f64 {
    (to.longitude - from.longitude).atan2(to.latitude - from.latitude) * 180.0 / PI
}

/// Point at `progress` (0..=1) along the segment, facing `to`.
pub fn interpolate(from: &Location, to: &Location, progress: f64) -> Location {
    Location {
        latitude: from.latitude + (to.latitude - from.latitude) * progress,
        longitude: from.longitude + (to.longitude - from.longitude) * progress,
        heading: heading_deg(from, to),
        ..Location::at(0.0, 0.0)
    }
}

/// The simulated drive: Seoul City Hall north-east in 0.0005° steps, then a
/// final jump to Gangnam Station. 70 points.
pub fn city_hall_to_gangnam() -> Vec<Location> {
    let mut route = Vec::with_capacity(70);
    route.push(Location::at(37.5665, 126.9780));
    route.push(Location::at(37.5668, 126.9785));
    for step in 0..=66 {
        let offset = f64::from(step) * 0.0005;
        route.push(Location::at(37.5670 + offset, 126.9790 + offset));
    }
    route.push(DESTINATION);
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_shape() {
        let route = city_hall_to_gangnam();
        assert_eq!(route.len(), 70);
        assert_eq!(route[0], Location::default());
        let last_step = route[68];
        assert!((last_step.latitude - 37.6000).abs() < 1e-9);
        assert!((last_step.longitude - 127.0120).abs() < 1e-9);
        assert_eq!(route[69], DESTINATION);
    }

    #[test]
    fn test_distance_known_values() {
        let a = Location::at(37.5665, 126.9780);
        assert_eq!(distance_m(&a, &a), 0.0);

        // 0.001° of latitude is ~111 m anywhere.
        let b = Location::at(37.5675, 126.9780);
        let d = distance_m(&a, &b);
        assert!((d - 111.19).abs() < 0.5, "got {d}");

        // City Hall to Gangnam Station is roughly 8.5 km as the crow flies.
        let total = distance_m(&a, &DESTINATION);
        assert!((8_000.0..9_500.0).contains(&total), "got {total}");
    }

    #[test]
    fn test_heading_and_interpolation() {
        let a = Location::at(37.0, 127.0);
        let north = Location::at(38.0, 127.0);
        let east = Location::at(37.0, 128.0);
        assert!((heading_deg(&a, &north) - 0.0).abs() < 1e-9);
        assert!((heading_deg(&a, &east) - 90.0).abs() < 1e-9);

        let mid = interpolate(&a, &east, 0.5);
        assert!((mid.longitude - 127.5).abs() < 1e-9);
        assert_eq!(mid.latitude, 37.0);
        assert!((mid.heading - 90.0).abs() < 1e-9);
        assert_eq!(mid.accuracy, 5.0);
    }
}
