//! Great-circle distance and bounding-box helpers used by proximity queries.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius applied when a caller asks for nearby reports without specifying one.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 5.0;

/// Bare latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Haversine distance between two points in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn within_radius(center: GeoPoint, candidate: GeoPoint, radius_km: f64) -> bool {
    distance_km(center, candidate) <= radius_km
}

/// Rectangular viewport, typically the visible area of a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Approximate national bounds used to flag reports outside the service area.
pub const VIETNAM_BOUNDS: MapBounds = MapBounds {
    north: 23.393395,
    south: 8.177845,
    east: 109.464638,
    west: 102.144847,
};

impl MapBounds {
    pub fn contains(&self, point: GeoPoint) -> bool {
        if point.lat < self.south || point.lat > self.north {
            return false;
        }

        // A viewport crossing the antimeridian has west > east.
        if self.west <= self.east {
            point.lng >= self.west && point.lng <= self.east
        } else {
            point.lng >= self.west || point.lng <= self.east
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANOI: GeoPoint = GeoPoint::new(21.0285, 105.8542);
    const HO_CHI_MINH_CITY: GeoPoint = GeoPoint::new(10.8231, 106.6297);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(HANOI, HANOI), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = distance_km(HANOI, HO_CHI_MINH_CITY);
        let back = distance_km(HO_CHI_MINH_CITY, HANOI);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn hanoi_to_saigon_is_roughly_eleven_hundred_km() {
        let km = distance_km(HANOI, HO_CHI_MINH_CITY);
        assert!((1130.0..=1165.0).contains(&km), "unexpected distance {km}");
    }

    #[test]
    fn within_radius_is_inclusive() {
        let nearby = GeoPoint::new(21.0385, 105.8542);
        let km = distance_km(HANOI, nearby);
        assert!(within_radius(HANOI, nearby, km));
        assert!(!within_radius(HANOI, nearby, km - 0.001));
    }

    #[test]
    fn bounds_handle_antimeridian() {
        let pacific = MapBounds {
            north: 10.0,
            south: -10.0,
            east: -170.0,
            west: 170.0,
        };
        assert!(pacific.contains(GeoPoint::new(0.0, 179.5)));
        assert!(pacific.contains(GeoPoint::new(0.0, -175.0)));
        assert!(!pacific.contains(GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn vietnam_bounds_cover_major_cities() {
        assert!(VIETNAM_BOUNDS.contains(HANOI));
        assert!(VIETNAM_BOUNDS.contains(HO_CHI_MINH_CITY));
        assert!(!VIETNAM_BOUNDS.contains(GeoPoint::new(48.8566, 2.3522)));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(HANOI.is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
