//! Great-circle geometry used by location discovery
//!
//! Distances are computed with the Haversine formula on a spherical Earth
//! of radius 6371 km. Inputs are degrees, outputs are kilometres.

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack added to bounding boxes so points on the exact radius survive
/// floating-point rounding in the prefilter.
const BOX_EPSILON_DEG: f64 = 1e-6;

/// Great-circle distance in kilometres between two points given in degrees.
///
/// Malformed coordinates are not rejected here; callers validate ranges.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat_distance = (lat2 - lat1).to_radians();
    let lng_distance = (lng2 - lng1).to_radians();

    let a = (lat_distance / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (lng_distance / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Latitude/longitude rectangle enclosing every point within a radius.
///
/// Used to narrow candidate rows before the exact distance test. The box is a
/// superset of the circle; it degrades to the full longitude range near the
/// poles and across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// The whole globe
    pub const WORLD: BoundingBox = BoundingBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lng: -180.0,
        max_lng: 180.0,
    };

    /// Compute the box around `(lat, lng)` covering `radius_km`
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        if !angular.is_finite() || angular >= std::f64::consts::PI {
            return Self::WORLD;
        }

        let lat_delta = angular.to_degrees() + BOX_EPSILON_DEG;
        let min_lat = lat - lat_delta;
        let max_lat = lat + lat_delta;

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return BoundingBox {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                ..Self::WORLD
            };
        }

        let ratio = angular.sin() / lat.to_radians().cos();
        if ratio >= 1.0 {
            return BoundingBox {
                min_lat,
                max_lat,
                ..Self::WORLD
            };
        }

        let lng_delta = ratio.asin().to_degrees() + BOX_EPSILON_DEG;
        let min_lng = lng - lng_delta;
        let max_lng = lng + lng_delta;

        if min_lng < -180.0 || max_lng > 180.0 {
            return BoundingBox {
                min_lat,
                max_lat,
                ..Self::WORLD
            };
        }

        BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Whether the point lies inside the box (edges included)
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}
