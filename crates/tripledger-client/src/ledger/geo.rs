use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

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

/// Renders the `lat,lng` form stored on revenue records.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((raw_lat, raw_lng)) = value.trim().split_once(',') else {
            return Err("position must use `lat,lng` format".to_string());
        };

        let lat = raw_lat
            .trim()
            .parse::<f64>()
            .map_err(|_| "latitude must be a number".to_string())?;
        let lng = raw_lng
            .trim()
            .parse::<f64>()
            .map_err(|_| "longitude must be a number".to_string())?;

        let point = Self::new(lat, lng);
        if !point.is_valid() {
            return Err(
                "latitude must be within [-90, 90] and longitude within [-180, 180]".to_string(),
            );
        }
        Ok(point)
    }
}

/// Great-circle distance between two points in kilometres.
///
/// A missing point yields `0.0`: a failed capture is common and not an error.
/// The result is not rounded.
pub fn distance_km(a: Option<&GeoPoint>, b: Option<&GeoPoint>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Serde adapter for the legacy `"lat,lng"` coordinate strings.
///
/// Absent, empty and unparsable strings all load as `None`.
pub(crate) mod legacy_coord {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::GeoPoint;

    pub fn serialize<S>(value: &Option<GeoPoint>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(point) => serializer.serialize_str(&point.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|text| text.parse::<GeoPoint>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, distance_km};

    const SAO_PAULO: GeoPoint = GeoPoint::new(-23.5505, -46.6333);
    const RIO: GeoPoint = GeoPoint::new(-22.9068, -43.1729);

    #[test]
    fn same_point_is_zero_distance() {
        for point in [SAO_PAULO, RIO, GeoPoint::new(0.0, 0.0), GeoPoint::new(89.9, 179.9)] {
            assert_eq!(distance_km(Some(&point), Some(&point)), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = distance_km(Some(&SAO_PAULO), Some(&RIO));
        let backward = distance_km(Some(&RIO), Some(&SAO_PAULO));
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn missing_point_yields_zero() {
        assert_eq!(distance_km(None, Some(&RIO)), 0.0);
        assert_eq!(distance_km(Some(&RIO), None), 0.0);
        assert_eq!(distance_km(None, None), 0.0);
    }

    #[test]
    fn sao_paulo_to_rio_fixture() {
        let distance = distance_km(Some(&SAO_PAULO), Some(&RIO));
        assert!((357.0..=361.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn parses_and_renders_legacy_coordinates() {
        let parsed = " -23.5505 , -46.6333 ".parse::<GeoPoint>();
        assert!(parsed.is_ok());
        if let Ok(point) = parsed {
            assert_eq!(point, SAO_PAULO);
            assert_eq!(point.to_string(), "-23.5505,-46.6333");
        }
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!("91,0".parse::<GeoPoint>().is_err());
        assert!("0,181".parse::<GeoPoint>().is_err());
        assert!("abc".parse::<GeoPoint>().is_err());
        assert!("1;2".parse::<GeoPoint>().is_err());
    }
}
