use geo_types::{Geometry, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// "lat,lng" as expected by the Google Maps web services
impl From<Coordinates> for String {
    fn from(c: Coordinates) -> Self {
        format!("{},{}", c.latitude, c.longitude)
    }
}

impl From<Coordinates> for Geometry<f64> {
    fn from(c: Coordinates) -> Self {
        Geometry::Point(Point::new(c.longitude, c.latitude))
    }
}
