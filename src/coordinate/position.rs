use crate::coordinate::Coor4D;
use crate::ellipsoid::Ellipsoid;

/// A geodetic position with a height above mean sea level (i.e. above the geoid).
///
/// Latitude and longitude in degrees, height in meters.
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct OrthometricPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl OrthometricPosition {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, height: f64) -> OrthometricPosition {
        OrthometricPosition {
            latitude,
            longitude,
            height,
        }
    }
}

/// A geodetic position with a height above the WGS84 ellipsoid.
///
/// Latitude and longitude in degrees, height in meters.
/// Produced by [VerticalTransformation::apply](crate::vertical::VerticalTransformation::apply).
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct EllipsoidalPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl EllipsoidalPosition {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, height: f64) -> EllipsoidalPosition {
        EllipsoidalPosition {
            latitude,
            longitude,
            height,
        }
    }

    /// The geocentric cartesian (ECEF) coordinates X, Y, Z of the position.
    /// The fourth element is always 0.
    #[must_use]
    pub fn cartesian(&self) -> Coor4D {
        let geo = Coor4D::geo(self.latitude, self.longitude, self.height, 0.);
        Ellipsoid::wgs84().cartesian(&geo)
    }
}

// ----- T E S T S ---------------------------------------------------
