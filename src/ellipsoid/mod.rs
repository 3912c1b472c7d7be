mod cartesians;

/// Representation of a biaxial ellipsoid of revolution.
///
/// Ellipsoidal heights are always given on WGS84, so that is the only
/// ellipsoid which can be constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
}

impl Default for Ellipsoid {
    fn default() -> Ellipsoid {
        Ellipsoid::wgs84()
    }
}

impl Ellipsoid {
    /// The World Geodetic System 1984 ellipsoid
    #[must_use]
    pub fn wgs84() -> Ellipsoid {
        Ellipsoid {
            a: 6_378_137.0,
            f: 1. / 298.257_223_563,
        }
    }

    /// The squared eccentricity *e² = (a² - b²) / a²*.
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        self.f * (2_f64 - self.f)
    }

    /// The semimajor axis, *a*
    #[must_use]
    pub fn semimajor_axis(&self) -> f64 {
        self.a
    }

    /// The semiminor axis, *b*
    #[must_use]
    pub fn semiminor_axis(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// The radius of curvature in the prime vertical, *N*
    #[must_use]
    pub fn prime_vertical_radius_of_curvature(&self, latitude: f64) -> f64 {
        self.a / (1.0 - latitude.sin().powi(2) * self.eccentricity_squared()).sqrt()
    }
}

// ----- Tests ---------------------------------------------------------------------
