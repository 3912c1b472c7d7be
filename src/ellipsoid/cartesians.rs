use super::*;
use crate::coordinate::Coor4D;

impl Ellipsoid {
    /// Geographic to cartesian conversion.
    ///
    /// Input in the internal (longitude, latitude, height, time) order,
    /// angles in radians. Output is geocentric X, Y, Z, and the time
    /// passed through.
    #[must_use]
    pub fn cartesian(&self, geographic: &Coor4D) -> Coor4D {
        let (lam, phi) = geographic.xy();
        let h = geographic[2];

        let n = self.prime_vertical_radius_of_curvature(phi);
        let (sinphi, cosphi) = phi.sin_cos();
        let (sinlam, coslam) = lam.sin_cos();

        Coor4D::raw(
            (n + h) * cosphi * coslam,
            (n + h) * cosphi * sinlam,
            (n * (1.0 - self.eccentricity_squared()) + h) * sinphi,
            geographic[3],
        )
    }
}

// ----- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_to_cart() {
        let ellps = Ellipsoid::wgs84();
        let a = ellps.semimajor_axis();

        // 90 degrees east on the equator
        let xyz = ellps.cartesian(&Coor4D::geo(0., 90., 10., 7.));
        assert!(xyz[0].abs() < 1e-6);
        assert!((xyz[1] - (a + 10.)).abs() < 1e-6);
        assert!(xyz[2].abs() < 1e-9);
        assert_eq!(xyz[3], 7.);

        // At 45 degrees north, the distance from the center is between b and a,
        // and the geocentric latitude is smaller than the geodetic
        let xyz = ellps.cartesian(&Coor4D::geo(45., 0., 0., 0.));
        let r = xyz[0].hypot(xyz[2]);
        assert!(r < a && r > ellps.semiminor_axis());
        assert!(xyz[0] > xyz[2]);
    }
}
