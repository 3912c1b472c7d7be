//! Transformation of orthometric (MSL) heights to ellipsoidal heights.
//!
//! The transformation is purely vertical: *h = H + N*, where *N* is the
//! geoid undulation, interpolated in a geoid model grid. The horizontal
//! components pass through unchanged.

pub mod registry;

use crate::authoring::*;
use std::f64::consts::FRAC_PI_2;

// Latitudes computed as `90f64.to_radians()` may exceed π/2 by an ulp or two
const LATITUDE_LIMIT: f64 = FRAC_PI_2 * (1.0 + 4.0 * f64::EPSILON);

/// A transformation from a system with gravity related heights, to WGS 84 3D,
/// resolved against - and bound to - a [GeodeticContext].
///
/// The transformation borrows the context, so it cannot outlive it.
/// It is immutable once resolved, so `apply` may be called from
/// several threads, in any order.
#[derive(Debug)]
pub struct VerticalTransformation<'ctx, C: GeodeticContext + ?Sized> {
    ctx: &'ctx C,
    source: String,
    target: String,
    grids: Vec<Arc<Grid>>,
}

impl<'ctx, C: GeodeticContext + ?Sized> VerticalTransformation<'ctx, C> {
    /// Resolve the transformation from WGS 84 + MSL height (EPSG:9705) to
    /// WGS 84 3D (EPSG:4979)
    pub fn resolve(ctx: &'ctx C) -> Result<Self, Error> {
        Self::resolve_crs(ctx, registry::WGS84_MSL, registry::WGS84_3D)
    }

    /// Resolve the transformation from `source` to `target`, cf. the
    /// [registry] for the supported systems.
    ///
    /// If the context has a `geoid` global, the (comma separated list of)
    /// grid(s) given there is used for all source systems. Otherwise the
    /// first of the source system's candidate grids available is used.
    pub fn resolve_crs(ctx: &'ctx C, source: &str, target: &str) -> Result<Self, Error> {
        let failure = |reason: String| Error::TransformationResolution {
            source_crs: source.to_string(),
            target_crs: target.to_string(),
            reason,
        };

        if !registry::is_ellipsoidal(target) {
            return Err(failure(format!(
                "Unsupported target system. Expected {}",
                registry::WGS84_3D
            )));
        }
        let Some(system) = registry::height_system(source) else {
            return Err(failure("Unsupported source system".to_string()));
        };

        let mut grids = Vec::new();
        let globals = ctx.globals();
        if let Some(stack) = globals.get("geoid") {
            // A pinned grid stack: all of them must be present
            for name in stack.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let grid = ctx
                    .get_grid(name)
                    .map_err(|e| failure(format!("Cannot load geoid grid {name}: {e}")))?;
                grids.push(grid);
            }
        } else {
            // Alternatives: the first one available wins
            let mut tried = Vec::new();
            for name in system.grids {
                match ctx.get_grid(name) {
                    Ok(grid) => {
                        grids.push(grid);
                        break;
                    }
                    Err(e) => tried.push(format!("{name} ({e})")),
                }
            }
            if grids.is_empty() {
                return Err(failure(format!(
                    "No geoid grid available. Tried {}",
                    tried.join(", ")
                )));
            }
        }

        if grids.is_empty() {
            return Err(failure("Empty geoid grid stack".to_string()));
        }
        if let Some(grid) = grids.iter().find(|g| g.bands() != 1) {
            return Err(failure(format!(
                "{} is not a geoid model ({} bands)",
                grid.name,
                grid.bands()
            )));
        }

        let txn = VerticalTransformation {
            ctx,
            source: system.code.to_string(),
            target: registry::WGS84_3D.to_string(),
            grids,
        };
        debug!(
            "Resolved {} ({}) -> {} using {:?}",
            txn.source,
            system.name,
            txn.target,
            txn.grid_names()
        );
        Ok(txn)
    }

    /// Transform `input` to an ellipsoidal height.
    ///
    /// Either a complete result is returned, or an `Error::TransformationApply`
    /// (for input outside of the grid coverage, on null grid nodes, or for
    /// non-finite or out-of-range input). A failure concerns only this
    /// input: The transformation remains usable.
    pub fn apply(&self, input: OrthometricPosition) -> Result<EllipsoidalPosition, Error> {
        // Internally in radians, and in longitude-latitude order
        let coord = Coor4D::geo(input.latitude, input.longitude, input.height, 0.);
        let result = self.forward(coord)?.to_geo();
        Ok(EllipsoidalPosition::new(result[0], result[1], result[2]))
    }

    /// The geoid undulation, *N*, at the position of `input`
    pub fn undulation(&self, input: OrthometricPosition) -> Result<f64, Error> {
        let coord = Coor4D::geo(input.latitude, input.longitude, input.height, 0.);
        self.geoid_at(&coord)
    }

    /// The source system, in the canonical spelling of its code
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The target system, in the canonical spelling of its code
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The names of the grids in use, in search order
    pub fn grid_names(&self) -> Vec<&str> {
        self.grids.iter().map(|g| g.name.as_str()).collect()
    }

    /// The context the transformation was resolved from
    pub fn context(&self) -> &'ctx C {
        self.ctx
    }

    fn forward(&self, coord: Coor4D) -> Result<Coor4D, Error> {
        let mut coord = coord;
        coord[2] += self.geoid_at(&coord)?;
        if !coord.is_finite() {
            return Err(Error::TransformationApply(
                "Non-finite transformation result".to_string(),
            ));
        }
        Ok(coord)
    }

    fn geoid_at(&self, coord: &Coor4D) -> Result<f64, Error> {
        if !coord.is_finite() {
            return Err(Error::TransformationApply(
                "Non-finite input coordinate".to_string(),
            ));
        }
        let geo = coord.to_geo();
        if coord[1].abs() > LATITUDE_LIMIT {
            return Err(Error::TransformationApply(format!(
                "Latitude {} outside of [-90; 90]",
                geo[0]
            )));
        }

        let Some(n) = grids_at(&self.grids, coord) else {
            return Err(Error::TransformationApply(format!(
                "({}, {}) is outside of the coverage of {:?}",
                geo[0],
                geo[1],
                self.grid_names()
            )));
        };
        if !n[0].is_finite() {
            return Err(Error::TransformationApply(format!(
                "No geoid data at ({}, {})",
                geo[0], geo[1]
            )));
        }
        Ok(n[0])
    }
}

/// The simple, but costly, way: Acquire a context, resolve the transformation
/// from WGS 84 + MSL height to WGS 84 3D, apply it to `input`, and release
/// everything again - on the failure paths as well.
pub fn convert_once<C: GeodeticContext>(
    input: OrthometricPosition,
) -> Result<EllipsoidalPosition, Error> {
    let ctx = C::acquire()?;
    let result = VerticalTransformation::resolve(&ctx).and_then(|txn| txn.apply(input));
    ctx.release();
    result
}

// ----- T E S T S ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    // The synthetic New York harbour geoid also found in ./geodesy/geoid/test_nyc.geoid:
    // N = -32.6 - 0.4 (lat - 40.5) + 0.2 (lon + 74.25)
    const NYC: &str = "40.5 41.0 -74.25 -73.75 0.25 0.25
        -32.80 -32.75 -32.70
        -32.70 -32.65 -32.60
        -32.60 -32.55 -32.50";

    fn nyc(lat: f64, lon: f64) -> f64 {
        -32.6 - 0.4 * (lat - 40.5) + 0.2 * (lon + 74.25)
    }

    // A coarse global grid, 30 degree spacing, with N = latitude / 10
    fn global_grid(name: &str) -> Result<Grid, Error> {
        let header = [
            90f64.to_radians(),
            (-90f64).to_radians(),
            (-180f64).to_radians(),
            180f64.to_radians(),
            30f64.to_radians(),
            30f64.to_radians(),
            1.,
        ];
        let mut values = Vec::new();
        for row in 0..7 {
            for _col in 0..13 {
                values.push((90 - 30 * row) as f32 / 10.);
            }
        }
        Grid::new(name, &header, &values)
    }

    fn nyc_context() -> Result<Minimal, Error> {
        let mut ctx = Minimal::acquire()?;
        ctx.register_blob("nyc.geoid", NYC.as_bytes().to_vec());
        ctx.set_global("geoid", "nyc.geoid")?;
        Ok(ctx)
    }

    #[test]
    fn statue_of_liberty() -> Result<(), Error> {
        let ctx = nyc_context()?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        assert_eq!(txn.source(), "EPSG:9705");
        assert_eq!(txn.target(), "EPSG:4979");
        assert_eq!(txn.grid_names(), ["nyc.geoid"]);

        let liberty = OrthometricPosition::new(40.6892, -74.0445, 0.0);
        let result = txn.apply(liberty)?;
        assert!((result.height - nyc(40.6892, -74.0445)).abs() < 1e-3);
        assert!((result.height + 32.63458).abs() < 1e-3);
        assert!((result.latitude - liberty.latitude).abs() < 1e-9);
        assert!((result.longitude - liberty.longitude).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn height_plus_undulation() -> Result<(), Error> {
        let ctx = nyc_context()?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        for (lat, lon, h) in [
            (40.5, -74.25, 0.0),
            (40.6, -74.1, 12.5),
            (40.99, -73.76, -3.0),
            (40.75, -74.0, 1000.0),
        ] {
            let pos = OrthometricPosition::new(lat, lon, h);
            let n = txn.undulation(pos)?;
            assert!((n - nyc(lat, lon)).abs() < 1e-4);
            assert!((txn.apply(pos)?.height - (h + n)).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn horizontal_passthrough() -> Result<(), Error> {
        let mut ctx = Minimal::acquire()?;
        ctx.register_grid(global_grid("egm08_25.gtx")?);
        let txn = VerticalTransformation::resolve(&ctx)?;

        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let pos = OrthometricPosition::new(lat, lon, 100.);
                let res = txn.apply(pos)?;
                assert!((res.latitude - lat).abs() < 1e-9);
                assert!((res.longitude - lon).abs() < 1e-9);
                assert!((res.height - (100. + lat / 10.)).abs() < 1e-5);
                lon += 7.3;
            }
            lat += 4.7;
        }

        // Longitudes outside of [-180; 180] are not normalized in the output
        let res = txn.apply(OrthometricPosition::new(10., 370., 0.))?;
        assert_float_eq!(res.longitude, 370., abs <= 1e-9);
        Ok(())
    }

    #[test]
    fn boundary_latitudes() -> Result<(), Error> {
        // A global grid: the poles succeed, deterministically
        let mut ctx = Minimal::acquire()?;
        ctx.register_grid(global_grid("egm08_25.gtx")?);
        let txn = VerticalTransformation::resolve(&ctx)?;
        for lat in [90., -90.] {
            let res = txn.apply(OrthometricPosition::new(lat, 33., 0.))?;
            assert!(res.height.is_finite());
            assert!((res.height - lat / 10.).abs() < 1e-5);
            assert_eq!(res, txn.apply(OrthometricPosition::new(lat, 33., 0.))?);
        }

        // A regional grid: the poles fail
        let ctx = nyc_context()?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        for lat in [90., -90.] {
            let res = txn.apply(OrthometricPosition::new(lat, -74., 0.));
            assert!(matches!(res, Err(Error::TransformationApply(_))));
        }
        Ok(())
    }

    #[test]
    fn apply_failures() -> Result<(), Error> {
        let ctx = nyc_context()?;
        let txn = VerticalTransformation::resolve(&ctx)?;

        for pos in [
            OrthometricPosition::new(55., 12., 0.),
            OrthometricPosition::new(f64::NAN, -74., 0.),
            OrthometricPosition::new(40.6, -74., f64::INFINITY),
            OrthometricPosition::new(91., -74., 0.),
        ] {
            assert!(matches!(txn.apply(pos), Err(Error::TransformationApply(_))));
        }

        // ...and the transformation is still usable afterwards
        assert!(txn.apply(OrthometricPosition::new(40.6, -74., 0.)).is_ok());
        Ok(())
    }

    #[test]
    fn null_nodes() -> Result<(), Error> {
        let mut ctx = Minimal::acquire()?;
        let holey = NYC.replace("-32.65", "NaN");
        ctx.register_blob("holey.geoid", holey.into_bytes());
        ctx.set_global("geoid", "holey.geoid")?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        let res = txn.apply(OrthometricPosition::new(40.7, -74.1, 0.));
        assert!(matches!(res, Err(Error::TransformationApply(_))));
        Ok(())
    }

    #[test]
    fn resolution() -> Result<(), Error> {
        // Nothing to resolve against
        let ctx = Minimal::acquire()?;
        let res = VerticalTransformation::resolve(&ctx);
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));
        // ...but the context is still fine, and can be released
        ctx.release();

        // The registry alternatives: EGM96 is used when EGM2008 is missing
        let mut ctx = Minimal::acquire()?;
        ctx.register_grid(global_grid("egm96_15.gtx")?);
        let txn = VerticalTransformation::resolve(&ctx)?;
        assert_eq!(txn.grid_names(), ["egm96_15.gtx"]);
        let txn = VerticalTransformation::resolve_crs(&ctx, "epsg:4326+5773", "EPSG:4979")?;
        assert_eq!(txn.source(), "EPSG:4326+5773");

        // ...but not when EGM2008 is explicitly requested
        let res = VerticalTransformation::resolve_crs(&ctx, "EPSG:4326+3855", "EPSG:4979");
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));

        // Unsupported systems
        for (source, target) in [("EPSG:4326", "EPSG:4979"), ("EPSG:9705", "EPSG:4326")] {
            let res = VerticalTransformation::resolve_crs(&ctx, source, target);
            let Err(Error::TransformationResolution {
                source_crs,
                target_crs,
                ..
            }) = res
            else {
                panic!("Expected a resolution error for {source} -> {target}");
            };
            assert_eq!(source_crs, source);
            assert_eq!(target_crs, target);
        }

        // A pinned geoid overrides the registry, and must be present
        let mut ctx = Minimal::acquire()?;
        ctx.register_grid(global_grid("egm96_15.gtx")?);
        ctx.set_global("geoid", "missing.gtx")?;
        assert!(VerticalTransformation::resolve(&ctx).is_err());
        Ok(())
    }

    #[test]
    fn corrupted_grid() -> Result<(), Error> {
        // A header with absurdly small cells must not bring down the resolution
        let mut ctx = Minimal::acquire()?;
        ctx.register_blob("corrupt.geoid", b"40 41 -75 -74 1e-300 1e-300\n 1 2 3 4\n".to_vec());
        ctx.set_global("geoid", "corrupt.geoid")?;
        let res = VerticalTransformation::resolve(&ctx);
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));

        // ...and neither must a truncated GTX file
        let mut ctx = Minimal::acquire()?;
        ctx.register_blob("corrupt.gtx", vec![0x40; 44]);
        ctx.set_global("geoid", "corrupt.gtx")?;
        let res = VerticalTransformation::resolve(&ctx);
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));
        Ok(())
    }

    #[test]
    fn not_a_geoid() -> Result<(), Error> {
        let header = [1., 0., 0., 1., 1., 1., 2.];
        let datum = Grid::new("datum.gtx", &header, &[0.; 8])?;
        let mut ctx = Minimal::acquire()?;
        ctx.register_grid(datum);
        ctx.set_global("geoid", "datum.gtx")?;
        let res = VerticalTransformation::resolve(&ctx);
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));
        Ok(())
    }

    #[test]
    fn grid_stack() -> Result<(), Error> {
        let mut ctx = Minimal::acquire()?;
        ctx.register_blob("nyc.geoid", NYC.as_bytes().to_vec());
        ctx.register_grid(global_grid("global.gtx")?);
        ctx.set_global("geoid", "nyc.geoid, global.gtx")?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        assert_eq!(txn.grid_names(), ["nyc.geoid", "global.gtx"]);

        // The regional grid takes precedence where it has coverage...
        let n = txn.undulation(OrthometricPosition::new(40.6, -74.1, 0.))?;
        assert!((n - nyc(40.6, -74.1)).abs() < 1e-4);

        // ...and the global one takes over everywhere else
        let n = txn.undulation(OrthometricPosition::new(60., 10., 0.))?;
        assert!((n - 6.).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn shared_between_threads() -> Result<(), Error> {
        let ctx = nyc_context()?;
        let expected = nyc(40.6892, -74.0445);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let txn = VerticalTransformation::resolve(&ctx).unwrap();
                    let pos = OrthometricPosition::new(40.6892, -74.0445, 10.);
                    let res = txn.apply(pos).unwrap();
                    assert!((res.height - (10. + expected)).abs() < 1e-3);
                });
            }
        });
        ctx.release();
        Ok(())
    }

    #[test]
    fn cartesian_output() -> Result<(), Error> {
        let ctx = nyc_context()?;
        let txn = VerticalTransformation::resolve(&ctx)?;
        let res = txn.apply(OrthometricPosition::new(40.6892, -74.0445, 0.))?;
        let xyz = res.cartesian();

        // The geoid offset is along the ellipsoid normal, so the cartesian
        // distance to the footpoint on the ellipsoid is just |N|
        let foot = EllipsoidalPosition::new(res.latitude, res.longitude, 0.).cartesian();
        let d = (0..3).map(|i| (xyz[i] - foot[i]).powi(2)).sum::<f64>().sqrt();
        assert!((d - res.height.abs()).abs() < 1e-6);
        assert!(xyz[2] < foot[2]);
        Ok(())
    }

    #[test]
    fn per_call_conversion() {
        // A fresh Minimal context has no grids, so resolution fails
        let res = convert_once::<Minimal>(OrthometricPosition::new(40.6892, -74.0445, 0.));
        assert!(matches!(res, Err(Error::TransformationResolution { .. })));
    }
}
