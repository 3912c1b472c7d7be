//! *Heights above mean sea level, turned into heights above the ellipsoid*.
//!
//! Vertical datum transformation
//! =============================
//!
//! `geoheight` converts a geodetic position with an orthometric
//! (mean-sea-level referenced) height into the same horizontal position
//! with an ellipsoidal height above WGS84, by adding the geoid undulation
//! *N* interpolated in a geoid model grid:
//!
//! *h = H + N*
//!
//! Resource life cycle
//! -------------------
//!
//! A [GeodeticContext](crate::context::GeodeticContext) owns the
//! resources (grid locations, ellipsoid, settings). A
//! [VerticalTransformation](crate::vertical::VerticalTransformation) is
//! resolved from a live context, borrows it for its entire lifetime, and
//! is then applied to any number of positions:
//!
//! ```no_run
//! use geoheight::prelude::*;
//! fn main() -> Result<(), Error> {
//!     let ctx = Plain::acquire()?;
//!     let txn = VerticalTransformation::resolve(&ctx)?;
//!     let pos = txn.apply(OrthometricPosition::new(40.6892, -74.0445, 0.0))?;
//!     println!("{:.3}", pos.height);
//!     drop(txn);
//!     ctx.release();
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod coordinate;
pub mod ellipsoid;
pub mod ffi;
pub mod grid;
pub mod math;
pub mod vertical;

use thiserror::Error;

/// The bread-and-butter, shrink-wrapped and ready to use
pub mod prelude {
    pub use crate::context::GeodeticContext;
    pub use crate::context::Minimal;
    #[cfg(feature = "with_plain")]
    pub use crate::context::Plain;
    pub use crate::coordinate::AngularUnits;
    pub use crate::coordinate::Coor4D;
    pub use crate::coordinate::EllipsoidalPosition;
    pub use crate::coordinate::OrthometricPosition;
    pub use crate::ellipsoid::Ellipsoid;
    pub use crate::vertical::convert_once;
    pub use crate::vertical::VerticalTransformation;
    pub use crate::Error;
}

/// Preamble for crate-internal modules, and for authors of
/// user defined context providers
pub mod authoring {
    pub use crate::prelude::*;

    pub use crate::grid::grids_at;
    pub use crate::grid::Grid;
    pub use crate::math::angular;

    pub use log::debug;
    pub use log::trace;
    pub use log::warn;

    pub use std::collections::BTreeMap;
    pub use std::sync::Arc;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    #[error("error: {0}")]
    General(&'static str),

    #[error("{0} not found{1}")]
    NotFound(String, String),

    #[error("malformed value for parameter {0}: {1}")]
    BadParam(String, String),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("context creation failed: {0}")]
    ContextCreation(String),

    #[error("cannot resolve transformation {source_crs} -> {target_crs}: {reason}")]
    TransformationResolution {
        source_crs: String,
        target_crs: String,
        reason: String,
    },

    #[error("transformation failed: {0}")]
    TransformationApply(String),
}

impl Error {
    /// The discrete status code reported through the C entry points.
    ///
    /// The low level variants are only produced while locating and
    /// reading grids, i.e. while resolving a transformation, and
    /// the lifecycle operations wrap them accordingly. Should one
    /// slip through anyway, it is reported as a resolution failure.
    #[must_use]
    pub fn status(&self) -> ffi::Status {
        use ffi::Status;
        match self {
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::ContextCreation(_) => Status::ContextCreation,
            Error::TransformationApply(_) => Status::TransformationApply,
            Error::TransformationResolution { .. }
            | Error::Io(_)
            | Error::General(_)
            | Error::NotFound(_, _)
            | Error::BadParam(_, _) => Status::TransformationResolution,
        }
    }
}

// ----- T E S T S ------------------------------------------------------------------
