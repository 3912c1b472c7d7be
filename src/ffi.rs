//! The C entry points, and their safe Rust counterparts.
//!
//! Every entry point reports its outcome as a [Status] code, and writes
//! its output only on success.

use crate::authoring::*;
use once_cell::sync::OnceCell;
use std::os::raw::{c_double, c_int};

/// Outcome of a conversion through the C interface
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    /// Missing (null) input or output
    InvalidArgument = -1,
    ContextCreation = -2,
    TransformationResolution = -3,
    TransformationApply = -4,
}

impl From<Result<(), Error>> for Status {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

/// WGS 84 + MSL height: latitude and longitude in degrees, height in meters
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Epsg9705 {
    pub lat: c_double,
    pub lon: c_double,
    pub alt: c_double,
}

/// WGS 84 3D: latitude and longitude in degrees, ellipsoidal height in meters
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Epsg4979 {
    pub lat: c_double,
    pub lon: c_double,
    pub alt: c_double,
}

impl From<Epsg9705> for OrthometricPosition {
    fn from(p: Epsg9705) -> Self {
        OrthometricPosition::new(p.lat, p.lon, p.alt)
    }
}

impl From<EllipsoidalPosition> for Epsg4979 {
    fn from(p: EllipsoidalPosition) -> Self {
        Epsg4979 {
            lat: p.latitude,
            lon: p.longitude,
            alt: p.height,
        }
    }
}

/// Convert `input` using a transformation resolved against `ctx`.
/// `output` is left untouched unless the conversion succeeds.
pub fn convert_with<C: GeodeticContext + ?Sized>(
    ctx: &C,
    input: Option<&Epsg9705>,
    output: Option<&mut Epsg4979>,
) -> Result<(), Error> {
    let (Some(input), Some(output)) = (input, output) else {
        return Err(Error::InvalidArgument("null input or output"));
    };
    let txn = VerticalTransformation::resolve(ctx)?;
    *output = txn.apply((*input).into())?.into();
    Ok(())
}

/// A context, and a transformation resolved against it, set up by the first
/// successful call to [get](SharedTransformation::get), and shared read-only
/// by all later ones. A failed setup is reported to the caller at hand, and
/// retried by the next one. An acquired context is kept even if resolution
/// fails, so grids installed later are picked up by the retry.
#[derive(Debug)]
pub struct SharedTransformation<C: GeodeticContext + 'static> {
    ctx: OnceCell<C>,
    txn: OnceCell<VerticalTransformation<'static, C>>,
}

impl<C: GeodeticContext + 'static> SharedTransformation<C> {
    pub const fn new() -> Self {
        SharedTransformation {
            ctx: OnceCell::new(),
            txn: OnceCell::new(),
        }
    }

    pub fn get(
        &'static self,
        acquire: impl FnOnce() -> Result<C, Error>,
    ) -> Result<&'static VerticalTransformation<'static, C>, Error> {
        self.txn.get_or_try_init(|| {
            let ctx = self.ctx.get_or_try_init(acquire)?;
            debug!("Setting up the shared transformation");
            VerticalTransformation::resolve(ctx)
        })
    }
}

impl<C: GeodeticContext + 'static> Default for SharedTransformation<C> {
    fn default() -> Self {
        SharedTransformation::new()
    }
}

#[cfg(feature = "with_plain")]
pub use with_plain::*;

#[cfg(feature = "with_plain")]
mod with_plain {
    use super::*;

    /// Convert a single position, with all resources set up and torn down
    /// within the call
    pub fn alt_wgs84_from_msl(input: &Epsg9705) -> Result<Epsg4979, Error> {
        convert_once::<Plain>((*input).into()).map(Epsg4979::from)
    }

    /// Convert `*input` to `*output`, acquiring and releasing a context for
    /// this call alone. Returns a [Status] code.
    ///
    /// # Safety
    ///
    /// Non-null pointers must be valid and properly aligned. Null
    /// pointers are rejected without being dereferenced.
    #[no_mangle]
    pub unsafe extern "C" fn epsg4979_from_epsg9705(
        input: *const Epsg9705,
        output: *mut Epsg4979,
    ) -> c_int {
        // SAFETY: the caller guarantees validity of non-null pointers
        let (input, output) = unsafe { (input.as_ref(), output.as_mut()) };
        if input.is_none() || output.is_none() {
            return Status::InvalidArgument as c_int;
        }
        let ctx = match Plain::acquire() {
            Ok(ctx) => ctx,
            Err(e) => return e.status() as c_int,
        };
        let status = Status::from(convert_with(&ctx, input, output));
        ctx.release();
        status as c_int
    }

    static SHARED: SharedTransformation<Plain> = SharedTransformation::new();

    /// As [epsg4979_from_epsg9705], but the context and the transformation
    /// are set up by the first successful call, and reused by all later ones.
    /// Safe to call from several threads at once.
    ///
    /// # Safety
    ///
    /// Non-null pointers must be valid and properly aligned. Null
    /// pointers are rejected without being dereferenced.
    #[no_mangle]
    pub unsafe extern "C" fn epsg4979_from_epsg9705_cached(
        input: *const Epsg9705,
        output: *mut Epsg4979,
    ) -> c_int {
        // SAFETY: the caller guarantees validity of non-null pointers
        let (input, output) = unsafe { (input.as_ref(), output.as_mut()) };
        let (Some(input), Some(output)) = (input, output) else {
            return Status::InvalidArgument as c_int;
        };
        let result = SHARED
            .get(Plain::acquire)
            .and_then(|txn| txn.apply((*input).into()))
            .map(|pos| *output = pos.into());
        Status::from(result) as c_int
    }
}

// ----- T E S T S ------------------------------------------------------------------
