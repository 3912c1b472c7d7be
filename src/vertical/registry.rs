//! The coordinate reference systems known by the vertical transformations.
//!
//! This is a fixed lookup table, not a CRS parser: A source system is a
//! compound of WGS 84 and a gravity related height, which is tied to the
//! ellipsoid through one of a short list of candidate geoid grids. The
//! target is always WGS 84 3D, i.e. ellipsoidal heights.

/// WGS 84 (3D): latitude, longitude, ellipsoidal height
pub const WGS84_3D: &str = "EPSG:4979";

/// WGS 84 + MSL height
pub const WGS84_MSL: &str = "EPSG:9705";

/// A compound CRS with a gravity related height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSystem {
    pub code: &'static str,
    pub name: &'static str,
    /// Grid names, in order of preference
    pub grids: &'static [&'static str],
}

const EGM2008_OR_EGM96: [&str; 2] = ["egm08_25.gtx", "egm96_15.gtx"];

#[rustfmt::skip]
const HEIGHT_SYSTEMS: [HeightSystem; 5] = [
    HeightSystem { code: WGS84_MSL,        name: "WGS 84 + MSL height",     grids: &EGM2008_OR_EGM96 },
    HeightSystem { code: "EPSG:4326+5714", name: "WGS 84 + MSL height",     grids: &EGM2008_OR_EGM96 },
    HeightSystem { code: "EPSG:4326+3855", name: "WGS 84 + EGM2008 height", grids: &["egm08_25.gtx"] },
    HeightSystem { code: "EPSG:4326+5773", name: "WGS 84 + EGM96 height",   grids: &["egm96_15.gtx"] },
    HeightSystem { code: "EPSG:4326+5798", name: "WGS 84 + EGM84 height",   grids: &["egm84_15.gtx"] },
];

// Upper case, no surrounding blanks
fn normalized(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Look up a source system by its code (case insensitive)
pub fn height_system(code: &str) -> Option<&'static HeightSystem> {
    let code = normalized(code);
    HEIGHT_SYSTEMS.iter().find(|system| system.code == code)
}

/// True if `code` identifies a system with ellipsoidal heights on WGS 84
pub fn is_ellipsoidal(code: &str) -> bool {
    normalized(code) == WGS84_3D
}

// ----- T E S T S ------------------------------------------------------------------
