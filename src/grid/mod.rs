//! Grid characteristics and interpolation.

mod gtx;

use crate::coordinate::Coor4D;
use crate::math::angular;
use crate::Error;
use std::f64::consts::TAU;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Grid characteristics and interpolation.
///
/// The grid is stored row by row, from north to south, with each row
/// running from west to east. All angular elements of the header are
/// in radians. For geoid models (the only kind used by the vertical
/// transformations), there is a single band, with values in meters.
///
/// Includes parsers for grids in the Gravsoft text format and the
/// GTX binary format.
#[derive(Debug, Clone)]
pub struct Grid {
    pub name: String,
    pub lat_n: f64, // Latitude of the first (northernmost) row of the grid
    pub lat_s: f64, // Latitude of the last (southernmost) row of the grid
    pub lon_w: f64, // Longitude of the first (westernmost) column of each row
    pub lon_e: f64, // Longitude of the last (easternmost) column of each row
    pub dlat: f64,  // Signed distance between two consecutive rows
    pub dlon: f64,  // Signed distance between two consecutive columns
    pub rows: usize,
    pub cols: usize,
    pub bands: usize,
    pub grid: Vec<f32>,
}

impl Grid {
    /// `header` is `[lat_n, lat_s, lon_w, lon_e, dlat, dlon, bands]`,
    /// angles in radians. The signs of `dlat` and `dlon` are ignored.
    pub fn new(name: &str, header: &[f64], grid: &[f32]) -> Result<Self, Error> {
        if header.len() < 7 {
            return Err(Error::General("Malformed header"));
        }

        let lat_n = header[0];
        let lat_s = header[1];
        let lon_w = header[2];
        let lon_e = header[3];
        if !header.iter().all(|h| h.is_finite()) {
            return Err(Error::General("Malformed header"));
        }
        if lat_n <= lat_s || lon_e <= lon_w {
            return Err(Error::General(
                "Grid must be organized north-to-south, west-to-east",
            ));
        }

        let dlat = header[4].copysign(lat_s - lat_n);
        let dlon = header[5].copysign(lon_e - lon_w);

        let malformed = || Error::General("Malformed grid");
        let rows = node_count(lat_s - lat_n, dlat).ok_or_else(malformed)?;
        let cols = node_count(lon_e - lon_w, dlon).ok_or_else(malformed)?;
        let bands = node_count(header[6] - 1.0, 1.0).ok_or_else(malformed)?;
        let elements = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(bands))
            .ok_or_else(malformed)?;

        // We need at least one full cell to interpolate in
        if rows < 2 || cols < 2 || elements > grid.len() {
            return Err(malformed());
        }

        Ok(Grid {
            name: name.to_string(),
            lat_n,
            lat_s,
            lon_w,
            lon_e,
            dlat,
            dlon,
            rows,
            cols,
            bands,
            grid: Vec::from(&grid[..elements]),
        })
    }

    /// Parse a grid in the Gravsoft text format
    pub fn gravsoft(name: &str, buf: &[u8]) -> Result<Self, Error> {
        let (header, grid) = gravsoft_grid_reader(buf)?;
        Grid::new(name, &header, &grid)
    }

    /// Parse a grid in the GTX binary format
    pub fn gtx(name: &str, buf: &[u8]) -> Result<Self, Error> {
        let (header, grid) = gtx::gtx_grid_reader(buf)?;
        Grid::new(name, &header, &grid)
    }

    /// Parse a grid, selecting the format from the extension of `name`:
    /// `.gtx` is GTX, everything else is taken to be Gravsoft
    pub fn from_blob(name: &str, buf: &[u8]) -> Result<Self, Error> {
        let ext = Path::new(name)
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or_default();
        if ext.eq_ignore_ascii_case("gtx") {
            return Grid::gtx(name, buf);
        }
        Grid::gravsoft(name, buf)
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// True if the grid covers the full circle of longitudes, with or
    /// without repeating the first column at the east end
    pub fn is_global(&self) -> bool {
        self.cols as f64 * self.dlon.abs() + 1e-9 >= TAU
    }

    // A global grid without a repeated first column: The cell east
    // of the last column has the first column as its eastern edge
    fn has_open_seam(&self) -> bool {
        self.is_global() && ((self.cols - 1) as f64 * self.dlon.abs() + 1e-9) < TAU
    }

    // Bring the longitude into the range of the grid, if possible.
    // Handles the [-180; 180) vs. [0; 360) convention mismatch
    fn wrapped(&self, at: &Coor4D) -> Coor4D {
        let mut at = *at;
        if self.is_global() {
            at[0] = self.lon_w + angular::normalize_positive(at[0] - self.lon_w);
            return at;
        }
        let grace = self.dlon.abs();
        if at[0] < self.lon_w - grace && at[0] + TAU <= self.lon_e + grace {
            at[0] += TAU;
        } else if at[0] > self.lon_e + grace && at[0] - TAU >= self.lon_w - grace {
            at[0] -= TAU;
        }
        at
    }

    /// Determine whether a given coordinate falls within the grid boundaries + margin.
    /// `margin` is given in grid cell units.
    /// "On the boundary" qualifies as within for westernmost and southernmost, or for
    /// all boundaries if `all_inclusive==true`.
    pub fn contains(&self, position: &Coor4D, margin: f64, all_inclusive: bool) -> bool {
        let position = self.wrapped(position);
        let (lon, lat) = position.xy();

        let lat_grace = margin * self.dlat.abs();
        let lat_min = self.lat_s - lat_grace;
        let lat_max = self.lat_n + lat_grace;
        if lat != lat.clamp(lat_min, lat_max) {
            return false;
        }

        // After wrapping, any longitude is inside a global grid
        if self.is_global() {
            return all_inclusive || lat != lat_max;
        }

        let lon_grace = margin * self.dlon.abs();
        let lon_min = self.lon_w - lon_grace;
        let lon_max = self.lon_e + lon_grace;
        if lon != lon.clamp(lon_min, lon_max) {
            return false;
        }

        // If we fell through all the way down here, we're inside the grid, but we
        // still need to take care of the boundary conventions
        if (!all_inclusive) && ((lon == lon_max) || (lat == lat_max)) {
            return false;
        }
        true
    }

    // The grid is one flat vector, so all indexing below is done by hand
    /// Bilinear interpolation of the grid values at `at`.
    ///
    /// Returns `None` if the point is not contained in the grid, in the sense
    /// of the `contains` method with the given `margin`. Null nodes propagate
    /// as `NaN`s in the result.
    pub fn at(&self, at: &Coor4D, margin: f64) -> Option<Coor4D> {
        if !self.contains(at, margin, true) {
            return None;
        };
        let at = self.wrapped(at);

        let dlat = self.dlat.abs();
        let dlon = self.dlon.abs();

        // The interpolation coordinate relative to the grid origin
        let rlon = at[0] - self.lon_w;
        let rlat = self.lat_n - at[1];

        // The (row, column) of the lower left node of the grid cell containing
        // the interpolation coordinate - or, in the case of extrapolation:
        // the nearest cell inside the grid.
        let last_col = if self.has_open_seam() {
            self.cols - 1
        } else {
            self.cols - 2
        };
        let row = (rlat / dlat).ceil() as i64;
        let col = (rlon / dlon).floor() as i64;
        let row = row.clamp(1_i64, (self.rows - 1) as i64) as usize;
        let col = col.clamp(0_i64, last_col as i64) as usize;
        let next = if col + 1 == self.cols { 0 } else { col + 1 };

        // Index of the first band element of each corner value
        #[rustfmt::skip]
        let (ll, lr, ul, ur) = (
            self.bands * (self.cols *  row      + col ),
            self.bands * (self.cols *  row      + next),
            self.bands * (self.cols * (row - 1) + col ),
            self.bands * (self.cols * (row - 1) + next),
        );

        let ll_lon = self.lon_w + col as f64 * dlon;
        let ll_lat = self.lat_n - row as f64 * dlat;

        // Cell relative, cell unit coordinates in a right handed CS
        let rlon = (at[0] - ll_lon) / dlon;
        let rlat = (at[1] - ll_lat) / dlat;

        // We cannot return more than 4 bands in a Coor4D,
        // so we ignore any exceeding bands
        let maxbands = self.bands.min(4);

        // Interpolate (or extrapolate, if we're outside of the physical grid)
        let mut result = Coor4D::origin();
        for i in 0..maxbands {
            let left = (1. - rlat) * self.grid[ll + i] as f64 + rlat * self.grid[ul + i] as f64;
            let right = (1. - rlat) * self.grid[lr + i] as f64 + rlat * self.grid[ur + i] as f64;
            result[i] = (1. - rlon) * left + rlon * right;
        }

        Some(result)
    }
}

// Far beyond any real geoid model: a 1 arc second global grid has
// 1_296_001 columns
const MAX_NODES_PER_AXIS: f64 = 16_777_216.0;

// The number of nodes along an axis, given its extent and the node spacing.
// `None` for counts that cannot come from a sane header
fn node_count(extent: f64, spacing: f64) -> Option<usize> {
    let n = (extent / spacing + 1.5).floor();
    if !n.is_finite() || n < 1.0 || n > MAX_NODES_PER_AXIS {
        return None;
    }
    Some(n as usize)
}

// Convert the header of a Gravsoft geoid from decimal degrees to radians.
// Geoid values are in meters, so the grid itself is left as is
fn normalize_gravsoft_header(header: &mut [f64]) -> Result<(), Error> {
    let (lat_n, lat_s, lon_w, lon_e) = (header[0], header[1], header[2], header[3]);
    // Projected grids are datum shift grids, not geoid models
    if lat_n.abs() > 90.0 || lat_s.abs() > 90.0 || lon_w.abs() > 720.0 || lon_e.abs() > 720.0 {
        return Err(Error::General(
            "Malformed Gravsoft header: boundaries must be geographical, in degrees",
        ));
    }
    for h in header.iter_mut().take(6) {
        *h = h.to_radians();
    }
    Ok(())
}

/// Read a gravsoft grid. Discard '#'-style comments.
///
/// Returns a header in the order expected by [Grid::new], and the grid values.
/// Unreadable values are represented as `NaN`.
pub fn gravsoft_grid_reader(buf: &[u8]) -> Result<(Vec<f64>, Vec<f32>), Error> {
    let all = std::io::BufReader::new(buf);
    let mut grid = Vec::<f32>::new();
    let mut header = Vec::<f64>::new();

    for line in all.lines() {
        // Remove comments
        let line = line?;
        let line = line.split('#').next().unwrap_or_default();
        // Convert to f64
        for item in line.split_whitespace() {
            let value = item.parse::<f64>().unwrap_or(f64::NAN);
            // In Gravsoft grids, the header is the first 6 numbers of the file
            if header.len() < 6 {
                header.push(value);
            } else {
                grid.push(value as f32);
            }
        }
    }

    if header.len() < 6 {
        return Err(Error::General("Incomplete Gravsoft header"));
    }
    if !header.iter().all(|h| h.is_finite()) {
        return Err(Error::General("Malformed Gravsoft header"));
    }

    // The Gravsoft header has lat_s before lat_n
    header.swap(0, 1);

    let lat_n = header[0];
    let lat_s = header[1];
    let lon_w = header[2];
    let lon_e = header[3];
    let dlat = header[4];
    let dlon = header[5];
    if dlat == 0. || dlon == 0. {
        return Err(Error::General("Malformed Gravsoft header"));
    }

    // Count the number of bands
    let malformed = || Error::General("Malformed Gravsoft header");
    let rows = node_count(lat_n - lat_s, dlat.abs()).ok_or_else(malformed)?;
    let cols = node_count(lon_e - lon_w, dlon.abs()).ok_or_else(malformed)?;
    let nodes = rows.checked_mul(cols).ok_or_else(malformed)?;
    let bands = grid.len() / nodes;
    if bands < 1 {
        return Err(Error::General("Incomplete Gravsoft grid"));
    }

    if nodes * bands != grid.len() {
        return Err(Error::General(
            "Unrecognized material at end of Gravsoft grid",
        ));
    }

    if bands > 1 {
        return Err(Error::General(
            "Unsupported number of bands in Gravsoft grid: geoid models have exactly 1",
        ));
    }

    header.push(bands as f64);

    // Handle linear/angular conversions
    normalize_gravsoft_header(&mut header)?;
    Ok((header, grid))
}

/// Find the most appropriate grid value from a stack (i.e. slice) of grids.
/// Search the grids in slice order and return the first hit.
/// If no hits are found, try once more, this time adding a half grid-cell
/// margin around each grid
pub fn grids_at(grids: &[Arc<Grid>], coord: &Coor4D) -> Option<Coor4D> {
    for margin in [0.0, 0.5] {
        for grid in grids.iter() {
            let d = grid.at(coord, margin);
            if d.is_some() {
                return d;
            }
        }
    }
    None
}

// ----- T E S T S ------------------------------------------------------------------
