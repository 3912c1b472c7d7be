//! Reader for the GTX vertical grid format (NOAA VDatum, also used by PROJ).
//!
//! A 40 byte big-endian header: the latitude and longitude of the
//! south-west node, the latitude and longitude spacing (all f64,
//! decimal degrees), and the number of rows and columns (i32).
//! Then `rows * cols` big-endian f32 values, row by row from south to
//! north, each row from west to east.

use crate::Error;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

// Nodes without data are flagged with this value
const GTX_NULL: f32 = -88.8888;

/// Read a GTX grid, and reorganize it north-to-south. Returns a header
/// in the order expected by [Grid::new](super::Grid::new) and the grid
/// values, with null nodes represented as `NaN`.
pub fn gtx_grid_reader(buf: &[u8]) -> Result<(Vec<f64>, Vec<f32>), Error> {
    let mut reader = Cursor::new(buf);

    let lat_s = reader.read_f64::<BigEndian>()?;
    let lon_w = reader.read_f64::<BigEndian>()?;
    let dlat = reader.read_f64::<BigEndian>()?;
    let dlon = reader.read_f64::<BigEndian>()?;
    let rows = reader.read_i32::<BigEndian>()?;
    let cols = reader.read_i32::<BigEndian>()?;

    if rows < 2 || cols < 2 || !(dlat.is_finite() && dlon.is_finite()) || dlat <= 0.0 || dlon <= 0.0 {
        return Err(Error::General("Malformed GTX header"));
    }
    let rows = rows as usize;
    let cols = cols as usize;
    let bytes = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(40));
    if bytes.map_or(true, |bytes| buf.len() < bytes) {
        return Err(Error::General("Incomplete GTX grid"));
    }

    let mut south_to_north = vec![0_f32; rows * cols];
    reader.read_f32_into::<BigEndian>(&mut south_to_north)?;

    let mut grid = Vec::with_capacity(rows * cols);
    for row in south_to_north.chunks_exact(cols).rev() {
        grid.extend(row.iter().map(|&v| {
            if (v - GTX_NULL).abs() < 1e-4 {
                f32::NAN
            } else {
                v
            }
        }));
    }

    let lat_n = lat_s + (rows - 1) as f64 * dlat;
    let lon_e = lon_w + (cols - 1) as f64 * dlon;

    let header = vec![
        lat_n.to_radians(),
        lat_s.to_radians(),
        lon_w.to_radians(),
        lon_e.to_radians(),
        dlat.to_radians(),
        dlon.to_radians(),
        1.0,
    ];
    Ok((header, grid))
}

// ----- T E S T S ------------------------------------------------------------------
