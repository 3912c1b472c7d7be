use std::f64::consts::TAU;

/// normalize arbitrary angles to [0, 2π):
#[must_use]
pub fn normalize_positive(angle: f64) -> f64 {
    let angle = angle % TAU;
    if angle < 0. {
        // For tiny negative angles, the sum rounds to 2π, which is outside of the range
        let angle = angle + TAU;
        return if angle < TAU { angle } else { 0. };
    }
    angle
}

// ----- Tests ---------------------------------------------------------------------
