mod coor4d;
mod position;

pub use coor4d::Coor4D;
pub use position::EllipsoidalPosition;
pub use position::OrthometricPosition;

/// Conversion from the internal representation of geographical
/// coordinates (longitude first, radians) to the conventional one
/// (latitude first, degrees)
pub trait AngularUnits {
    fn to_geo(self) -> Self;
}
