//! Miscellaneous math functions for general use

/// Free functions for handling and normalizing angles.
pub mod angular;
