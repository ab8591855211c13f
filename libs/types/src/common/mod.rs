//! Common value types shared by every Tidepool crate

pub mod errors;
pub mod fixed_point;
pub mod identifiers;
