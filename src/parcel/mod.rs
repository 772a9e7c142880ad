//! Parcel identifiers and the GeoJSON records they resolve to

pub mod types;
pub mod validator;

pub use types::*;
pub use validator::ParcelBatch;
