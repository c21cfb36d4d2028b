//! Threshold signing.

pub mod shoup;

pub use shoup::{combine_partial_signatures, ShoupSigning};
