//! Input formats.

pub mod records;
