//! Input data that does not come from files.

pub mod sample;
