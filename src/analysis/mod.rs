//! Derived views of the merged series.
//!
//! - header metrics (`summary`)
//! - additive seasonal decomposition (`decompose`)
//! - calendar-year means (`resample`)

pub mod decompose;
pub mod resample;
pub mod summary;

pub use decompose::*;
pub use resample::*;
pub use summary::*;
