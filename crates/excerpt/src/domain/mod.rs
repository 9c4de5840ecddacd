//! Fragment model, text codec and coverage algebra.

pub mod codec;
pub mod coverage;
pub mod errors;
pub mod model;

pub use errors::{FragmentError, QuotaError};
pub use model::{Fragment, FragmentSet};
