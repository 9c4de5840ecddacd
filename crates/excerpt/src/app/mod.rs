//! Application layer: quota evaluation and outline rendering over the domain algebra.

pub mod outline;
pub mod slice;
