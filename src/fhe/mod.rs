//! Encrypted arithmetic: the backend contract and the numeric kernel.
//!
//! - [`backend`]: the [`FheBackend`] trait every coprocessor binding must
//!   satisfy, plus [`SoftwareFhe`], the cleartext reference backend used by
//!   tests and the demo binary.
//! - [`kernel`]: fixed-point numeric operations (guarded division, Taylor
//!   exponential/logarithm, powers, square root, clamp) composed purely from
//!   backend primitives.

pub mod backend;
pub mod kernel;

pub use backend::{FheBackend, SoftwareFhe};
