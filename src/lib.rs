//! Fixed-point streaming DSP core for a closed-loop, phase-targeted neural
//! stimulation pipeline: auto-ranging, IIR/FIR filter banks, an analytic
//! peak-trough-zero-crossing estimator, hysteresis detection and a
//! phase-aligned trigger generator.
//!
//! Every module advances one tick (one input sample, or one `[bank][channel]`
//! slice) per call and performs no allocation and no I/O on that path; see
//! [`error`] for the narrow set of operations that are fallible at all.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod analytic;
pub mod autorange;
pub mod biquad;
pub mod detect;
pub mod error;
pub mod fir;
pub mod int;
pub mod lut;
pub mod modulo;
pub mod slice;
pub mod trigger;
pub mod vote;

#[cfg(feature = "std")]
pub mod csv_io;

pub use int::FixedInt;
pub use slice::Slice;
