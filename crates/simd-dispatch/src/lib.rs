#![warn(missing_docs)]
#![warn(clippy::all)]

//! # Traceline SIMD Dispatch
//!
//! Backend selection and the per-layout kernel function tables for the
//! traceline engines. Two backends exist:
//!
//! - index `0`, `"C Backend"` - portable scalar reference kernels
//! - index `1`, `"SIMD Backend"` - the best vector ISA available: NEON on
//!   aarch64, AVX2 on x86_64 CPUs that support it, otherwise the scalar
//!   Bresenham fallback (named `"Fallback C Backend"`)
//!
//! The active backend is a process-wide atomic selection
//! ([`registry::set_backend`]); engines that prefer an explicit handle can
//! fetch a table once ([`registry::current`], [`registry::scalar_table`],
//! [`registry::simd_table`]) and thread it through their calls.
//!
//! Kernels are straight-line compute loops: they never allocate, never block,
//! and fail only with `BadShape` before touching any output.

mod dispatcher;
mod kernel;
pub mod registry;
pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod avx2;

#[cfg(target_arch = "aarch64")]
mod neon;

pub use dispatcher::CpuFeatures;
pub use kernel::{AggregateMinMaxI16x8Fn, AggregateMinMaxI8Fn, ConvertI16x8Fn, KernelTable};
