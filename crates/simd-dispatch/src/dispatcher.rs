//! CPU feature detection and SIMD table selection.
//!
//! The architecture decides the SIMD table body: NEON is baseline on
//! aarch64, AVX2 is probed at runtime on x86_64, and everything else falls
//! back to the scalar Bresenham table. The choice is made once and cached.

use std::sync::OnceLock;

use crate::kernel::KernelTable;

/// SIMD capabilities of the current CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatures {
    /// AVX2 support (x86_64 only; always `false` elsewhere).
    pub has_avx2: bool,
}

impl CpuFeatures {
    /// Detect CPU features at runtime.
    ///
    /// On x86_64 this issues a cached CPUID probe via `cpufeatures`. On
    /// aarch64 NEON is assumed present and no probing is needed.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            cpufeatures::new!(cpuid_avx2, "avx2");
            Self {
                has_avx2: cpuid_avx2::get(),
            }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            Self { has_avx2: false }
        }
    }
}

/// The SIMD backend table for this process.
///
/// Selected once on first use:
/// - aarch64 → `"Neon SIMD Backend"`
/// - x86_64 with AVX2 → `"Intel AVX2 SIMD Backend"`
/// - otherwise → `"Fallback C Backend"` (scalar Bresenham kernels)
pub(crate) fn simd_table() -> &'static KernelTable {
    static CHOICE: OnceLock<&'static KernelTable> = OnceLock::new();
    CHOICE.get_or_init(|| {
        let table = select_simd_table();
        tracing::debug!(backend = table.name, "selected SIMD backend table");
        table
    })
}

#[cfg(target_arch = "aarch64")]
fn select_simd_table() -> &'static KernelTable {
    &crate::neon::TABLE
}

#[cfg(target_arch = "x86_64")]
fn select_simd_table() -> &'static KernelTable {
    if CpuFeatures::detect().has_avx2 {
        &crate::avx2::TABLE
    } else {
        &crate::scalar::FALLBACK_TABLE
    }
}

#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
fn select_simd_table() -> &'static KernelTable {
    &crate::scalar::FALLBACK_TABLE
}
