//! Process-wide backend selection.
//!
//! The registry keeps one atomic index into two `'static` kernel tables.
//! Switching backends while a conversion is in flight on another thread is
//! safe in the memory-model sense (the in-flight call keeps using the table
//! reference it already loaded) but callers who need a deterministic backend
//! per call should fetch a table once and use the `*_with` engine variants.

use std::sync::atomic::{AtomicU8, Ordering};

use traceline_buffer::{Result, TimelineError};

use crate::dispatcher;
use crate::kernel::KernelTable;
use crate::scalar;

static ACTIVE: AtomicU8 = AtomicU8::new(0);

/// Number of selectable backends.
pub fn backend_count() -> u8 {
    2
}

/// Name of the backend at `index` (0 or 1).
///
/// Index 1 always reports the generic `"SIMD Backend"`; the resolved table
/// name (NEON / AVX2 / fallback) is available via [`active_backend_name`]
/// once selected, or [`simd_table`].
pub fn backend_name(index: u8) -> Result<&'static str> {
    match index {
        0 => Ok("C Backend"),
        1 => Ok("SIMD Backend"),
        _ => Err(TimelineError::InvalidBackend(index)),
    }
}

/// Name of the currently active backend's table.
pub fn active_backend_name() -> &'static str {
    current().name
}

/// Select the process-wide backend by index.
pub fn set_backend(index: u8) -> Result<()> {
    if index >= backend_count() {
        return Err(TimelineError::InvalidBackend(index));
    }
    ACTIVE.store(index, Ordering::Release);
    tracing::debug!(index, backend = active_backend_name(), "backend selected");
    Ok(())
}

/// The currently selected kernel table.
pub fn current() -> &'static KernelTable {
    if ACTIVE.load(Ordering::Acquire) == 0 {
        &scalar::TABLE
    } else {
        dispatcher::simd_table()
    }
}

/// The scalar reference table, independent of the process-wide selection.
pub fn scalar_table() -> &'static KernelTable {
    &scalar::TABLE
}

/// The resolved SIMD table, independent of the process-wide selection.
pub fn simd_table() -> &'static KernelTable {
    dispatcher::simd_table()
}
