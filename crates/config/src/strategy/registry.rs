//! The process-wide slot holding the installed layered strategy.
//!
//! Invariants:
//! - Reads and writes only swap a handle; no strategy code runs while the lock is held.
//! - The installed handle keeps its `configured` flag, so instances created
//!   from the registry report what was actually installed.
//! - Clearing is compare-and-clear: an instance can only remove itself, never
//!   a strategy installed after it.

use std::sync::{Arc, RwLock};

use super::LoadingStrategy;
use super::layered::LayeredLoadingStrategy;

static INSTALLED: RwLock<Option<LayeredLoadingStrategy>> = RwLock::new(None);

/// The currently installed strategy, if any.
pub(crate) fn installed() -> Option<LayeredLoadingStrategy> {
    INSTALLED
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Install `strategy`, returning whatever was installed before.
pub(crate) fn install(strategy: LayeredLoadingStrategy) -> Option<LayeredLoadingStrategy> {
    INSTALLED
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .replace(strategy)
}

/// Clear the slot if it still holds `strategy`. Returns whether it did.
pub(crate) fn uninstall_if(strategy: &Arc<dyn LoadingStrategy>) -> bool {
    let mut slot = INSTALLED
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot
        .as_ref()
        .is_some_and(|current| same_strategy(current.inner(), strategy))
    {
        *slot = None;
        true
    } else {
        false
    }
}

pub(crate) fn is_installed(strategy: &Arc<dyn LoadingStrategy>) -> bool {
    INSTALLED
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .as_ref()
        .is_some_and(|current| same_strategy(current.inner(), strategy))
}

/// Identity by data address; vtable pointers are not compared.
fn same_strategy(a: &Arc<dyn LoadingStrategy>, b: &Arc<dyn LoadingStrategy>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
pub(crate) fn clear() {
    *INSTALLED
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}
