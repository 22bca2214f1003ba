//! Instance capability probing
//!
//! Decides which optional instance extensions and layers to request. All
//! queries are best-effort: a failed capability query counts as "not
//! supported".

use std::ffi::CStr;

use super::debug_report::DebugReport;
use super::proc_table::ProcTable;

/// Validation layers in the order the loader should stack them
///
/// Only layers the loader reports as available are requested.
pub const VALIDATION_LAYER_CANDIDATES: &[&str] = &[
    "VK_LAYER_KHRONOS_validation",
    "VK_LAYER_LUNARG_standard_validation",
];

/// Whether diagnostics should be attached to a new instance
pub fn should_enable_diagnostics<P: ProcTable>(table: &P, debugging_enabled: bool) -> bool {
    debugging_enabled && DebugReport::extension_supported(table)
}

/// Layers to request for a new instance
pub fn layers_to_enable<P: ProcTable>(table: &P, debugging_enabled: bool) -> Vec<String> {
    if !debugging_enabled {
        return Vec::new();
    }

    let available = match table.enumerate_instance_layer_properties() {
        Ok(properties) => properties,
        Err(result) => {
            log::debug!("Could not enumerate instance layers: {result:?}");
            return Vec::new();
        }
    };

    let layers: Vec<String> = VALIDATION_LAYER_CANDIDATES
        .iter()
        .filter(|candidate| {
            available.iter().any(|layer| {
                let name = unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) };
                name.to_bytes() == candidate.as_bytes()
            })
        })
        .map(|candidate| (*candidate).to_string())
        .collect();

    if layers.is_empty() {
        log::info!("Debugging enabled but no validation layers are installed");
    }

    layers
}
