//! Probe the local Vulkan installation
//!
//! Usage: `vk_bootstrap_probe [config.toml|config.ron]`

use std::rc::Rc;

use vk_bootstrap::ash::vk;
use vk_bootstrap::logging;
use vk_bootstrap::prelude::*;

fn load_config() -> Result<BootstrapConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => BootstrapConfig::load_from_file(&path)?,
        None => BootstrapConfig::new("Vk Bootstrap Probe"),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting {}", config.application_name);

    let table = Rc::new(AshProcTable::load()?);
    let mut application = VulkanApplication::new(
        Rc::clone(&table),
        &config.descriptor(),
        config.debugging_enabled(),
    );

    if !application.is_valid() {
        return Err(VulkanError::InitializationFailed("Could not create Vulkan instance".to_string()).into());
    }

    log::info!(
        "Instance created (debug report: {})",
        if application.has_debug_report() { "attached" } else { "off" }
    );

    let physical_devices = application.physical_devices();
    log::info!("Found {} physical device(s)", physical_devices.len());

    match application.acquire_first_compatible_logical_device::<VulkanDevice>() {
        Some(device) => {
            let api_version = device.properties().api_version;
            log::info!(
                "Selected {} ({:?}), Vulkan {}.{}.{}",
                device.name(),
                device.physical_device(),
                vk::api_version_major(api_version),
                vk::api_version_minor(api_version),
                vk::api_version_patch(api_version)
            );
            log::info!(
                "Graphics queue family {} -> {:?} (device loaded: {})",
                device.graphics_family(),
                device.graphics_queue(),
                device.device().is_some()
            );
        }
        None => log::warn!("No compatible device found"),
    }

    // Hand the instance to an external owner and tear it down explicitly.
    let instance = application.release_instance_ownership();
    drop(application);
    table.destroy_instance(instance);

    Ok(())
}
