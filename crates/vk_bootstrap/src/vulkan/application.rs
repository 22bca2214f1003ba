//! Vulkan application bootstrap
//!
//! [`VulkanApplication`] creates the instance, attaches debug reporting when
//! it is wanted and available, and hands out physical and logical devices.
//!
//! Construction never fails loudly. Every setup step that goes wrong leaves
//! the application invalid, and callers check [`VulkanApplication::is_valid`]
//! before using it. Resources acquired before a failing step are released.

use ash::vk;
use std::ffi::{c_char, CString};
use std::rc::Rc;

use super::capabilities;
use super::debug_report::DebugReport;
use super::device::CompatibleDevice;
use super::handle::InstanceHandle;
use super::proc_table::ProcTable;

/// Engine name reported in the application info
pub const ENGINE_NAME: &str = "VkBootstrap";

/// Engine version reported in the application info
pub const ENGINE_VERSION: u32 = vk::make_api_version(0, 1, 0, 0);

/// Application identity and requested instance extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    /// Application name reported to the driver
    pub name: String,
    /// Instance extensions requested by the application
    pub extensions: Vec<String>,
    /// Packed application version
    pub application_version: u32,
    /// Packed Vulkan API version
    pub api_version: u32,
}

/// Owner of a Vulkan instance and its optional debug report
pub struct VulkanApplication<P: ProcTable + 'static> {
    // Declared before `instance` so the callback is destroyed first.
    debug_report: Option<DebugReport>,
    instance: InstanceHandle,
    table: Rc<P>,
    api_version: u32,
    valid: bool,
}

fn c_string(value: &str) -> CString {
    CString::new(value.replace('\0', "")).unwrap_or_default()
}

impl<P: ProcTable + 'static> VulkanApplication<P> {
    /// Create the instance described by `descriptor`
    ///
    /// `debugging_enabled` is the process-wide debug toggle; debug reporting
    /// and validation layers are only requested when it is set.
    pub fn new(table: Rc<P>, descriptor: &ApplicationDescriptor, debugging_enabled: bool) -> Self {
        let mut application = Self {
            debug_report: None,
            instance: InstanceHandle::null(),
            table,
            api_version: descriptor.api_version,
            valid: false,
        };

        let table = Rc::clone(&application.table);

        // Configure extensions.
        let enable_instance_debugging =
            capabilities::should_enable_diagnostics(&*table, debugging_enabled);

        let mut extensions: Vec<CString> =
            descriptor.extensions.iter().map(|ext| c_string(ext)).collect();
        if enable_instance_debugging {
            extensions.push(DebugReport::extension_name().to_owned());
        }
        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|ext| ext.as_ptr()).collect();

        // Configure layers.
        let layers: Vec<CString> = capabilities::layers_to_enable(&*table, debugging_enabled)
            .iter()
            .map(|layer| c_string(layer))
            .collect();
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|layer| layer.as_ptr()).collect();

        // Configure init structs.
        let app_name = c_string(&descriptor.name);
        let engine_name = c_string(ENGINE_NAME);
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(descriptor.application_version)
            .engine_name(&engine_name)
            .engine_version(ENGINE_VERSION)
            .api_version(descriptor.api_version);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        let raw_instance = match unsafe { table.create_instance(&create_info) } {
            Ok(instance) => instance,
            Err(result) => {
                log::warn!("Could not create application instance: {result:?}");
                return application;
            }
        };

        // Owned from here on so every later failure path destroys it.
        let instance = Self::own_instance(&table, raw_instance);

        if !table.setup_instance_proc_addresses(raw_instance) {
            log::warn!("Could not setup instance proc addresses");
            return application;
        }

        application.instance = instance;

        if enable_instance_debugging {
            let debug_report = DebugReport::new(&table, &application.instance);
            if debug_report.is_valid() {
                application.debug_report = Some(debug_report);
                log::debug!("Debug reporting is enabled");
            } else {
                log::info!("Vulkan debugging was enabled but could not be setup for this instance");
            }
        }

        application.valid = true;
        application
    }

    fn own_instance(table: &Rc<P>, instance: vk::Instance) -> InstanceHandle {
        let table = Rc::clone(table);
        InstanceHandle::new(instance, move |instance| {
            log::info!("Destroying Vulkan instance");
            table.destroy_instance(instance);
        })
    }

    /// Whether the instance was created and its entry points resolved
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The API version requested at construction
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// The owned instance handle; null when invalid or released
    pub fn instance(&self) -> &InstanceHandle {
        &self.instance
    }

    /// Whether a debug report callback is attached
    pub fn has_debug_report(&self) -> bool {
        self.debug_report.is_some()
    }

    /// Transfer ownership of the instance to the caller
    ///
    /// The application will no longer destroy the instance. Returns the null
    /// handle if there is nothing left to transfer.
    pub fn release_instance_ownership(&mut self) -> vk::Instance {
        self.instance.release_ownership()
    }

    /// Physical devices in enumeration order
    ///
    /// Empty when the application is invalid, the instance was released,
    /// enumeration failed or no devices exist.
    pub fn physical_devices(&self) -> Vec<vk::PhysicalDevice> {
        if !self.is_valid() {
            return Vec::new();
        }

        if self.instance.is_null() {
            log::debug!("Instance ownership was released, cannot enumerate physical devices");
            return Vec::new();
        }

        match self.table.enumerate_physical_devices(self.instance.get()) {
            Ok(devices) => {
                if devices.is_empty() {
                    log::debug!("No physical devices found");
                }
                devices
            }
            Err(result) => {
                log::debug!("Could not enumerate physical devices: {result:?}");
                Vec::new()
            }
        }
    }

    /// The first logical device, in enumeration order, that reports valid
    pub fn acquire_first_compatible_logical_device<D: CompatibleDevice<P>>(&self) -> Option<D> {
        for physical_device in self.physical_devices() {
            let logical_device = D::new(&self.table, physical_device);
            if logical_device.is_valid() {
                return Some(logical_device);
            }
        }

        log::debug!("Could not acquire compatible logical device");
        None
    }
}

impl<P: ProcTable + 'static> std::fmt::Debug for VulkanApplication<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanApplication")
            .field("instance", &self.instance)
            .field("debug_report", &self.debug_report)
            .field("api_version", &self.api_version)
            .field("valid", &self.valid)
            .finish_non_exhaustive()
    }
}
