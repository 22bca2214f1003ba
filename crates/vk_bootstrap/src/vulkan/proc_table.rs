//! Loaded Vulkan function table
//!
//! [`ProcTable`] is the seam between the bootstrap logic and the Vulkan
//! loader. [`AshProcTable`] implements it on top of `ash`; tests drive the
//! same logic through a recording double.

use ash::prelude::VkResult;
use ash::vk;
use ash::extensions::ext::DebugReport as DebugReportLoader;
use ash::{Entry, Instance};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, CStr};
use std::ptr;

use super::error::{VulkanError, VulkanResult};

/// Instance-level entry points that must resolve before an instance is usable
const REQUIRED_INSTANCE_FUNCTIONS: &[&[u8]] = &[
    b"vkDestroyInstance\0",
    b"vkEnumeratePhysicalDevices\0",
    b"vkGetPhysicalDeviceProperties\0",
    b"vkGetPhysicalDeviceQueueFamilyProperties\0",
    b"vkCreateDevice\0",
];

/// The subset of the Vulkan API the bootstrap sequence calls into
///
/// Every call reports success or failure; none of them panic.
pub trait ProcTable {
    /// Instance extensions exposed by the loader and implicit layers
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>>;

    /// Instance layers available to the loader
    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>>;

    /// Create a new instance
    ///
    /// # Safety
    ///
    /// Every pointer reachable from `create_info` must be valid for the
    /// duration of the call.
    unsafe fn create_instance(&self, create_info: &vk::InstanceCreateInfo) -> VkResult<vk::Instance>;

    /// Resolve instance-level entry points against `instance`
    fn setup_instance_proc_addresses(&self, instance: vk::Instance) -> bool;

    /// Destroy an instance previously returned by [`ProcTable::create_instance`]
    fn destroy_instance(&self, instance: vk::Instance);

    /// Physical devices in the order the implementation reports them
    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>>;

    /// Register a `VK_EXT_debug_report` callback on `instance`
    fn create_debug_report_callback(
        &self,
        instance: vk::Instance,
        create_info: &vk::DebugReportCallbackCreateInfoEXT,
    ) -> VkResult<vk::DebugReportCallbackEXT>;

    /// Unregister a callback created with [`ProcTable::create_debug_report_callback`]
    fn destroy_debug_report_callback(&self, instance: vk::Instance, callback: vk::DebugReportCallbackEXT);
}

/// Resolved instance tables and the physical devices each one reported
///
/// Several applications may share one [`AshProcTable`]; every lookup goes
/// through the instance that owns the handle.
#[derive(Debug)]
struct InstanceRegistry<T> {
    instances: HashMap<vk::Instance, T>,
    owners: HashMap<vk::PhysicalDevice, vk::Instance>,
}

impl<T> Default for InstanceRegistry<T> {
    fn default() -> Self {
        Self {
            instances: HashMap::new(),
            owners: HashMap::new(),
        }
    }
}

impl<T> InstanceRegistry<T> {
    fn insert(&mut self, instance: vk::Instance, table: T) {
        self.instances.insert(instance, table);
    }

    fn get(&self, instance: vk::Instance) -> Option<&T> {
        self.instances.get(&instance)
    }

    fn record_devices(&mut self, instance: vk::Instance, devices: &[vk::PhysicalDevice]) {
        for device in devices {
            self.owners.insert(*device, instance);
        }
    }

    fn owner_of(&self, physical_device: vk::PhysicalDevice) -> Option<&T> {
        self.owners
            .get(&physical_device)
            .and_then(|instance| self.instances.get(instance))
    }

    fn remove(&mut self, instance: vk::Instance) -> Option<T> {
        self.owners.retain(|_, owner| *owner != instance);
        self.instances.remove(&instance)
    }
}

/// [`ProcTable`] backed by the system Vulkan loader
pub struct AshProcTable {
    entry: Entry,
    loaded: RefCell<InstanceRegistry<Instance>>,
}

impl AshProcTable {
    /// Load the Vulkan library
    pub fn load() -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::LoaderUnavailable(format!("{e:?}")))?;
        Ok(Self::from_entry(entry))
    }

    /// Wrap an already loaded entry
    pub fn from_entry(entry: Entry) -> Self {
        Self {
            entry,
            loaded: RefCell::new(InstanceRegistry::default()),
        }
    }

    /// Instance-level function table of the instance that enumerated `physical_device`
    pub fn instance_for(&self, physical_device: vk::PhysicalDevice) -> Option<Instance> {
        self.loaded.borrow().owner_of(physical_device).cloned()
    }

    fn resolves(&self, instance: vk::Instance, name: &[u8]) -> bool {
        debug_assert_eq!(name.last(), Some(&0));
        unsafe {
            self.entry
                .get_instance_proc_addr(instance, name.as_ptr().cast::<c_char>())
                .is_some()
        }
    }

    fn loaded_instance(&self, instance: vk::Instance) -> Option<Instance> {
        self.loaded.borrow().get(instance).cloned()
    }

    fn debug_report_loader(&self, instance: vk::Instance) -> Option<DebugReportLoader> {
        self.loaded_instance(instance)
            .map(|loaded| DebugReportLoader::new(&self.entry, &loaded))
    }
}

impl ProcTable for AshProcTable {
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        unsafe { self.entry.enumerate_instance_extension_properties(None) }
    }

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        unsafe { self.entry.enumerate_instance_layer_properties() }
    }

    unsafe fn create_instance(&self, create_info: &vk::InstanceCreateInfo) -> VkResult<vk::Instance> {
        let mut instance = vk::Instance::null();
        (self.entry.fp_v1_0().create_instance)(create_info, ptr::null(), &mut instance)
            .result_with_success(instance)
    }

    fn setup_instance_proc_addresses(&self, instance: vk::Instance) -> bool {
        if instance == vk::Instance::null() {
            return false;
        }

        for name in REQUIRED_INSTANCE_FUNCTIONS {
            if !self.resolves(instance, name) {
                let name = CStr::from_bytes_with_nul(name).map_or_else(
                    |_| "<invalid name>".into(),
                    CStr::to_string_lossy,
                );
                log::debug!("Instance entry point {name} could not be resolved");
                return false;
            }
        }

        let loaded = unsafe { Instance::load(self.entry.static_fn(), instance) };
        self.loaded.borrow_mut().insert(instance, loaded);
        true
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        let removed = self.loaded.borrow_mut().remove(instance);
        let loaded = match removed {
            Some(loaded) => loaded,
            // Entry points were never fully resolved for this handle.
            None if self.resolves(instance, b"vkDestroyInstance\0") => unsafe {
                Instance::load(self.entry.static_fn(), instance)
            },
            None => {
                log::warn!("vkDestroyInstance unavailable, instance {instance:?} not destroyed");
                return;
            }
        };
        unsafe { loaded.destroy_instance(None) };
    }

    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        let loaded = self
            .loaded_instance(instance)
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        let devices = unsafe { loaded.enumerate_physical_devices() }?;
        self.loaded.borrow_mut().record_devices(instance, &devices);
        Ok(devices)
    }

    fn create_debug_report_callback(
        &self,
        instance: vk::Instance,
        create_info: &vk::DebugReportCallbackCreateInfoEXT,
    ) -> VkResult<vk::DebugReportCallbackEXT> {
        if !self.resolves(instance, b"vkCreateDebugReportCallbackEXT\0") {
            return Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT);
        }
        let loader = self
            .debug_report_loader(instance)
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        unsafe { loader.create_debug_report_callback(create_info, None) }
    }

    fn destroy_debug_report_callback(&self, instance: vk::Instance, callback: vk::DebugReportCallbackEXT) {
        if !self.resolves(instance, b"vkDestroyDebugReportCallbackEXT\0") {
            log::warn!("vkDestroyDebugReportCallbackEXT unavailable");
            return;
        }
        match self.debug_report_loader(instance) {
            Some(loader) => unsafe { loader.destroy_debug_report_callback(callback, None) },
            None => log::warn!("Instance {instance:?} not loaded, debug report callback leaked"),
        }
    }
}
