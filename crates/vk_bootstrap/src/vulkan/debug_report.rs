//! `VK_EXT_debug_report` attachment
//!
//! Routes validation and driver reports for one instance into the `log`
//! facade. The attachment is optional: when it cannot be created it reports
//! itself invalid and the instance carries on without it.

use ash::vk;
use std::ffi::{c_char, c_void, CStr};
use std::rc::Rc;

use super::handle::ScopedHandle;
use super::proc_table::ProcTable;

/// Debug report callback registered on an instance
#[derive(Debug)]
pub struct DebugReport {
    callback: ScopedHandle<vk::DebugReportCallbackEXT>,
}

impl DebugReport {
    /// Name of the instance extension that provides debug reporting
    pub fn extension_name() -> &'static CStr {
        vk::ExtDebugReportFn::name()
    }

    /// Whether the loader exposes the debug report extension
    pub fn extension_supported<P: ProcTable>(table: &P) -> bool {
        let extensions = match table.enumerate_instance_extension_properties() {
            Ok(extensions) => extensions,
            Err(result) => {
                log::debug!("Could not enumerate instance extensions: {result:?}");
                return false;
            }
        };

        extensions.iter().any(|extension| {
            let name = unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) };
            name == Self::extension_name()
        })
    }

    /// Register a callback on `instance`
    ///
    /// Failure is not an error; check [`DebugReport::is_valid`].
    pub fn new<P: ProcTable + 'static>(table: &Rc<P>, instance: &ScopedHandle<vk::Instance>) -> Self {
        if instance.is_null() {
            return Self { callback: ScopedHandle::null() };
        }

        let create_info = vk::DebugReportCallbackCreateInfoEXT::builder()
            .flags(
                vk::DebugReportFlagsEXT::ERROR
                    | vk::DebugReportFlagsEXT::WARNING
                    | vk::DebugReportFlagsEXT::PERFORMANCE_WARNING,
            )
            .pfn_callback(Some(debug_report_callback));

        let raw_instance = instance.get();
        match table.create_debug_report_callback(raw_instance, &create_info) {
            Ok(callback) => {
                let table = Rc::clone(table);
                Self {
                    callback: ScopedHandle::new(callback, move |callback| {
                        table.destroy_debug_report_callback(raw_instance, callback);
                    }),
                }
            }
            Err(result) => {
                log::debug!("Could not create debug report callback: {result:?}");
                Self { callback: ScopedHandle::null() }
            }
        }
    }

    /// Whether a callback is registered
    pub fn is_valid(&self) -> bool {
        !self.callback.is_null()
    }

    /// The registered callback handle
    pub fn handle(&self) -> vk::DebugReportCallbackEXT {
        self.callback.get()
    }
}

fn log_level(flags: vk::DebugReportFlagsEXT) -> log::Level {
    if flags.contains(vk::DebugReportFlagsEXT::ERROR) {
        log::Level::Error
    } else if flags.intersects(vk::DebugReportFlagsEXT::WARNING | vk::DebugReportFlagsEXT::PERFORMANCE_WARNING) {
        log::Level::Warn
    } else if flags.contains(vk::DebugReportFlagsEXT::INFORMATION) {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

unsafe fn lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_report_callback(
    flags: vk::DebugReportFlagsEXT,
    object_type: vk::DebugReportObjectTypeEXT,
    _object: u64,
    _location: usize,
    message_code: i32,
    p_layer_prefix: *const c_char,
    p_message: *const c_char,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let prefix = lossy(p_layer_prefix);
    let message = lossy(p_message);

    log::log!(
        log_level(flags),
        "[Vulkan] [{}] {:?} ({}) - {}",
        prefix,
        object_type,
        message_code,
        message
    );

    vk::FALSE
}
