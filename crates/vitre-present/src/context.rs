// SPDX-License-Identifier: CEPL-1.0
//! Instance, surface, and logical-device bring-up, owned as one unit so the
//! teardown order (device, then surface, then instance) cannot be gotten
//! wrong from outside.

use std::ffi::CStr;

use ash::khr::{surface, swapchain};
use ash::{vk, Entry, Instance};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use tracing::info;

use crate::error::{PresentError, PresentResult};
use crate::probe;
use crate::select;

const APP_NAME: &CStr = c"vitre";

/// Everything below the swapchain: entry, instance, surface, the chosen
/// physical device, the logical device, and the one graphics+present queue.
pub struct DeviceContext {
    pub(crate) _entry: Entry,
    pub(crate) instance: Instance,
    pub(crate) surface_loader: surface::Instance,
    pub(crate) surface: vk::SurfaceKHR,

    pub(crate) phys: vk::PhysicalDevice,
    pub(crate) device: ash::Device,
    pub(crate) queue_family: u32,
    pub(crate) queue: vk::Queue,
}

impl DeviceContext {
    pub fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
    ) -> PresentResult<Self> {
        let ctx = unsafe { build_context(window, display) }?;
        info!("device ready (queue family {})", ctx.queue_family);
        Ok(ctx)
    }

    pub fn wait_idle(&self) -> PresentResult<()> {
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}

unsafe fn create_instance(entry: &Entry, display_raw: RawDisplayHandle) -> PresentResult<Instance> {
    probe::log_instance_extensions(entry)?;
    let layers = probe::pick_layers(entry)?;

    let app_info = vk::ApplicationInfo {
        s_type: vk::StructureType::APPLICATION_INFO,
        p_application_name: APP_NAME.as_ptr(),
        application_version: 0,
        api_version: vk::API_VERSION_1_3,
        ..Default::default()
    };

    let extensions = ash_window::enumerate_required_extensions(display_raw)?.to_vec();

    let create_info = vk::InstanceCreateInfo {
        s_type: vk::StructureType::INSTANCE_CREATE_INFO,
        p_application_info: &app_info,
        enabled_layer_count: layers.len() as u32,
        pp_enabled_layer_names: layers.as_ptr(),
        enabled_extension_count: extensions.len() as u32,
        pp_enabled_extension_names: extensions.as_ptr(),
        ..Default::default()
    };

    entry
        .create_instance(&create_info, None)
        .map_err(|e| PresentError::PlatformInit(format!("create_instance: {e}")))
}

unsafe fn create_device(
    instance: &Instance,
    phys: vk::PhysicalDevice,
    queue_family: u32,
) -> PresentResult<ash::Device> {
    let priorities = [1.0_f32];
    let queue_info = vk::DeviceQueueCreateInfo {
        s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
        queue_family_index: queue_family,
        queue_count: 1,
        p_queue_priorities: priorities.as_ptr(),
        ..Default::default()
    };

    // Swapchain support is the only extension; no device features enabled.
    let extensions = [swapchain::NAME.as_ptr()];
    let create_info = vk::DeviceCreateInfo {
        s_type: vk::StructureType::DEVICE_CREATE_INFO,
        queue_create_info_count: 1,
        p_queue_create_infos: &queue_info,
        enabled_extension_count: extensions.len() as u32,
        pp_enabled_extension_names: extensions.as_ptr(),
        ..Default::default()
    };

    instance
        .create_device(phys, &create_info, None)
        .map_err(|e| PresentError::PlatformInit(format!("create_device: {e}")))
}

unsafe fn build_context(
    window: &dyn HasWindowHandle,
    display: &dyn HasDisplayHandle,
) -> PresentResult<DeviceContext> {
    let entry = Entry::linked();

    let display_raw: RawDisplayHandle = display
        .display_handle()
        .map_err(|e| PresentError::PlatformInit(format!("display_handle: {e}")))?
        .as_raw();
    let window_raw: RawWindowHandle = window
        .window_handle()
        .map_err(|e| PresentError::PlatformInit(format!("window_handle: {e}")))?
        .as_raw();

    let instance = create_instance(&entry, display_raw)?;

    let surface = ash_window::create_surface(&entry, &instance, display_raw, window_raw, None)
        .map_err(|e| PresentError::PlatformInit(format!("create_surface: {e}")))?;
    let surface_loader = surface::Instance::new(&entry, &instance);

    let candidates = probe::probe_devices(&instance, &surface_loader, surface)?;
    let (index, queue_family) = select::select_device(&candidates)?;
    let phys = candidates[index].handle;

    let device = create_device(&instance, phys, queue_family)?;
    let queue = device.get_device_queue(queue_family, 0);

    Ok(DeviceContext {
        _entry: entry,
        instance,
        surface_loader,
        surface,
        phys,
        device,
        queue_family,
        queue,
    })
}
