// SPDX-License-Identifier: CEPL-1.0
//! Read-only capability queries: instance layers and extensions, physical
//! device candidates, and the surface support sets negotiation runs over.

use std::ffi::{c_char, CStr};

use ash::khr::surface;
use ash::{vk, Entry, Instance};
use tracing::{debug, info, warn};

use crate::error::{PresentError, PresentResult};

/// Capacities this system is sized for. Platform results larger than these
/// are rejected up front, never truncated.
pub const MAX_DEVICES: usize = 8;
pub const MAX_QUEUE_FAMILIES: usize = 8;
pub const MAX_SURFACE_FORMATS: usize = 32;
pub const MAX_PRESENT_MODES: usize = 16;
pub const MAX_CHAIN_IMAGES: usize = 8;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

pub fn ensure_bounded(what: &'static str, count: usize, max: usize) -> PresentResult<()> {
    if count > max {
        return Err(PresentError::UnsupportedConfiguration { what, count, max });
    }
    Ok(())
}

/// One queue family of a candidate, reduced to the two capabilities
/// selection cares about. `present` is support for the target surface,
/// not a generic property of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub graphics: bool,
    pub present: bool,
}

/// Snapshot of one enumerated physical device. Plain data; the selection
/// policy runs over these without touching the instance again.
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub handle: vk::PhysicalDevice,
    pub kind: vk::PhysicalDeviceType,
    pub geometry_shader: bool,
    pub name: String,
    pub families: Vec<QueueFamily>,
}

/// What the surface advertises for a given device. Every negotiated value
/// must come out of these sets.
#[derive(Debug, Clone)]
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

pub unsafe fn log_instance_extensions(entry: &Entry) -> PresentResult<()> {
    let exts = entry.enumerate_instance_extension_properties(None)?;
    info!("{} instance extensions available", exts.len());
    for ext in &exts {
        let name = ext.extension_name_as_c_str().unwrap_or(c"?");
        debug!("  {}", name.to_string_lossy());
    }
    Ok(())
}

/// Layers to enable: the Khronos validation layer in debug builds when the
/// loader advertises it, nothing otherwise.
pub unsafe fn pick_layers(entry: &Entry) -> PresentResult<Vec<*const c_char>> {
    if !cfg!(debug_assertions) {
        return Ok(Vec::new());
    }
    let available = entry.enumerate_instance_layer_properties()?;
    let found = available
        .iter()
        .any(|layer| layer.layer_name_as_c_str().is_ok_and(|n| n == VALIDATION_LAYER));
    if found {
        info!("validation layer enabled");
        Ok(vec![VALIDATION_LAYER.as_ptr()])
    } else {
        warn!("validation layer unavailable, continuing without it");
        Ok(Vec::new())
    }
}

/// Snapshot every physical device the instance enumerates, with queue
/// capabilities resolved against `surface`.
pub unsafe fn probe_devices(
    instance: &Instance,
    surface_loader: &surface::Instance,
    surface: vk::SurfaceKHR,
) -> PresentResult<Vec<DeviceCandidate>> {
    let devices = instance.enumerate_physical_devices()?;
    ensure_bounded("physical devices", devices.len(), MAX_DEVICES)?;

    let mut out = Vec::with_capacity(devices.len());
    for phys in devices {
        let props = instance.get_physical_device_properties(phys);
        let feats = instance.get_physical_device_features(phys);
        let qprops = instance.get_physical_device_queue_family_properties(phys);
        ensure_bounded("queue families", qprops.len(), MAX_QUEUE_FAMILIES)?;

        let mut families = Vec::with_capacity(qprops.len());
        for (i, q) in qprops.iter().enumerate() {
            let index = i as u32;
            families.push(QueueFamily {
                index,
                graphics: q.queue_flags.contains(vk::QueueFlags::GRAPHICS),
                present: surface_loader.get_physical_device_surface_support(phys, index, surface)?,
            });
        }

        let name = props
            .device_name_as_c_str()
            .unwrap_or(c"unknown")
            .to_string_lossy()
            .into_owned();
        debug!("candidate: {name} ({:?})", props.device_type);

        out.push(DeviceCandidate {
            handle: phys,
            kind: props.device_type,
            geometry_shader: feats.geometry_shader == vk::TRUE,
            name,
            families,
        });
    }
    Ok(out)
}

/// Query the advertised support sets for `phys` against `surface`.
pub unsafe fn probe_surface_support(
    surface_loader: &surface::Instance,
    phys: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> PresentResult<SurfaceSupport> {
    let capabilities = surface_loader.get_physical_device_surface_capabilities(phys, surface)?;
    let formats = surface_loader.get_physical_device_surface_formats(phys, surface)?;
    ensure_bounded("surface formats", formats.len(), MAX_SURFACE_FORMATS)?;
    let present_modes = surface_loader.get_physical_device_surface_present_modes(phys, surface)?;
    ensure_bounded("present modes", present_modes.len(), MAX_PRESENT_MODES)?;

    debug!(
        "surface: {}..{} images, current extent {}x{}",
        capabilities.min_image_count,
        capabilities.max_image_count,
        capabilities.current_extent.width,
        capabilities.current_extent.height
    );

    Ok(SurfaceSupport {
        capabilities,
        formats,
        present_modes,
    })
}
