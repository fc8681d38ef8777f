// SPDX-License-Identifier: CEPL-1.0
//! Surface negotiation: reduce the advertised support sets to the one
//! configuration the presentation chain is created with.

use ash::vk;
use tracing::debug;

use crate::error::{PresentError, PresentResult};
use crate::probe::SurfaceSupport;

/// The resolved configuration. Every field is a member of the sets the
/// platform advertised; nothing here is invented.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceConfig {
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    /// Carried from the capability query so chain creation does not
    /// re-query; not a negotiated preference.
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

/// Prefer B8G8R8A8_SRGB with the sRGB nonlinear color space, otherwise take
/// the first advertised pair.
pub fn choose_format(formats: &[vk::SurfaceFormatKHR]) -> PresentResult<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first().copied())
        .ok_or(PresentError::NoSurfaceFormat)
}

/// Prefer MAILBOX, otherwise take the first advertised mode.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> PresentResult<vk::PresentModeKHR> {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        return Ok(vk::PresentModeKHR::MAILBOX);
    }
    modes.first().copied().ok_or(PresentError::NoPresentMode)
}

/// One more image than the minimum, capped by the platform maximum when one
/// is set (zero means uncapped).
pub fn image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    if caps.max_image_count == 0 {
        caps.min_image_count + 1
    } else {
        (caps.min_image_count + 1).min(caps.max_image_count)
    }
}

/// The platform-pinned extent when there is one (width != u32::MAX),
/// otherwise the requested size clamped into the advertised range.
pub fn extent(caps: &vk::SurfaceCapabilitiesKHR, want: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: want
                .width
                .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: want
                .height
                .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

pub fn negotiate(support: &SurfaceSupport, want: vk::Extent2D) -> PresentResult<SurfaceConfig> {
    let caps = &support.capabilities;
    let config = SurfaceConfig {
        format: choose_format(&support.formats)?,
        present_mode: choose_present_mode(&support.present_modes)?,
        extent: extent(caps, want),
        image_count: image_count(caps),
        pre_transform: caps.current_transform,
    };
    debug!(
        "negotiated: {:?}/{:?}, {:?}, {} images, {}x{}",
        config.format.format,
        config.format.color_space,
        config.present_mode,
        config.image_count,
        config.extent.width,
        config.extent.height,
    );
    Ok(config)
}
