// SPDX-License-Identifier: CEPL-1.0
//! The presentation chain: the swapchain and its per-image color views.

use ash::khr::swapchain;
use ash::vk;
use tracing::info;

use crate::error::{PresentError, PresentResult};
use crate::negotiate::SurfaceConfig;

/// Swapchain plus `(image, view)` pairs, ordered by the index the platform
/// hands back at acquire time. Teardown releases views before the
/// swapchain; the device outlives both.
pub struct PresentChain {
    device: ash::Device,
    loader: swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<(vk::Image, vk::ImageView)>,
    extent: vk::Extent2D,
}

impl PresentChain {
    pub fn create(
        instance: &ash::Instance,
        device: &ash::Device,
        surface: vk::SurfaceKHR,
        config: &SurfaceConfig,
    ) -> PresentResult<Self> {
        let loader = swapchain::Device::new(instance, device);

        let create_info = vk::SwapchainCreateInfoKHR {
            s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
            surface,
            min_image_count: config.image_count,
            image_format: config.format.format,
            image_color_space: config.format.color_space,
            image_extent: config.extent,
            image_array_layers: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode: vk::SharingMode::EXCLUSIVE,
            pre_transform: config.pre_transform,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            present_mode: config.present_mode,
            clipped: vk::TRUE,
            ..Default::default()
        };
        let swapchain = unsafe { loader.create_swapchain(&create_info, None) }
            .map_err(PresentError::SwapchainCreate)?;

        // The driver may hand back more images than requested; callers
        // bound the returned count, not the request.
        let raw_images = unsafe { loader.get_swapchain_images(swapchain) }?;
        let mut images = Vec::with_capacity(raw_images.len());
        for &image in &raw_images {
            let view_info = vk::ImageViewCreateInfo {
                s_type: vk::StructureType::IMAGE_VIEW_CREATE_INFO,
                image,
                view_type: vk::ImageViewType::TYPE_2D,
                format: config.format.format,
                subresource_range: vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                },
                ..Default::default()
            };
            let view = unsafe { device.create_image_view(&view_info, None) }?;
            images.push((image, view));
        }

        info!(
            "presentation chain ready: {} images, {}x{}",
            images.len(),
            config.extent.width,
            config.extent.height
        );

        Ok(PresentChain {
            device: device.clone(),
            loader,
            swapchain,
            images,
            extent: config.extent,
        })
    }

    /// Acquire the next presentable image, signalling `signal` once the
    /// platform releases it. A suboptimal acquire comes back as `true`,
    /// not as an error.
    pub fn acquire(&self, signal: vk::Semaphore) -> PresentResult<(u32, bool)> {
        unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        }
        .map_err(map_acquire_err)
    }

    /// Queue the presentation of `image_index`, gated on `wait`. Returns
    /// whether the platform flagged the chain suboptimal.
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> PresentResult<bool> {
        let present_info = vk::PresentInfoKHR {
            s_type: vk::StructureType::PRESENT_INFO_KHR,
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait,
            swapchain_count: 1,
            p_swapchains: &self.swapchain,
            p_image_indices: &image_index,
            ..Default::default()
        };
        unsafe { self.loader.queue_present(queue, &present_info) }.map_err(map_present_err)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// The image behind an acquired index. The platform guarantees acquire
    /// indices stay below the image count.
    pub fn image(&self, image_index: u32) -> vk::Image {
        self.images[image_index as usize].0
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Views first, then the swapchain. Idempotent: an already-emptied
    /// chain is a no-op.
    fn destroy(&mut self) {
        unsafe {
            for (_, view) in self.images.drain(..) {
                self.device.destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
                self.swapchain = vk::SwapchainKHR::null();
            }
        }
    }
}

impl Drop for PresentChain {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// The two surface conditions a recreation path would branch on keep their
/// own kinds; anything else falls through to the general kind for the call.
fn map_acquire_err(e: vk::Result) -> PresentError {
    match e {
        vk::Result::ERROR_OUT_OF_DATE_KHR => PresentError::SurfaceOutOfDate,
        vk::Result::ERROR_SURFACE_LOST_KHR => PresentError::SurfaceLost,
        other => PresentError::Vulkan(other),
    }
}

fn map_present_err(e: vk::Result) -> PresentError {
    match e {
        vk::Result::ERROR_OUT_OF_DATE_KHR => PresentError::SurfaceOutOfDate,
        vk::Result::ERROR_SURFACE_LOST_KHR => PresentError::SurfaceLost,
        other => PresentError::Present(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_conditions_keep_their_own_kinds_on_acquire() {
        assert!(matches!(
            map_acquire_err(vk::Result::ERROR_OUT_OF_DATE_KHR),
            PresentError::SurfaceOutOfDate
        ));
        assert!(matches!(
            map_acquire_err(vk::Result::ERROR_SURFACE_LOST_KHR),
            PresentError::SurfaceLost
        ));
    }

    #[test]
    fn surface_conditions_keep_their_own_kinds_on_present() {
        assert!(matches!(
            map_present_err(vk::Result::ERROR_OUT_OF_DATE_KHR),
            PresentError::SurfaceOutOfDate
        ));
        assert!(matches!(
            map_present_err(vk::Result::ERROR_SURFACE_LOST_KHR),
            PresentError::SurfaceLost
        ));
    }

    #[test]
    fn other_acquire_failures_fall_through_to_the_catch_all() {
        assert!(matches!(
            map_acquire_err(vk::Result::ERROR_DEVICE_LOST),
            PresentError::Vulkan(vk::Result::ERROR_DEVICE_LOST)
        ));
    }

    #[test]
    fn other_present_failures_keep_the_present_kind() {
        assert!(matches!(
            map_present_err(vk::Result::ERROR_DEVICE_LOST),
            PresentError::Present(vk::Result::ERROR_DEVICE_LOST)
        ));
    }
}
