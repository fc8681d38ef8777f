// SPDX-License-Identifier: CEPL-1.0
//! The per-frame synchronization protocol.

use ash::vk;
use tracing::debug;

use crate::chain::PresentChain;
use crate::error::{PresentError, PresentResult};

/// Clear color used until a caller overrides it.
pub const DEFAULT_CLEAR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Owns the two per-frame semaphores and the command recording resources,
/// and runs one frame cycle at a time.
///
/// STRICT PER-FRAME ORDER:
/// 1) acquire_next_image (signals image-acquired)
/// 2) queue_submit (waits on image-acquired at color-attachment-output,
///    signals render-complete)
/// 3) queue_present (waits on render-complete)
/// 4) device_wait_idle (at most one frame of GPU work ever exists, so both
///    semaphores are back to rest before the next cycle reuses them)
pub struct FrameSynchronizer {
    device: ash::Device,
    queue: vk::Queue,

    image_acquired: vk::Semaphore,
    render_complete: vk::Semaphore,

    pool: vk::CommandPool,
    cmd: vk::CommandBuffer,

    clear: [f32; 4],
}

impl FrameSynchronizer {
    pub fn new(device: &ash::Device, queue: vk::Queue, queue_family: u32) -> PresentResult<Self> {
        unsafe {
            let sem_info = vk::SemaphoreCreateInfo {
                s_type: vk::StructureType::SEMAPHORE_CREATE_INFO,
                ..Default::default()
            };
            let image_acquired = device.create_semaphore(&sem_info, None)?;
            let render_complete = device.create_semaphore(&sem_info, None)?;

            // Transient: every recording lives for exactly one submit and
            // the whole pool is reset at the top of the next frame.
            let pool_info = vk::CommandPoolCreateInfo {
                s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
                flags: vk::CommandPoolCreateFlags::TRANSIENT,
                queue_family_index: queue_family,
                ..Default::default()
            };
            let pool = device.create_command_pool(&pool_info, None)?;

            let alloc_info = vk::CommandBufferAllocateInfo {
                s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
                command_pool: pool,
                level: vk::CommandBufferLevel::PRIMARY,
                command_buffer_count: 1,
                ..Default::default()
            };
            let cmd = device.allocate_command_buffers(&alloc_info)?[0];

            Ok(FrameSynchronizer {
                device: device.clone(),
                queue,
                image_acquired,
                render_complete,
                pool,
                cmd,
                clear: DEFAULT_CLEAR,
            })
        }
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear = rgba;
    }

    /// Run one full frame cycle against `chain`. Every step is checked;
    /// the first failure aborts the cycle and surfaces as the frame error.
    pub fn run_frame(&mut self, chain: &PresentChain) -> PresentResult<()> {
        let (image_index, suboptimal) = chain.acquire(self.image_acquired)?;
        if suboptimal {
            debug!("suboptimal acquire, presenting anyway");
        }

        unsafe {
            self.record(chain.image(image_index))?;

            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let submit = vk::SubmitInfo {
                s_type: vk::StructureType::SUBMIT_INFO,
                wait_semaphore_count: 1,
                p_wait_semaphores: &self.image_acquired,
                p_wait_dst_stage_mask: wait_stages.as_ptr(),
                command_buffer_count: 1,
                p_command_buffers: &self.cmd,
                signal_semaphore_count: 1,
                p_signal_semaphores: &self.render_complete,
                ..Default::default()
            };
            self.device
                .queue_submit(self.queue, std::slice::from_ref(&submit), vk::Fence::null())
                .map_err(PresentError::Submit)?;
        }

        if chain.present(self.queue, image_index, self.render_complete)? {
            debug!("suboptimal present");
        }

        // The blocking point that keeps this a one-frame-in-flight design.
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }

    /// Reset the pool and record the frame: transition the image in, clear
    /// it, transition it out for presentation.
    unsafe fn record(&self, image: vk::Image) -> PresentResult<()> {
        self.device
            .reset_command_pool(self.pool, vk::CommandPoolResetFlags::empty())?;

        let begin = vk::CommandBufferBeginInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_BEGIN_INFO,
            flags: vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT,
            ..Default::default()
        };
        self.device.begin_command_buffer(self.cmd, &begin)?;

        self.transition_to_general(self.cmd, image);

        let color = vk::ClearColorValue {
            float32: self.clear,
        };
        let range = color_range();
        self.device.cmd_clear_color_image(
            self.cmd,
            image,
            vk::ImageLayout::GENERAL,
            &color,
            std::slice::from_ref(&range),
        );

        self.transition_to_present(self.cmd, image);

        self.device.end_command_buffer(self.cmd)?;
        Ok(())
    }

    /// UNDEFINED -> GENERAL before the clear. The source stage matches the
    /// submit wait stage so the transition cannot start before the image
    /// is actually acquired.
    #[inline]
    unsafe fn transition_to_general(&self, cmd: vk::CommandBuffer, image: vk::Image) {
        let barrier = vk::ImageMemoryBarrier {
            s_type: vk::StructureType::IMAGE_MEMORY_BARRIER,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::TRANSFER_WRITE,
            old_layout: vk::ImageLayout::UNDEFINED,
            new_layout: vk::ImageLayout::GENERAL,
            src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            image,
            subresource_range: color_range(),
            ..Default::default()
        };
        self.device.cmd_pipeline_barrier(
            cmd,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            vk::PipelineStageFlags::TRANSFER,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            std::slice::from_ref(&barrier),
        );
    }

    /// GENERAL -> PRESENT_SRC_KHR after the clear has written.
    #[inline]
    unsafe fn transition_to_present(&self, cmd: vk::CommandBuffer, image: vk::Image) {
        let barrier = vk::ImageMemoryBarrier {
            s_type: vk::StructureType::IMAGE_MEMORY_BARRIER,
            src_access_mask: vk::AccessFlags::TRANSFER_WRITE,
            dst_access_mask: vk::AccessFlags::empty(),
            old_layout: vk::ImageLayout::GENERAL,
            new_layout: vk::ImageLayout::PRESENT_SRC_KHR,
            src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
            image,
            subresource_range: color_range(),
            ..Default::default()
        };
        self.device.cmd_pipeline_barrier(
            cmd,
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            std::slice::from_ref(&barrier),
        );
    }
}

impl Drop for FrameSynchronizer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.image_acquired, None);
            self.device.destroy_semaphore(self.render_complete, None);
            self.device.destroy_command_pool(self.pool, None);
        }
    }
}

#[inline]
fn color_range() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}
