// SPDX-License-Identifier: CEPL-1.0
//! Presentation-layer error taxonomy.
//!
//! Every fallible platform call maps into one of these kinds; callers treat
//! all of them as fatal in this scope, but the kinds stay distinct so a
//! future recreation path can branch on [`PresentError::SurfaceOutOfDate`]
//! without re-parsing strings.

use ash::vk;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresentError {
    /// Windowing or instance bring-up failed before any device existed.
    #[error("platform init: {0}")]
    PlatformInit(String),

    /// Device enumeration returned nothing at all.
    #[error("no compatible physical device")]
    NoCompatibleDevice,

    /// The chosen device has no graphics-capable family that can present
    /// to the target surface.
    #[error("no queue family with graphics + present support")]
    NoPresentableQueue,

    /// The surface advertises an empty format set.
    #[error("surface advertises no formats")]
    NoSurfaceFormat,

    /// The surface advertises an empty present-mode set.
    #[error("surface advertises no present modes")]
    NoPresentMode,

    /// A platform result exceeded the capacity this system is sized for.
    #[error("unsupported configuration: {count} {what} (max {max})")]
    UnsupportedConfiguration {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("swapchain creation failed: {0}")]
    SwapchainCreate(vk::Result),

    /// The surface changed underneath the chain (resize, mode switch).
    /// Fatal here; a recreation path would branch on it instead.
    #[error("surface out of date")]
    SurfaceOutOfDate,

    /// The surface itself is gone (window destroyed mid-frame).
    #[error("surface lost")]
    SurfaceLost,

    #[error("queue submission failed: {0}")]
    Submit(vk::Result),

    #[error("presentation failed: {0}")]
    Present(vk::Result),

    /// Any other checked device-layer call (queries, sync-object creation,
    /// recording, the idle wait).
    #[error("vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
}

pub type PresentResult<T> = std::result::Result<T, PresentError>;
