// SPDX-License-Identifier: CEPL-1.0
//! Graphics-device bootstrap and frame presentation for a single window
//! surface: probe what the platform offers, pick a device and queue,
//! negotiate a swapchain configuration, then run a one-frame-in-flight
//! acquire/submit/present cycle against it.
//!
//! The pure policy (selection and negotiation) lives in [`select`] and
//! [`negotiate`] over the snapshots [`probe`] builds, so it stays testable
//! without a device. [`Presenter`] is the assembled whole.

pub mod chain;
pub mod context;
pub mod error;
pub mod frame;
pub mod negotiate;
pub mod probe;
pub mod select;

pub use chain::PresentChain;
pub use context::DeviceContext;
pub use error::{PresentError, PresentResult};
pub use frame::FrameSynchronizer;
pub use negotiate::SurfaceConfig;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::info;

/// The assembled presenter. Field order is teardown order: synchronizer,
/// then chain, then the device context under them.
pub struct Presenter {
    frame: FrameSynchronizer,
    chain: PresentChain,
    ctx: DeviceContext,
}

impl Presenter {
    /// Bring up the full stack against `window`. `width`/`height` are the
    /// requested chain size, honored only where the surface does not pin
    /// its own extent.
    pub fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        width: u32,
        height: u32,
    ) -> PresentResult<Self> {
        let ctx = DeviceContext::new(window, display)?;

        let support =
            unsafe { probe::probe_surface_support(&ctx.surface_loader, ctx.phys, ctx.surface) }?;
        let config = negotiate::negotiate(&support, vk::Extent2D { width, height })?;

        let chain = PresentChain::create(&ctx.instance, &ctx.device, ctx.surface, &config)?;
        probe::ensure_bounded("chain images", chain.image_count(), probe::MAX_CHAIN_IMAGES)?;

        let frame = FrameSynchronizer::new(&ctx.device, ctx.queue, ctx.queue_family)?;

        let extent = chain.extent();
        info!(
            "presenter ready: {}x{}, {} images",
            extent.width,
            extent.height,
            chain.image_count()
        );
        Ok(Presenter { frame, chain, ctx })
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.frame.set_clear_color(rgba);
    }

    /// One full frame cycle. Every error is fatal to the loop in this
    /// scope; the caller decides how to exit.
    pub fn render_frame(&mut self) -> PresentResult<()> {
        self.frame.run_frame(&self.chain)
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        // Members then drop in field order: synchronizer, chain, context.
        self.ctx.wait_idle().ok();
    }
}
