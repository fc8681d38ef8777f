// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
pub use winit;

use winit::dpi::LogicalSize;
use winit::window::{Window, WindowAttributes};

/// Window attributes for the main surface; the size is the creation size
/// only, never authoritative after that (the surface reports the real one).
pub fn window_attributes(title: &str, width: u32, height: u32) -> WindowAttributes {
    Window::default_attributes()
        .with_title(title.to_owned())
        .with_inner_size(LogicalSize::new(width.max(1), height.max(1)))
}
