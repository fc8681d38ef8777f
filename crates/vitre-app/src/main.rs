// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use anyhow::Result;
use tracing::{error, info};
use vitre_core::{init_tracing, FpsCounter};
use vitre_present::{PresentError, Presenter};

use vitre_platform::winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
struct WindowCfg {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct RenderCfg {
    #[serde(default = "default_clear")]
    clear_color: [f32; 4],
}

#[derive(Debug, Deserialize, Default)]
struct AppCfg {
    #[serde(default)]
    window: WindowCfg,
    #[serde(default)]
    render: RenderCfg,
}

impl Default for WindowCfg {
    fn default() -> Self {
        WindowCfg {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for RenderCfg {
    fn default() -> Self {
        RenderCfg {
            clear_color: default_clear(),
        }
    }
}

fn default_title() -> String {
    "vitre".to_string()
}
fn default_width() -> u32 {
    1024
}
fn default_height() -> u32 {
    728
}
fn default_clear() -> [f32; 4] {
    [1.0, 0.0, 1.0, 1.0]
}
fn load_cfg() -> AppCfg {
    match fs::read_to_string("vitre.toml") {
        Ok(s) => toml::from_str::<AppCfg>(&s).unwrap_or_default(),
        Err(_) => AppCfg::default(),
    }
}

struct App {
    window: Option<Window>,
    presenter: Option<Presenter>,

    cfg: AppCfg,
    exiting: bool,
    fatal: Option<PresentError>,
    fps: FpsCounter,
}

impl App {
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        self.presenter = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = vitre_platform::window_attributes(
                &self.cfg.window.title,
                self.cfg.window.width,
                self.cfg.window.height,
            );
            let window = match event_loop.create_window(attrs) {
                Ok(w) => w,
                Err(e) => {
                    error!("create_window failed: {e}");
                    self.fatal = Some(PresentError::PlatformInit(format!("create_window: {e}")));
                    self.shut_down(event_loop);
                    return;
                }
            };

            let size = window.inner_size();
            match Presenter::new(&window, &window, size.width.max(1), size.height.max(1)) {
                Ok(mut presenter) => {
                    presenter.set_clear_color(self.cfg.render.clear_color);
                    self.window = Some(window);
                    self.presenter = Some(presenter);
                }
                Err(e) => {
                    error!("presenter init failed: {e}");
                    self.fatal = Some(e);
                    self.shut_down(event_loop);
                    return;
                }
            }
        }

        // Uncapped poll loop; pacing comes from the present mode.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(window) = &self.window {
            if window_id != window.id() {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                self.shut_down(event_loop);
            }

            WindowEvent::RedrawRequested => {
                if self.exiting {
                    return;
                }
                if let Some(presenter) = &mut self.presenter {
                    match presenter.render_frame() {
                        Ok(()) => self.fps.frame(),
                        Err(e) => {
                            error!("frame failed: {e}");
                            self.fatal = Some(e);
                            self.shut_down(event_loop);
                        }
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.exiting {
            return;
        }
        if let Some(frames) = self.fps.tick() {
            info!("fps ~ {frames}");
        }
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let event_loop: EventLoop<()> = EventLoop::new()?;

    let mut app = App {
        window: None,
        presenter: None,
        cfg: load_cfg(),
        exiting: false,
        fatal: None,
        fps: FpsCounter::new(),
    };

    event_loop.run_app(&mut app)?;

    if let Some(e) = app.fatal {
        return Err(e.into());
    }
    Ok(())
}
