use std::ffi::CString;
use std::num::NonZeroU32;
use std::rc::Rc;

use glutin::config::{Config as GlutinConfig, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::debug::ErrorProbe;
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::{GlContext, NativeGl};

use shapes_common::config::{Config, ConfigError};

use crate::lifecycle::{Lifecycle, LifecycleError, State};
use crate::scene::Scene;

pub struct App {
    // GL objects go before the context, the context before the window.
    scene: Option<Scene>,
    renderer: GlRenderer,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    event_loop: EventLoop<()>,
    lifecycle: Lifecycle,
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let mut lifecycle = Lifecycle::new();

        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(
                config.window.width,
                config.window.height,
            )))
            .with_title(&config.window.title);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |mut configs| {
                configs.next().expect("no GL config matches the template")
            })
            .map_err(|e| lifecycle.fail(AppError::Window(e.to_string())))?;

        let window = window.ok_or_else(|| {
            lifecycle.fail(AppError::Window("display builder returned no window".into()))
        })?;

        lifecycle.advance(State::WindowReady)?;

        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.raw_window_handle()));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attr) }
            .map_err(|e| lifecycle.fail(AppError::from(e)))?;

        let gl_window = GlWindow::new(window, &gl_config).map_err(|e| lifecycle.fail(e))?;

        let gl_context = not_current
            .make_current(&gl_window.surface)
            .map_err(|e| lifecycle.fail(AppError::from(e)))?;

        if config.window.vsync {
            if let Err(e) = gl_window
                .surface
                .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                log::warn!("could not enable vsync: {e}");
            }
        }

        let api = NativeGl::load_with(|s| match CString::new(s) {
            Ok(name) => gl_display.get_proc_address(name.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });

        lifecycle.advance(State::ContextReady)?;

        let probe = ErrorProbe::new(config.debug.error_policy());
        let ctx = Rc::new(GlContext::with_probe(api, probe));

        let scene = Scene::load(&ctx, &config);
        let renderer = GlRenderer::new(&ctx);

        Ok(Self {
            scene,
            renderer,
            gl_context,
            gl_window,
            event_loop,
            lifecycle,
            config,
        })
    }

    /// Runs the frame loop until the window is closed.
    pub fn run(self) -> Result<(), AppError> {
        let App {
            mut scene,
            mut renderer,
            gl_context,
            gl_window,
            mut event_loop,
            mut lifecycle,
            config,
        } = self;

        lifecycle.advance(State::Running)?;

        let size = gl_window.window.inner_size();
        renderer.resize(size.width, size.height);

        let clear_color = config.render.clear_color;

        let code = event_loop.run_return(|event, _window_target, control_flow| {
            if !lifecycle.is_running() {
                control_flow.set_exit();
                return;
            }
            control_flow.set_wait();

            match event {
                Event::MainEventsCleared => gl_window.window.request_redraw(),
                Event::RedrawRequested(_) => {
                    renderer.clear(clear_color);

                    if let Some(scene) = &scene {
                        scene.draw(&mut renderer);
                    }

                    if let Err(e) = gl_window.surface.swap_buffers(&gl_context) {
                        log::error!("could not swap buffers: {e}");
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window.surface.resize(&gl_context, width, height);
                            renderer.resize(size.width, size.height);
                        }
                    }
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => {
                        log::info!("close requested, releasing GPU resources");
                        scene = None;
                        lifecycle.terminate();
                        control_flow.set_exit();
                    }
                    _ => (),
                },
                _ => (),
            }
        });

        lifecycle.terminate();
        log::debug!(
            "event loop exited with code {code} in {:?}",
            lifecycle.state()
        );

        drop(scene);
        drop(renderer);
        drop(gl_context);
        drop(gl_window);

        Ok(())
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &GlutinConfig) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Err(AppError::ZeroSize);
        };

        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window.raw_window_handle(),
            width,
            height,
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { surface, window })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not create window: {0}")]
    Window(String),
    #[error("window has zero size")]
    ZeroSize,
    #[error("GL context error: {0}")]
    Context(#[from] glutin::error::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
