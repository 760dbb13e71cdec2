//! App entrypoint for the window front end.
//!
//! This module owns:
//! - the winit application lifecycle + event loop
//! - creating the window
//! - delegating to an injected state builder
//!
//! Design:
//! - The app runner is generic over a state type `S` implementing [`AppState`].
//! - The builder receives the created window and runs once, on `resumed`.
//! - The event loop sleeps (`ControlFlow::Wait`) unless the state asks to be woken
//!   at a deadline, in which case it uses `ControlFlow::WaitUntil`.
//! - Ctrl+C in the terminal arrives as [`AppEvent::Interrupt`] and closes the window
//!   like a close request.

use std::{sync::Arc, time::Instant};

use anyhow::Context as _;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::interrupt;

/// Window-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Derivation Helper".to_string(),
            width: 800,
            height: 800,
        }
    }
}

/// What the state wants after handling an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    Exit,
}

/// Events posted to the loop from outside the windowing system.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Interrupt,
}

/// Minimal trait a window state must implement to be driven by the app runner.
pub trait AppState: 'static {
    /// Handle window resize.
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>);

    /// Render one frame.
    fn render(&mut self) -> anyhow::Result<()>;

    /// Request a redraw on the underlying window.
    fn request_redraw(&self);

    /// Input and other window events not handled by the runner.
    fn handle_event(&mut self, event: &WindowEvent) -> Flow;

    /// Deferred work due at `now` (e.g. dismissing a notice).
    fn tick(&mut self, now: Instant) -> Flow;

    /// Next time [`tick`](Self::tick) needs to run, if any.
    fn next_wakeup(&self) -> Option<Instant>;

    /// Called once before the window goes away.
    fn shutdown(&mut self);
}

/// Run the winit event loop with a state builder.
///
/// Returns the builder's error if the state could not be created.
pub fn run_with_builder<S, B>(config: AppConfig, builder: B) -> anyhow::Result<()>
where
    S: AppState,
    B: FnOnce(Arc<Window>) -> anyhow::Result<S> + 'static,
{
    let event_loop = EventLoop::<AppEvent>::with_user_event()
        .build()
        .context("winit: failed to create EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    if let Err(err) = interrupt::on_interrupt(move || {
        if proxy.send_event(AppEvent::Interrupt).is_err() {
            log::debug!("interrupt arrived after the event loop closed");
        }
    }) {
        warn!("Ctrl+C will not clean up temp files: {err}");
    }

    let mut app = App::<S>::new(config, builder);
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

type StateBuilder<S> = Box<dyn FnOnce(Arc<Window>) -> anyhow::Result<S> + 'static>;

/// Application state used by winit.
struct App<S: AppState> {
    config: AppConfig,
    builder: Option<StateBuilder<S>>,
    state: Option<S>,
    failure: Option<anyhow::Error>,
}

impl<S: AppState> App<S> {
    fn new<B>(config: AppConfig, builder: B) -> Self
    where
        B: FnOnce(Arc<Window>) -> anyhow::Result<S> + 'static,
    {
        Self {
            config,
            builder: Some(Box::new(builder)),
            state: None,
            failure: None,
        }
    }

    fn build_state(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(builder) = self.builder.take() else {
            return Ok(());
        };

        let attributes = WindowAttributes::default()
            .with_title(self.config.title.as_str())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("winit: failed to create window")?,
        );

        let state = builder(window)?;
        state.request_redraw();
        self.state = Some(state);
        Ok(())
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
        event_loop.exit();
    }
}

impl<S: AppState> ApplicationHandler<AppEvent> for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.build_state(event_loop) {
            error!("failed to start: {err:#}");
            self.failure = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; exiting");
                self.exit(event_loop);
            }
            WindowEvent::Resized(size) => {
                state.resize(size);
                state.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.render() {
                    info!("render error: {:#}", err);
                }
            }
            other => match state.handle_event(&other) {
                Flow::Continue => {}
                Flow::Redraw => state.request_redraw(),
                Flow::Exit => self.exit(event_loop),
            },
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Interrupt => {
                info!("Interrupted; exiting");
                self.exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if state.tick(Instant::now()) == Flow::Redraw {
            state.request_redraw();
        }
        match state.next_wakeup() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
    }
}
