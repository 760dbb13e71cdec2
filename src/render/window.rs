//! The desktop window: an [`AppState`] that drives a [`Session`].

use std::{sync::Arc, time::Instant};

use winit::{
    event::{ElementState, WindowEvent},
    keyboard::ModifiersState,
    window::Window,
};

use crate::{
    render::{
        app::{self, AppConfig, AppState, Flow},
        canvas::{Canvas, ViewState},
        input::{self, Command},
        surface::WindowSurface,
    },
    session::{ExportOutcome, FilePicker, Session, form::FieldId},
};

/// Open the window and block until it is closed.
pub fn run(config: AppConfig, session: Session, picker: Box<dyn FilePicker>) -> anyhow::Result<()> {
    app::run_with_builder(config, move |window| {
        DerivationWindow::new(window, session, picker)
    })
}

pub struct DerivationWindow {
    surface: WindowSurface,
    canvas: Canvas,
    session: Session,
    picker: Box<dyn FilePicker>,
    modifiers: ModifiersState,
    focus: usize,
    scroll: u32,
    max_scroll: u32,
}

impl DerivationWindow {
    pub fn new(
        window: Arc<Window>,
        session: Session,
        picker: Box<dyn FilePicker>,
    ) -> anyhow::Result<Self> {
        let canvas = Canvas::new(window.scale_factor() as f32);
        let surface = WindowSurface::new(window)?;
        Ok(Self {
            surface,
            canvas,
            session,
            picker,
            modifiers: ModifiersState::empty(),
            focus: 0,
            scroll: 0,
            max_scroll: 0,
        })
    }

    fn focused(&self) -> FieldId {
        FieldId::ALL[self.focus % FieldId::ALL.len()]
    }

    fn apply(&mut self, command: Command) -> Flow {
        let n = FieldId::ALL.len();
        let focus = self.focused();
        match command {
            Command::FocusNext => self.focus = (self.focus + 1) % n,
            Command::FocusPrev => self.focus = (self.focus + n - 1) % n,
            Command::Insert(text) => {
                let field = self.session.form_mut().field_mut(focus);
                if !text.chars().fold(false, |any, c| field.push_char(c) || any) {
                    return Flow::Continue;
                }
            }
            Command::Backspace => {
                if !self.session.form_mut().field_mut(focus).backspace() {
                    return Flow::Continue;
                }
            }
            Command::ToggleMode => self.session.form_mut().field_mut(focus).toggle(),
            Command::Execute => {
                self.session.run();
                self.scroll = 0;
            }
            Command::Export => match self.session.export(self.picker.as_mut(), Instant::now()) {
                ExportOutcome::Unavailable | ExportOutcome::Cancelled => return Flow::Continue,
                ExportOutcome::Saved(_) | ExportOutcome::Failed(_) => self.scroll = 0,
            },
            Command::Scroll(dy) => {
                let next = self.scroll.saturating_add_signed(dy).min(self.max_scroll);
                if next == self.scroll {
                    return Flow::Continue;
                }
                self.scroll = next;
            }
            Command::ScrollTop => self.scroll = 0,
            Command::Close => return Flow::Exit,
        }
        Flow::Redraw
    }
}

impl AppState for DerivationWindow {
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.surface.resize(new_size);
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let size = self.surface.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let view = ViewState {
            focus: self.focused(),
            scroll: self.scroll,
        };
        let frame = self
            .canvas
            .compose(&self.session, view, (size.width, size.height));
        self.max_scroll = frame.max_scroll();
        self.scroll = self.scroll.min(self.max_scroll);

        self.surface.present(&frame.image)
    }

    fn request_redraw(&self) {
        self.surface.window().request_redraw();
    }

    fn handle_event(&mut self, event: &WindowEvent) -> Flow {
        match event {
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
                Flow::Continue
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                input::map_key(&event.logical_key, event.text.as_deref(), self.modifiers)
                    .map_or(Flow::Continue, |cmd| self.apply(cmd))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                input::map_scroll(*delta).map_or(Flow::Continue, |cmd| self.apply(cmd))
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.canvas.set_scale(*scale_factor as f32);
                Flow::Redraw
            }
            _ => Flow::Continue,
        }
    }

    fn tick(&mut self, now: Instant) -> Flow {
        if self.session.tick(now) {
            Flow::Redraw
        } else {
            Flow::Continue
        }
    }

    fn next_wakeup(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    fn shutdown(&mut self) {
        self.session.close();
    }
}
