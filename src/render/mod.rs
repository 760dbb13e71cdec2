//! Rendering module root.
//!
//! `formula` turns math markup into image files and is shared by the panel and the
//! export. Everything else here is the desktop window: the winit runner (`app`),
//! softbuffer presentation (`surface`), frame composition (`canvas`), input
//! mapping (`input`), the save dialog (`dialog`) and the state tying them to a
//! session (`window`).
//!
//! Entrypoint: `render::window::run(...)`.

pub mod app;
pub mod canvas;
pub mod dialog;
pub mod formula;
pub mod input;
pub mod surface;
pub mod window;
