//! CPU framebuffer presentation via softbuffer.

use std::{num::NonZeroU32, sync::Arc};

use anyhow::{Context as _, anyhow};
use image::RgbaImage;
use softbuffer::{Context, Surface};
use winit::{dpi::PhysicalSize, window::Window};

/// The window's pixel surface.
///
/// Frames are composed as RGBA images and copied in as `0x00RRGGBB` words.
pub struct WindowSurface {
    window: Arc<Window>,
    surface: Surface<Arc<Window>, Arc<Window>>,
    size: PhysicalSize<u32>,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let context = Context::new(window.clone())
            .map_err(|err| anyhow!("softbuffer: failed to create context: {err}"))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| anyhow!("softbuffer: failed to create surface: {err}"))?;

        let size = window.inner_size();
        let mut this = Self {
            window,
            surface,
            size,
        };
        this.resize(size);
        Ok(this)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Zero-sized requests (minimised windows) are remembered but not applied.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        if let Err(err) = self.surface.resize(w, h) {
            log::warn!("softbuffer: resize to {}x{} failed: {err}", size.width, size.height);
        }
    }

    /// Copy `frame` to the window. The frame must match the current size.
    pub fn present(&mut self, frame: &RgbaImage) -> anyhow::Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Ok(());
        }
        if frame.dimensions() != (self.size.width, self.size.height) {
            return Err(anyhow!(
                "frame is {:?}, surface is {}x{}",
                frame.dimensions(),
                self.size.width,
                self.size.height
            ));
        }

        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|err| anyhow!("softbuffer: no buffer: {err}"))?;
        for (dst, px) in buffer.iter_mut().zip(frame.pixels()) {
            *dst = pack_xrgb(px.0);
        }

        self.window.pre_present_notify();
        buffer
            .present()
            .map_err(|err| anyhow!("softbuffer: present failed: {err}"))
            .context("presenting frame")
    }
}

/// `[r, g, b, a]` → `0x00RRGGBB`. Alpha is dropped; frames are opaque.
pub fn pack_xrgb([r, g, b, _]: [u8; 4]) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_rgb_and_drops_alpha() {
        assert_eq!(pack_xrgb([0x12, 0x34, 0x56, 0x00]), 0x0012_3456);
        assert_eq!(pack_xrgb([0xff, 0xff, 0xff, 0xff]), 0x00ff_ffff);
    }
}
