//! Frame composition: paints the form, the results panel and the footer into an
//! RGBA image sized to the window.
//!
//! Text is typeset by Typst (`typst::rasterize_label`) and cached by its source, so
//! a steady-state redraw only blits cached tiles. Formula images are decoded once
//! per path and scaled to their display size.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use image::{ImageFormat, Rgba, RgbaImage, imageops};

use crate::{
    derivation::{Justify, Weight},
    panel::{IMAGE_SPACING, LabelStyle, Widget},
    session::{
        Session,
        form::{FieldId, InputField},
        notice::{Notice, NoticeKind},
    },
    typst::{
        self,
        markup::Color,
        math::{Align, LabelRequest},
    },
};

pub const APP_TITLE: &str = "Dr Syed Tauseef's Derivation Helper";
pub const FOOTER: &str = "Licensed and author Dr Syed Tauseef";
pub const EXECUTE_LABEL: &str = "Execute Derivation  (Enter)";
pub const EXPORT_LABEL: &str = "Download PDF of Results  (Ctrl+S)";
pub const RESULTS_HEADER: &str = "Derivation Steps";

const WINDOW_BG: Color = Color::rgb(0x24, 0x24, 0x24);
const FRAME_BG: Color = Color::PANEL;
const ENTRY_BG: Color = Color::rgb(0x34, 0x36, 0x38);
const ENTRY_DISABLED: Color = Color::rgb(0x2f, 0x2f, 0x2f);
const ACCENT: Color = Color::rgb(0x1f, 0x6a, 0xa5);
const MUTED: Color = Color::rgb(0x56, 0x56, 0x56);
const GRAY: Color = Color::rgb(0x9e, 0x9e, 0x9e);
const SUCCESS: Color = Color::rgb(0x2f, 0xa8, 0x4f);
const FAILURE: Color = Color::rgb(0xe0, 0x43, 0x43);

const OUTER_PAD: u32 = 20;
const ROW_HEIGHT: u32 = 40;
const LABEL_COLUMN: u32 = 90;
const MODE_COLUMN: u32 = 230;
const BUTTON_HEIGHT: u32 = 36;
const HEADER_HEIGHT: u32 = 30;
const FOOTER_HEIGHT: u32 = 40;

/// Everything the canvas needs to know besides the session.
#[derive(Debug, Copy, Clone)]
pub struct ViewState {
    pub focus: FieldId,
    /// Results scroll offset in pixels from the top.
    pub scroll: u32,
}

/// A composed frame plus the geometry the caller needs to clamp scrolling.
pub struct Frame {
    pub image: RgbaImage,
    pub content_height: u32,
    pub viewport_height: u32,
}

impl Frame {
    pub fn max_scroll(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport_height)
    }
}

#[derive(Default)]
pub struct Canvas {
    scale: f32,
    labels: HashMap<String, Option<RgbaImage>>,
    /// Label sources drawn during the current frame.
    drawn: HashSet<String>,
    images: HashMap<PathBuf, Option<RgbaImage>>,
}

impl Canvas {
    pub fn new(scale: f32) -> Self {
        Self {
            scale: scale.max(0.5),
            ..Self::default()
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        if (scale - self.scale).abs() > f32::EPSILON {
            self.scale = scale.max(0.5);
            self.labels.clear();
            self.images.clear();
        }
    }

    fn px(&self, logical: u32) -> u32 {
        (logical as f32 * self.scale).round() as u32
    }

    pub fn compose(&mut self, session: &Session, view: ViewState, size: (u32, u32)) -> Frame {
        let (width, height) = size;
        let mut frame = RgbaImage::from_pixel(width.max(1), height.max(1), rgba(WINDOW_BG));
        let pad = self.px(OUTER_PAD);
        let inner_width = width.saturating_sub(2 * pad);

        let mut y = pad;
        let title = self.label(APP_TITLE, 20.0, true, false, Align::Center, Color::WHITE, inner_width);
        if let Some(tile) = title {
            blit(&mut frame, tile, pad, y);
            y += tile.height();
        }
        y += self.px(10);

        y = self.draw_form(&mut frame, session, view.focus, pad, y, inner_width);
        y += self.px(20);

        // Execute button.
        let button_w = self.px(260).min(inner_width);
        let button_x = (width.saturating_sub(button_w)) / 2;
        let button_h = self.px(BUTTON_HEIGHT);
        fill_rect(&mut frame, button_x, y, button_w, button_h, ACCENT);
        if let Some(tile) = self.label(EXECUTE_LABEL, 16.0, true, false, Align::Center, Color::WHITE, button_w) {
            blit(&mut frame, tile, button_x, y + button_h.saturating_sub(tile.height()) / 2);
        }
        y += button_h + self.px(20);

        // Results frame.
        let footer_h = self.px(FOOTER_HEIGHT);
        let results_bottom = height.saturating_sub(footer_h);
        let results_h = results_bottom.saturating_sub(y);
        fill_rect(&mut frame, pad, y, inner_width, results_h, FRAME_BG);
        let header_h = self.px(HEADER_HEIGHT);
        if let Some(tile) = self.label(RESULTS_HEADER, 14.0, true, false, Align::Center, Color::WHITE, inner_width) {
            blit(&mut frame, tile, pad, y + header_h.saturating_sub(tile.height()) / 2);
        }

        let viewport_h = results_h.saturating_sub(header_h);
        let (viewport, content_height) =
            self.draw_results(session, view.scroll, inner_width, viewport_h);
        if let Some(viewport) = viewport {
            blit(&mut frame, &viewport, pad, y + header_h);
        }

        if let Some(tile) = self.label(FOOTER, 12.0, false, false, Align::Center, Color::WHITE, inner_width) {
            blit(&mut frame, tile, pad, results_bottom + footer_h.saturating_sub(tile.height()) / 2);
        }

        self.prune_labels();
        self.prune_images(session);

        Frame {
            image: frame,
            content_height,
            viewport_height: viewport_h,
        }
    }

    fn draw_form(
        &mut self,
        frame: &mut RgbaImage,
        session: &Session,
        focus: FieldId,
        x: u32,
        mut y: u32,
        width: u32,
    ) -> u32 {
        let row_h = self.px(ROW_HEIGHT);
        let fields = session.form().fields();
        fill_rect(frame, x, y, width, row_h * fields.len() as u32 + self.px(10), FRAME_BG);
        y += self.px(5);

        for field in fields {
            self.draw_row(frame, field, field.id() == focus, x, y, width);
            y += row_h;
        }
        y + self.px(5)
    }

    fn draw_row(
        &mut self,
        frame: &mut RgbaImage,
        field: &InputField,
        focused: bool,
        x: u32,
        y: u32,
        width: u32,
    ) {
        let row_h = self.px(ROW_HEIGHT);
        let label_w = self.px(LABEL_COLUMN);
        let mode_w = self.px(MODE_COLUMN);
        let gap = self.px(10);
        let inset = self.px(20);
        let border = self.px(2).max(1);

        if let Some(tile) = self.label(field.id().label(), 14.0, false, false, Align::Left, Color::WHITE, label_w) {
            blit(frame, tile, x + inset, y + row_h.saturating_sub(tile.height()) / 2);
        }

        let entry_x = x + inset + label_w;
        let entry_w = width.saturating_sub(inset + label_w + mode_w + gap);
        let entry_y = y + gap / 2;
        let entry_h = row_h.saturating_sub(gap);
        let bg = if field.is_editable() { ENTRY_BG } else { ENTRY_DISABLED };
        fill_rect(frame, entry_x, entry_y, entry_w, entry_h, bg);
        if focused {
            stroke_rect(frame, entry_x, entry_y, entry_w, entry_h, ACCENT, border);
        }

        let mut shown = field.value().to_string();
        if focused && field.is_editable() {
            shown.push('|');
        }
        if !shown.is_empty() {
            let ink = if field.is_editable() { Color::WHITE } else { GRAY };
            if let Some(tile) = self.label(&shown, 14.0, false, false, Align::Left, ink, entry_w.saturating_sub(gap)) {
                blit(frame, tile, entry_x + gap / 2, entry_y + entry_h.saturating_sub(tile.height()) / 2);
            }
        }

        // Segmented mode switch.
        let seg_x = entry_x + entry_w + gap;
        let seg_w = mode_w.saturating_sub(inset) / 2;
        for (idx, (text, active)) in [
            ("Keep Constant", !field.is_editable()),
            ("Enter Value", field.is_editable()),
        ]
        .into_iter()
        .enumerate()
        {
            let sx = seg_x + idx as u32 * seg_w;
            fill_rect(frame, sx, entry_y, seg_w, entry_h, if active { ACCENT } else { MUTED });
            if let Some(tile) = self.label(text, 11.0, false, false, Align::Center, Color::WHITE, seg_w) {
                blit(frame, tile, sx, entry_y + entry_h.saturating_sub(tile.height()) / 2);
            }
        }
    }

    /// Render the scrollable results into a viewport-sized image.
    fn draw_results(
        &mut self,
        session: &Session,
        scroll: u32,
        width: u32,
        viewport_h: u32,
    ) -> (Option<RgbaImage>, u32) {
        // (tile, x, space above, space below)
        let mut tiles: Vec<(RgbaImage, u32, u32, u32)> = Vec::new();
        let pad_x = self.px(10);
        let (top_gap, bottom_gap) = (self.px(10), self.px(20));
        let button_pad = self.px(6);
        let image_x = self.px(20);
        let (image_above, image_below) = (self.px(IMAGE_SPACING.top), self.px(IMAGE_SPACING.bottom));

        if let Some(notice) = session.notice() {
            if let Some(tile) = self.notice_tile(notice, width.saturating_sub(2 * pad_x)) {
                tiles.push((tile, pad_x, top_gap, bottom_gap));
            }
        } else if session.export_visible() {
            let text_w = self.px(320).min(width);
            if let Some(text) = self.label(EXPORT_LABEL, 14.0, true, false, Align::Center, Color::WHITE, text_w) {
                let mut button =
                    RgbaImage::from_pixel(text_w, text.height() + 2 * button_pad, rgba(ACCENT));
                blit(&mut button, text, 0, button_pad);
                tiles.push((button, pad_x, top_gap, bottom_gap));
            }
        }

        for widget in session.panel().widgets() {
            match widget {
                Widget::Label { text, style } => {
                    let box_w = width.saturating_sub(2 * pad_x);
                    let (above, below) = (self.px(style.spacing.top), self.px(style.spacing.bottom));
                    if let Some(tile) = self.styled_label(text, style, box_w) {
                        tiles.push((tile.clone(), pad_x, above, below));
                    }
                }
                Widget::Image { path, display, .. } => {
                    let (w, h) = (self.px(display.0), self.px(display.1));
                    if let Some(tile) = self.image(path, w, h) {
                        tiles.push((tile.clone(), image_x, image_above, image_below));
                    }
                }
            }
        }

        let content_height: u32 = tiles.iter().map(|(t, _, top, bottom)| top + t.height() + bottom).sum();
        if width == 0 || viewport_h == 0 {
            return (None, content_height);
        }

        let scroll = scroll.min(content_height.saturating_sub(viewport_h));
        let mut viewport = RgbaImage::from_pixel(width, viewport_h, rgba(FRAME_BG));
        let mut y: i64 = -i64::from(scroll);
        for (tile, x, top, bottom) in &tiles {
            y += i64::from(*top);
            let h = i64::from(tile.height());
            if y + h > 0 && y < i64::from(viewport_h) {
                imageops::overlay(&mut viewport, tile, i64::from(*x), y);
            }
            y += h + i64::from(*bottom);
        }

        (Some(viewport), content_height)
    }

    fn notice_tile(&mut self, notice: &Notice, width: u32) -> Option<RgbaImage> {
        let (ink, bold) = match notice.kind {
            NoticeKind::Success => (SUCCESS, true),
            NoticeKind::Error => (FAILURE, false),
        };
        self.label(&notice.message, 14.0, bold, false, Align::Left, ink, width)
            .cloned()
    }

    fn styled_label(&mut self, text: &str, style: &LabelStyle, width: u32) -> Option<&RgbaImage> {
        let align = match style.justify {
            Justify::Left => Align::Left,
            Justify::Center => Align::Center,
        };
        let ink = if style.italic { GRAY } else { Color::WHITE };
        self.label(
            text,
            style.size,
            style.weight == Weight::Bold,
            style.italic,
            align,
            ink,
            width,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn label(
        &mut self,
        text: &str,
        size: f32,
        bold: bool,
        italic: bool,
        align: Align,
        ink: Color,
        width_px: u32,
    ) -> Option<&RgbaImage> {
        if text.is_empty() || width_px == 0 {
            return None;
        }
        let request = LabelRequest {
            text: text.to_string(),
            size_pt: size,
            bold,
            italic,
            align,
            ink,
            width_pt: width_px as f32 / self.scale,
        };
        let key = request.to_source();
        let scale = self.scale;
        self.drawn.insert(key.clone());

        self.labels
            .entry(key)
            .or_insert_with(|| match typst::rasterize_label(&request, scale) {
                Ok(png) => decode_png(&png.data),
                Err(err) => {
                    log::warn!("canvas: cannot typeset label {text:?}: {err}");
                    None
                }
            })
            .as_ref()
    }

    fn image(&mut self, path: &Path, width: u32, height: u32) -> Option<&RgbaImage> {
        self.images
            .entry(path.to_path_buf())
            .or_insert_with(|| match image::open(path) {
                Ok(img) => {
                    let img = img.to_rgba8();
                    if img.dimensions() == (width, height) {
                        Some(img)
                    } else {
                        Some(imageops::resize(&img, width.max(1), height.max(1), imageops::FilterType::Triangle))
                    }
                }
                Err(err) => {
                    log::warn!("canvas: cannot load {}: {err}", path.display());
                    None
                }
            })
            .as_ref()
    }

    /// Drop rasters for labels that were not drawn this frame (stale cursor
    /// positions, old widths).
    fn prune_labels(&mut self) {
        let drawn = std::mem::take(&mut self.drawn);
        self.labels.retain(|key, _| drawn.contains(key));
    }

    /// Forget decoded images whose files are no longer on screen.
    fn prune_images(&mut self, session: &Session) {
        let live: Vec<&Path> = session
            .panel()
            .widgets()
            .iter()
            .filter_map(|w| match w {
                Widget::Image { path, .. } => Some(path.as_path()),
                Widget::Label { .. } => None,
            })
            .collect();
        self.images.retain(|path, _| live.contains(&path.as_path()));
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 0xff])
}

fn decode_png(data: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory_with_format(data, ImageFormat::Png) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            log::warn!("canvas: cannot decode label raster: {err}");
            None
        }
    }
}

fn blit(dst: &mut RgbaImage, src: &RgbaImage, x: u32, y: u32) {
    imageops::overlay(dst, src, i64::from(x), i64::from(y));
}

/// Fill a rectangle, clipped to the image.
pub fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Color) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    let px = rgba(color);
    for yy in y.min(y_end)..y_end {
        for xx in x.min(x_end)..x_end {
            img.put_pixel(xx, yy, px);
        }
    }
}

fn stroke_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Color, t: u32) {
    fill_rect(img, x, y, w, t, color);
    fill_rect(img, x, (y + h).saturating_sub(t), w, t, color);
    fill_rect(img, x, y, t, h, color);
    fill_rect(img, (x + w).saturating_sub(t), y, t, h, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut img = RgbaImage::new(4, 4);
        fill_rect(&mut img, 2, 2, 10, 10, Color::WHITE);
        assert_eq!(img.get_pixel(3, 3), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));

        fill_rect(&mut img, 9, 9, 2, 2, Color::WHITE);
    }

    #[test]
    fn composes_the_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(SessionConfig {
            image_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        });
        let mut canvas = Canvas::new(1.0);
        let view = ViewState {
            focus: FieldId::Pr,
            scroll: 0,
        };

        let frame = canvas.compose(&session, view, (800, 800));
        assert_eq!(frame.image.dimensions(), (800, 800));
        assert!(frame.viewport_height > 0);
        // Only the placeholder line.
        assert!(frame.content_height < 60);
        assert_eq!(frame.max_scroll(), 0);
    }

    #[test]
    fn results_grow_taller_than_the_viewport_after_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(SessionConfig {
            image_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        });
        session.run();

        let mut canvas = Canvas::new(1.0);
        let view = ViewState {
            focus: FieldId::K1,
            scroll: u32::MAX,
        };
        let frame = canvas.compose(&session, view, (800, 800));
        assert!(frame.max_scroll() > 0);
    }

    #[test]
    fn label_cache_keeps_only_what_the_last_frame_drew() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(SessionConfig {
            image_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        });
        session.form_mut().field_mut(FieldId::Pr).set_editable(true);
        let view = ViewState {
            focus: FieldId::Pr,
            scroll: 0,
        };

        let mut canvas = Canvas::new(1.0);
        canvas.compose(&session, view, (800, 800));
        let settled = canvas.labels.len();
        assert!(settled > 0);

        for c in "123456".chars() {
            session.form_mut().field_mut(FieldId::Pr).push_char(c);
            canvas.compose(&session, view, (800, 800));
        }
        assert_eq!(canvas.labels.len(), settled);

        for width in [640, 700, 760] {
            canvas.compose(&session, view, (width, 800));
        }
        assert_eq!(canvas.labels.len(), settled);
        assert!(canvas.drawn.is_empty());
    }
}
