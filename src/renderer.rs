use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use log::{info, warn};
use std::path::{Path, PathBuf};
use stepjudge_core::{Confidence, Screen};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Transform};

const BACKGROUND: [u8; 3] = [255, 255, 255];
const INK: [u8; 3] = [0, 0, 0];

const LEFT_LABEL: &str = "Left/\nLinks";
const RIGHT_LABEL: &str = "Right/\nRechts";
const CONFIDENCE_PROMPT: &str = "How sure are you?\nWie sicher sind Sie?";

const CONFIDENCE_LABELS: [&str; 7] = [
    "Not at all confident\n\n(Überhaupt nicht sicher)",
    "Very unconfident\n\n(Sehr unsicher)",
    "Unconfident\n\n(Unsicher)",
    "Neither confident\nnor unconfident\n\n(Weder unsicher\nnoch sicher)",
    "Somewhat confident\n\n(Etwas sicher)",
    "Confident\n\n(Sicher)",
    "Very confident\n\n(Sehr sicher)",
];

const FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the given TTF, or the first readable system font. Without a font
/// the screens are drawn with shapes only.
pub fn load_font(explicit: Option<&Path>) -> Option<FontVec> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                info!("Using font {}", path.display());
                return Some(font);
            }
            Err(e) => warn!("Ignoring font {}: {e}", path.display()),
        }
    }

    warn!("No usable font found; screens will show symbols only");
    None
}

/// Draws the two experiment screens into an RGBA frame buffer.
///
/// Each screen is rasterised once per window size and then copied, so
/// switching screens costs a memcpy.
pub struct ScreenRenderer {
    width: u32,
    height: u32,
    font: Option<FontVec>,
    direction_canvas: Option<Pixmap>,
    confidence_canvas: Option<Pixmap>,
}

impl ScreenRenderer {
    pub fn new(width: u32, height: u32, font: Option<FontVec>) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            font,
            direction_canvas: None,
            confidence_canvas: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.direction_canvas = None;
        self.confidence_canvas = None;
    }

    /// Copies the screen into `frame`, which must be `width * height * 4` bytes
    pub fn render(&mut self, screen: Screen, hardware_connected: bool, frame: &mut [u8]) {
        let canvas = self.canvas(screen);
        let data = canvas.data();
        let n = data.len().min(frame.len());
        frame[..n].copy_from_slice(&data[..n]);

        if !hardware_connected {
            self.mark_offline(frame);
        }
    }

    fn canvas(&mut self, screen: Screen) -> &Pixmap {
        let (width, height) = (self.width, self.height);
        match screen {
            Screen::DirectionChoice => {
                if self.direction_canvas.is_none() {
                    let mut pm = blank(width, height);
                    self.draw_direction_screen(&mut pm);
                    self.direction_canvas = Some(pm);
                }
                self.direction_canvas.get_or_insert_with(|| blank(width, height))
            }
            Screen::ConfidenceRating => {
                if self.confidence_canvas.is_none() {
                    let mut pm = blank(width, height);
                    self.draw_confidence_screen(&mut pm);
                    self.confidence_canvas = Some(pm);
                }
                self.confidence_canvas.get_or_insert_with(|| blank(width, height))
            }
        }
    }

    fn title_size(&self) -> f32 {
        (self.height as f32 * 0.06).max(18.0)
    }

    fn body_size(&self) -> f32 {
        (self.height as f32 * 0.022).max(10.0)
    }

    fn draw_direction_screen(&self, pm: &mut Pixmap) {
        let (w, h) = (self.width as f32, self.height as f32);
        let (left_x, right_x, mid_y) = (w * 0.25, w * 0.75, h * 0.5);

        match &self.font {
            Some(font) => {
                let size = self.title_size();
                draw_text_block(pm, font, LEFT_LABEL, size, left_x, mid_y);
                draw_text_block(pm, font, RIGHT_LABEL, size, right_x, mid_y);
            }
            None => {
                let size = h * 0.2;
                draw_arrow(pm, left_x, mid_y, size, true);
                draw_arrow(pm, right_x, mid_y, size, false);
            }
        }
    }

    fn draw_confidence_screen(&self, pm: &mut Pixmap) {
        let (w, h) = (self.width as f32, self.height as f32);
        let column_w = w / Confidence::MAX as f32;

        if let Some(font) = &self.font {
            draw_text_block(pm, font, CONFIDENCE_PROMPT, self.title_size(), w * 0.5, h * 0.25);
        }

        for (i, rating) in Confidence::scale().enumerate() {
            let cx = column_w * (i as f32 + 0.5);
            match &self.font {
                Some(font) => {
                    let body = self.body_size();
                    draw_text_block(
                        pm,
                        font,
                        &rating.value().to_string(),
                        body * 1.6,
                        cx,
                        h * 0.55,
                    );
                    draw_text_block(pm, font, CONFIDENCE_LABELS[i], body, cx, h * 0.72);
                }
                None => draw_dot_column(pm, cx, h * 0.6, rating.value(), column_w * 0.12),
            }
        }
    }

    /// Small red square in the top-left corner while running without hardware
    fn mark_offline(&self, frame: &mut [u8]) {
        let side = (self.height / 60).clamp(6, 24) as usize;
        let stride = self.width as usize * 4;
        for y in 0..side.min(self.height as usize) {
            for x in 0..side.min(self.width as usize) {
                let i = y * stride + x * 4;
                if let Some(px) = frame.get_mut(i..i + 4) {
                    px.copy_from_slice(&[220, 30, 30, 255]);
                }
            }
        }
    }
}

fn blank(width: u32, height: u32) -> Pixmap {
    let mut pm = Pixmap::new(width, height)
        .or_else(|| Pixmap::new(1, 1))
        .unwrap_or_else(|| unreachable!("1x1 pixmap is always valid"));
    pm.fill(Color::from_rgba8(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], 255));
    pm
}

fn ink_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(INK[0], INK[1], INK[2], 255));
    paint.anti_alias = true;
    paint
}

/// Width of one line of text in pixels
pub fn measure_line<F: Font>(font: &F, text: &str, size: f32) -> f32 {
    let sf = font.as_scaled(PxScale::from(size));
    let mut width = 0.0f32;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            width += sf.kern(p, id);
        }
        width += sf.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Draws `\n`-separated lines centred on (`cx`, `cy`)
fn draw_text_block<F: Font>(pm: &mut Pixmap, font: &F, text: &str, size: f32, cx: f32, cy: f32) {
    let sf = font.as_scaled(PxScale::from(size));
    let line_h = sf.height() + sf.line_gap();
    let lines: Vec<&str> = text.split('\n').collect();
    let top = cy - line_h * lines.len() as f32 / 2.0;

    for (i, line) in lines.iter().enumerate() {
        let x = cx - measure_line(font, line, size) / 2.0;
        let baseline = top + line_h * i as f32 + sf.ascent();
        draw_line(pm, font, line, size, x, baseline);
    }
}

fn draw_line<F: Font>(pm: &mut Pixmap, font: &F, text: &str, size: f32, x: f32, baseline: f32) {
    let scale = PxScale::from(size);
    let sf = font.as_scaled(scale);
    let (w, h) = (pm.width() as i32, pm.height() as i32);
    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();

    let mut pen_x = x;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            pen_x += sf.kern(p, id);
        }
        let glyph = Glyph {
            id,
            scale,
            position: point(pen_x, baseline),
        };
        pen_x += sf.h_advance(id);
        prev = Some(id);

        let Some(outline) = font.outline_glyph(glyph) else {
            continue;
        };
        let b = outline.px_bounds();
        outline.draw(|gx, gy, cov| {
            let ix = b.min.x as i32 + gx as i32;
            let iy = b.min.y as i32 + gy as i32;
            if cov <= f32::EPSILON || ix < 0 || iy < 0 || ix >= w || iy >= h {
                return;
            }
            let i = iy as usize * stride + ix as usize;
            let bg = dst[i];
            let cov = cov.clamp(0.0, 1.0);
            let mix = |ink: u8, bg: u8| (ink as f32 * cov + bg as f32 * (1.0 - cov)) as u8;
            if let Some(px) = PremultipliedColorU8::from_rgba(
                mix(INK[0], bg.red()),
                mix(INK[1], bg.green()),
                mix(INK[2], bg.blue()),
                255,
            ) {
                dst[i] = px;
            }
        });
    }
}

fn draw_arrow(pm: &mut Pixmap, x: f32, y: f32, size: f32, pointing_left: bool) {
    let dir = if pointing_left { -1.0 } else { 1.0 };
    let mut path = PathBuilder::new();
    path.move_to(x + dir * size / 2.0, y);
    path.line_to(x - dir * size / 2.0, y - size / 3.0);
    path.line_to(x - dir * size / 6.0, y);
    path.line_to(x - dir * size / 2.0, y + size / 3.0);
    path.close();

    if let Some(arrow) = path.finish() {
        pm.fill_path(&arrow, &ink_paint(), FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_dot_column(pm: &mut Pixmap, cx: f32, top: f32, count: u8, radius: f32) {
    let paint = ink_paint();
    let radius = radius.max(2.0);
    for i in 0..count {
        let cy = top + i as f32 * radius * 3.0;
        if let Some(circle) = PathBuilder::from_circle(cx, cy, radius) {
            pm.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
    // Baseline under each column so empty space reads as a scale
    if let Some(rule) = Rect::from_xywh(cx - radius * 2.0, top - radius * 3.0, radius * 4.0, 2.0) {
        pm.fill_rect(rule, &paint, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    }

    #[test]
    fn test_direction_screen_without_font_shows_arrows() {
        let (w, h) = (400, 200);
        let mut renderer = ScreenRenderer::new(w, h, None);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        renderer.render(Screen::DirectionChoice, true, &mut frame);

        assert_eq!(pixel(&frame, w, 2, 2), [255, 255, 255, 255]);
        // Arrow bodies sit at a quarter and three quarters of the width
        assert_eq!(pixel(&frame, w, w / 4, h / 2)[..3], [0, 0, 0]);
        assert_eq!(pixel(&frame, w, w * 3 / 4, h / 2)[..3], [0, 0, 0]);
    }

    #[test]
    fn test_screens_render_differently() {
        let (w, h) = (350, 210);
        let mut renderer = ScreenRenderer::new(w, h, None);
        let mut direction = vec![0u8; (w * h * 4) as usize];
        let mut confidence = direction.clone();

        renderer.render(Screen::DirectionChoice, true, &mut direction);
        renderer.render(Screen::ConfidenceRating, true, &mut confidence);
        assert_ne!(direction, confidence);

        // Cached canvases give identical output on repeat
        let mut again = vec![0u8; direction.len()];
        renderer.render(Screen::DirectionChoice, true, &mut again);
        assert_eq!(direction, again);
    }

    #[test]
    fn test_offline_marker() {
        let (w, h) = (200, 120);
        let mut renderer = ScreenRenderer::new(w, h, None);
        let mut frame = vec![0u8; (w * h * 4) as usize];

        renderer.render(Screen::ConfidenceRating, false, &mut frame);
        assert_eq!(pixel(&frame, w, 1, 1), [220, 30, 30, 255]);

        renderer.render(Screen::ConfidenceRating, true, &mut frame);
        assert_eq!(pixel(&frame, w, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_resize_drops_cached_canvases() {
        let mut renderer = ScreenRenderer::new(100, 100, None);
        let mut frame = vec![0u8; 100 * 100 * 4];
        renderer.render(Screen::DirectionChoice, true, &mut frame);

        renderer.resize(50, 40);
        let mut small = vec![0u8; 50 * 40 * 4];
        renderer.render(Screen::DirectionChoice, true, &mut small);
        assert_eq!(pixel(&small, 50, 0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_explicit_font_yields_none() {
        assert!(load_font(Some(Path::new("/nonexistent/font.ttf"))).is_none());
    }
}
