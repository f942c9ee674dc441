//! Help overlay showing keyboard shortcuts.

use nannou::prelude::*;

use super::bindings::SHORTCUTS;

/// Manages help overlay visibility
#[derive(Default)]
pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn draw(&self, draw: &Draw, track: Option<&str>) {
        if !self.visible {
            return;
        }

        let padding = 25.0;
        let line_height = 24.0;
        let font_size = 18;
        let key_col_width = 120.0;
        let overlay_width = 520.0;

        // Title + shortcuts + current track
        let lines = SHORTCUTS.len() + 3;
        let overlay_height = line_height * lines as f32 + padding * 2.0;

        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(overlay_width, overlay_height)
            .color(rgba(0.0, 0.0, 0.0, 0.9));
        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(overlay_width, overlay_height)
            .stroke(rgba(1.0, 1.0, 1.0, 0.3))
            .stroke_weight(1.0)
            .no_fill();

        let start_y = overlay_height / 2.0 - padding - line_height / 2.0;
        let inner_width = overlay_width - padding * 2.0;

        draw.text("--- bloom-viz ---")
            .xy(pt2(0.0, start_y))
            .wh(pt2(inner_width, line_height))
            .center_justify()
            .color(rgba(0.5, 0.8, 1.0, 0.8))
            .font_size(font_size);

        let left_edge = -overlay_width / 2.0 + padding;
        let desc_width = inner_width - key_col_width - 15.0;
        for (i, (key, desc)) in SHORTCUTS.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            let y = start_y - (i + 2) as f32 * line_height;
            draw.text(key)
                .xy(pt2(left_edge + key_col_width / 2.0, y))
                .wh(pt2(key_col_width, line_height))
                .right_justify()
                .color(rgb(0.3, 0.8, 1.0))
                .font_size(font_size);
            draw.text(desc)
                .xy(pt2(left_edge + key_col_width + 15.0 + desc_width / 2.0, y))
                .wh(pt2(desc_width, line_height))
                .left_justify()
                .color(rgb(1.0, 1.0, 1.0))
                .font_size(font_size);
        }

        let status = match track {
            Some(name) => format!("Playing: {}", name),
            None => "No track loaded".to_string(),
        };
        draw.text(&status)
            .xy(pt2(0.0, -overlay_height / 2.0 + padding + line_height / 2.0))
            .wh(pt2(inner_width, line_height))
            .center_justify()
            .color(rgba(1.0, 1.0, 1.0, 0.6))
            .font_size(font_size - 4);
    }
}
