//! Stats overlay: frame rate, detector energies and entity counts.

use bloom_viz_core::{FrameEvents, TriggerCounts};
use nannou::prelude::*;
use std::time::Instant;

/// What the overlay shows for one frame
#[derive(Clone, Debug, Default)]
pub struct StatsSnapshot {
    pub events: FrameEvents,
    pub particles: usize,
    pub shockwaves: usize,
    pub triggers: TriggerCounts,
    pub elapsed: f32,
}

pub struct StatsOverlay {
    pub visible: bool,
    /// Last frame time for FPS calculation
    last_frame_time: Instant,
    /// Smoothed FPS display value
    display_fps: f32,
}

impl StatsOverlay {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            last_frame_time: Instant::now(),
            display_fps: 0.0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        let current_fps = if delta > 0.0 { 1.0 / delta } else { 0.0 };
        // Smooth FPS with exponential moving average
        self.display_fps = self.display_fps * 0.9 + current_fps * 0.1;
        self.last_frame_time = now;
    }

    pub fn fps(&self) -> f32 {
        self.display_fps
    }

    pub fn lines(&self, stats: &StatsSnapshot) -> Vec<String> {
        let e = &stats.events;
        let t = &stats.triggers;
        vec![
            format!("fps      {:5.1}", self.display_fps),
            format!("clock    {:5.1}s", stats.elapsed),
            format!("amp      {:.3}", e.amplitude),
            format!("bass     {:.3}", e.bass_energy),
            format!("treble   {:.3}", e.treble_energy),
            format!("high     {:.3}", e.high_energy),
            format!("particles {}  waves {}", stats.particles, stats.shockwaves),
            format!(
                "beats {}  drops {}  bursts {}  claps {}",
                t.beats, t.bass_drops, t.treble_bursts, t.claps
            ),
        ]
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect, stats: &StatsSnapshot) {
        if !self.visible {
            return;
        }

        let lines = self.lines(stats);
        let line_height = 18.0;
        let width = 300.0;
        let height = line_height * lines.len() as f32 + 16.0;
        let top_left = pt2(bounds.left() + 12.0, bounds.top() - 12.0);

        draw.rect()
            .xy(top_left + vec2(width / 2.0, -height / 2.0))
            .w_h(width, height)
            .color(rgba(0.0, 0.0, 0.0, 0.6));

        for (i, line) in lines.iter().enumerate() {
            let y = top_left.y - 8.0 - line_height * (i as f32 + 0.5);
            draw.text(line)
                .xy(pt2(top_left.x + width / 2.0, y))
                .wh(pt2(width - 16.0, line_height))
                .left_justify()
                .font_size(13)
                .color(rgb(0.8, 0.95, 0.8));
        }

        // Flash markers for this frame's triggers
        let flags = [
            (stats.events.beat, rgb(1.0, 0.4, 0.2)),
            (stats.events.bass_drop, rgb(1.0, 0.1, 0.1)),
            (stats.events.treble_burst, rgb(0.3, 0.6, 1.0)),
            (stats.events.clap, rgb(1.0, 1.0, 1.0)),
        ];
        for (i, (on, color)) in flags.iter().enumerate() {
            if *on {
                draw.ellipse()
                    .xy(top_left + vec2(width + 14.0 + i as f32 * 16.0, -10.0))
                    .radius(5.0)
                    .color(*color);
            }
        }
    }
}
