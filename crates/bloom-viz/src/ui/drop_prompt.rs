//! Prompt shown while no track is loaded.

use nannou::prelude::*;

pub const PROMPT: &str = "Drag and drop an audio file here";

/// Alpha of the prompt text, breathing slowly between 0.45 and 0.95
pub fn prompt_alpha(time: f32) -> f32 {
    0.7 + 0.25 * (time * 1.6).sin()
}

pub fn draw(draw: &Draw, bounds: Rect, time: f32) {
    draw.text(PROMPT)
        .xy(bounds.xy())
        .wh(vec2(bounds.w(), 60.0))
        .center_justify()
        .font_size(28)
        .color(rgba(1.0, 1.0, 1.0, prompt_alpha(time)));

    draw.text("press H for help")
        .xy(bounds.xy() - vec2(0.0, 40.0))
        .wh(vec2(bounds.w(), 30.0))
        .center_justify()
        .font_size(14)
        .color(rgba(1.0, 1.0, 1.0, 0.4));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_alpha_stays_visible() {
        for i in 0..1000 {
            let a = prompt_alpha(i as f32 * 0.01);
            assert!((0.45..=0.95).contains(&a));
        }
    }
}
