pub mod bindings;
pub mod drop_prompt;
pub mod help_overlay;
pub mod stats_overlay;
