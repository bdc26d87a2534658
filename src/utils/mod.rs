// utils/mod.rs
pub mod color_utils;
pub mod render_process;
pub mod save_utils;
