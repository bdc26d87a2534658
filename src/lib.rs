//! Minimal software rendering pipeline.
//!
//! Meshes of points, lines or triangles are projected onto a logical pixel
//! grid and scan-converted into an RGBA8 [`core::frame_buffer::FrameBuffer`].

pub mod core;
pub mod geometry;
pub mod io;
pub mod scene;
pub mod utils;
