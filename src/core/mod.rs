// core/mod.rs
// Pixel buffer, scan conversion and the mesh renderer
pub mod frame_buffer;
pub mod rasterizer;
pub mod renderer;
