// geometry/mod.rs
// Vector math and projection
pub mod projection;
pub mod vector;
