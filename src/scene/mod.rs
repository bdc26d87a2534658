// scene/mod.rs
pub mod cubes;
pub mod mesh;
pub mod shapes;
