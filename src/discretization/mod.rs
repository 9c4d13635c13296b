pub mod grid;
pub mod stencil;
