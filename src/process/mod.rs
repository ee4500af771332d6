pub mod bmp;
pub mod pipeline;
pub mod ply;
