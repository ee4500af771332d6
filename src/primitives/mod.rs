pub mod camera;
pub mod mesh;
pub mod texture;
pub mod textured_mesh;
pub mod vertex;
