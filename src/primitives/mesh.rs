use crate::primitives::vertex::Vertex;

/// Parsed mesh geometry: vertices in file order (index = identity) and
/// triangle index triples into that list.
#[derive(Debug)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn new() -> Self {
        MeshData {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flat index view for the GPU index buffer.
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.triangles)
    }
}

impl Default for MeshData {
    fn default() -> Self {
        Self::new()
    }
}
