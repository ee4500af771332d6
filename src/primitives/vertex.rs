use bytemuck::Zeroable;
use std::mem;

/// One vertex as read from a mesh file: position, then optional normal,
/// texture coordinate, and color groups. Groups absent from the source
/// line stay zeroed.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Build a vertex from the float fields of one mesh-file line,
    /// consumed positionally and greedily: position (required), then
    /// normal if 3 more remain, then uv if 2 more remain, then color if
    /// 3 more remain. Trailing extras are ignored.
    ///
    /// Callers must have checked `fields.len() >= 3`.
    pub fn from_fields(fields: &[f32]) -> Self {
        let mut vertex = Vertex::zeroed();
        vertex.position = [fields[0], fields[1], fields[2]];

        let mut at = 3;
        if fields.len() - at >= 3 {
            vertex.normal = [fields[at], fields[at + 1], fields[at + 2]];
            at += 3;
        }
        if fields.len() - at >= 2 {
            vertex.uv = [fields[at], fields[at + 1]];
            at += 2;
        }
        if fields.len() - at >= 3 {
            vertex.color = [fields[at], fields[at + 1], fields[at + 2]];
        }
        vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_eleven_floats() {
        assert_eq!(mem::size_of::<Vertex>(), 44);
    }

    #[test]
    fn position_only_leaves_rest_zeroed() {
        let v = Vertex::from_fields(&[1.0, 2.0, 3.0]);
        assert_eq!(v.position, [1.0, 2.0, 3.0]);
        assert_eq!(v.normal, [0.0; 3]);
        assert_eq!(v.uv, [0.0; 2]);
        assert_eq!(v.color, [0.0; 3]);
    }

    #[test]
    fn partial_normal_group_is_read_as_uv() {
        // Five fields: the normal group is incomplete, so the two extras
        // land in the uv group.
        let v = Vertex::from_fields(&[1.0, 2.0, 3.0, 0.5, 0.25]);
        assert_eq!(v.normal, [0.0; 3]);
        assert_eq!(v.uv, [0.5, 0.25]);
    }

    #[test]
    fn all_groups_present() {
        let v = Vertex::from_fields(&[
            1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.5, 0.5, 0.9, 0.8, 0.7,
        ]);
        assert_eq!(v.position, [1.0, 2.0, 3.0]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        assert_eq!(v.uv, [0.5, 0.5]);
        assert_eq!(v.color, [0.9, 0.8, 0.7]);
    }
}
