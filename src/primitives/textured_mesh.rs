use std::path::Path;

use wgpu::util::DeviceExt;

use crate::error::ViewerResult;
use crate::primitives::texture::Texture;
use crate::process::{bmp, ply};
use crate::scene::SceneEntry;

/// One mesh with its texture, GPU-resident. The parsed CPU geometry is
/// dropped after upload; only the handles and the index count survive.
pub struct TexturedMesh {
    name: &'static str,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    #[allow(dead_code)]
    texture: Texture,
    texture_bind_group: wgpu::BindGroup,
    transparent: bool,
}

impl TexturedMesh {
    /// Parse the mesh and texture files for one scene entry and upload
    /// them. Either parse failure aborts startup; no partial mesh is
    /// ever constructed.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_layout: &wgpu::BindGroupLayout,
        entry: &SceneEntry,
        assets_dir: &Path,
    ) -> ViewerResult<Self> {
        let mesh = ply::load_ply(&assets_dir.join(entry.mesh))?;
        let image = bmp::load_bmp(&assets_dir.join(entry.texture))?;
        log::info!(
            "loaded {}: {} vertices, {} triangles, {}x{} texture",
            entry.name,
            mesh.vertex_count(),
            mesh.triangle_count(),
            image.width,
            image.height
        );

        let texture = Texture::from_bmp(device, queue, &image, entry.texture);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(entry.mesh),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(entry.mesh),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(entry.name),
        });

        Ok(Self {
            name: entry.name,
            vertex_buffer,
            index_buffer,
            index_count: (mesh.triangle_count() * 3) as u32,
            texture,
            texture_bind_group,
            transparent: entry.transparent,
        })
    }

    /// Record one indexed draw covering all of this mesh's triangles.
    /// The camera uniform (group 0) and the pipeline are already bound
    /// by the frame renderer.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}
