//! The fixed house scene: ten (mesh, texture) pairs on a hardcoded
//! relative path set, in draw order.
//!
//! The order is a static author-chosen list, not depth sorting: every
//! opaque mesh is drawn before any mesh with translucent texels. This
//! can misrender overlapping transparent surfaces from some viewpoints
//! and is accepted for this small curated scene.

use std::path::Path;

use crate::error::ViewerResult;
use crate::primitives::textured_mesh::TexturedMesh;

pub struct SceneEntry {
    pub name: &'static str,
    pub mesh: &'static str,
    pub texture: &'static str,
    pub transparent: bool,
}

const fn opaque(name: &'static str, mesh: &'static str, texture: &'static str) -> SceneEntry {
    SceneEntry {
        name,
        mesh,
        texture,
        transparent: false,
    }
}

const fn transparent(name: &'static str, mesh: &'static str, texture: &'static str) -> SceneEntry {
    SceneEntry {
        name,
        mesh,
        texture,
        transparent: true,
    }
}

/// Draw order: opaque set first, transparent set last.
pub const HOUSE_SCENE: [SceneEntry; 10] = [
    opaque("bottles", "Bottles.ply", "bottles.bmp"),
    opaque("floor", "Floor.ply", "floor.bmp"),
    opaque("patio", "Patio.ply", "patio.bmp"),
    opaque("table", "Table.ply", "table.bmp"),
    opaque("walls", "Walls.ply", "walls.bmp"),
    opaque("window background", "WindowBG.ply", "windowbg.bmp"),
    opaque("wood objects", "WoodObjects.ply", "woodobjects.bmp"),
    transparent("door background", "DoorBG.ply", "doorbg.bmp"),
    transparent("metal objects", "MetalObjects.ply", "metalobjects.bmp"),
    transparent("curtains", "Curtains.ply", "curtains.bmp"),
];

/// Load every mesh of the manifest, preserving manifest order. Any
/// parse or read failure aborts the whole load.
pub fn load_scene(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture_layout: &wgpu::BindGroupLayout,
    assets_dir: &Path,
) -> ViewerResult<Vec<TexturedMesh>> {
    HOUSE_SCENE
        .iter()
        .map(|entry| TexturedMesh::load(device, queue, texture_layout, entry, assets_dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_meshes_with_opaque_before_transparent() {
        assert_eq!(HOUSE_SCENE.len(), 10);
        let first_transparent = HOUSE_SCENE
            .iter()
            .position(|e| e.transparent)
            .expect("scene has a transparent set");
        assert!(HOUSE_SCENE[first_transparent..].iter().all(|e| e.transparent));
        assert!(HOUSE_SCENE[..first_transparent].iter().all(|e| !e.transparent));
    }

    #[test]
    fn draw_order_is_pinned() {
        let names: Vec<&str> = HOUSE_SCENE.iter().map(|e| e.mesh).collect();
        assert_eq!(
            names,
            [
                "Bottles.ply",
                "Floor.ply",
                "Patio.ply",
                "Table.ply",
                "Walls.ply",
                "WindowBG.ply",
                "WoodObjects.ply",
                "DoorBG.ply",
                "MetalObjects.ply",
                "Curtains.ply",
            ]
        );
    }

    #[test]
    fn textures_pair_with_meshes() {
        for entry in HOUSE_SCENE.iter() {
            assert!(entry.mesh.ends_with(".ply"));
            assert!(entry.texture.ends_with(".bmp"));
            assert_eq!(
                entry.mesh.to_lowercase().trim_end_matches(".ply"),
                entry.texture.trim_end_matches(".bmp")
            );
        }
    }
}
