use crate::error::RenderError;
use crate::figure::{Mesh, PerVertexParams, RenderableMesh, Topology};
use crate::resources::ResourceGroupManager;
use crate::scene::material::Material;
use crate::scene::{Renderable, SceneSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use vulkano::buffer::BufferUsage;
use vulkano::buffer::CpuAccessibleBuffer;
use vulkano::device::Queue;
use vulkano::format::Format;
use vulkano::image::{Dimensions, ImmutableImage, MipmapsCount};

/// A mesh uploaded to the GPU.
#[derive(Debug)]
pub struct GpuMesh {
    pub topology: Topology,
    pub vertices: Arc<CpuAccessibleBuffer<[PerVertexParams]>>,
    pub indices: Option<Arc<CpuAccessibleBuffer<[u32]>>>,
}

/// How a renderable's material shows up in the geometry pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceParams {
    pub texture: Option<String>,
    pub tint: [f32; 4],
    /// x emissive level, yz texture tiling.
    pub params: [f32; 4],
}

impl SurfaceParams {
    pub fn of(material: &Material) -> Self {
        let d = material.diffuse;
        SurfaceParams {
            texture: material.texture.clone(),
            tint: [d.r, d.g, d.b, d.a],
            params: [
                material.emissive_level(),
                material.tiling[0],
                material.tiling[1],
                0.0,
            ],
        }
    }
}

/// Resolves the material a renderable is drawn with: its own override, else
/// the mesh's material name from the registry, else the mesh's material.
pub fn resolve_material<'r>(
    renderable: &'r Renderable,
    resources: &'r ResourceGroupManager,
) -> &'r Material {
    let mesh_material = &renderable.mesh.material;
    let name = renderable
        .material
        .as_deref()
        .unwrap_or_else(|| mesh_material.name.as_str());
    resources.material(name).unwrap_or(mesh_material)
}

/// One draw call of the geometry pass.
pub struct DrawBatch {
    pub mesh: Arc<GpuMesh>,
    pub texture: Arc<ImmutableImage<Format>>,
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub params: [f32; 4],
}

/// GPU copies of the meshes and textures the scene references.
///
/// Meshes are keyed by name and re-uploaded when the scene swaps in a
/// different mesh under the same name.
pub struct SceneCache {
    gfx_queue: Arc<Queue>,
    meshes: HashMap<String, (Arc<Mesh>, Arc<GpuMesh>)>,
    textures: HashMap<String, Arc<ImmutableImage<Format>>>,
    missing_textures: HashSet<String>,
    white: Arc<ImmutableImage<Format>>,
}

impl SceneCache {
    pub fn new(gfx_queue: Arc<Queue>) -> Result<Self, RenderError> {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let white = upload_rgba(&gfx_queue, 1, 1, &[255, 255, 255, 255])?;
        Ok(SceneCache {
            gfx_queue,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            missing_textures: HashSet::new(),
            white,
        })
    }

    /// Builds this frame's draw batches, uploading whatever is new.
    pub fn prepare(
        &mut self,
        snapshot: &SceneSnapshot,
        resources: &mut ResourceGroupManager,
    ) -> Result<Vec<DrawBatch>, RenderError> {
        let mut batches = Vec::with_capacity(snapshot.renderables.len());
        for renderable in &snapshot.renderables {
            if renderable.mesh.is_empty() {
                continue;
            }
            let mesh = self.mesh(&renderable.mesh)?;
            let surface = SurfaceParams::of(resolve_material(renderable, resources));
            let texture = match &surface.texture {
                Some(name) => self.texture(name, resources)?,
                None => self.white.clone(),
            };
            batches.push(DrawBatch {
                mesh,
                texture,
                model: renderable.world.into(),
                tint: surface.tint,
                params: surface.params,
            });
        }
        Ok(batches)
    }

    fn mesh(&mut self, mesh: &Arc<Mesh>) -> Result<Arc<GpuMesh>, RenderError> {
        if let Some((source, gpu)) = self.meshes.get(&mesh.name) {
            if Arc::ptr_eq(source, mesh) {
                return Ok(gpu.clone());
            }
        }
        log::debug!("uploading mesh {} ({} vertices)", mesh.name, mesh.vertex_count());
        let device = self.gfx_queue.device().clone();
        let vertices = CpuAccessibleBuffer::from_iter(
            device.clone(),
            BufferUsage::vertex_buffer(),
            false,
            mesh.geometry.vertices().into_iter(),
        )?;
        let indices = match &mesh.geometry {
            RenderableMesh::Indexed(ind) => Some(CpuAccessibleBuffer::from_iter(
                device,
                BufferUsage::index_buffer(),
                false,
                ind.indices.iter().cloned(),
            )?),
            RenderableMesh::Regular(_) => None,
        };
        let gpu = Arc::new(GpuMesh {
            topology: mesh.topology,
            vertices,
            indices,
        });
        self.meshes
            .insert(mesh.name.clone(), (mesh.clone(), gpu.clone()));
        Ok(gpu)
    }

    fn texture(
        &mut self,
        name: &str,
        resources: &mut ResourceGroupManager,
    ) -> Result<Arc<ImmutableImage<Format>>, RenderError> {
        if let Some(image) = self.textures.get(name) {
            return Ok(image.clone());
        }
        if self.missing_textures.contains(name) {
            return Ok(self.white.clone());
        }
        match resources.texture(name) {
            Ok(texture) => {
                let image = upload_rgba(
                    &self.gfx_queue,
                    texture.width,
                    texture.height,
                    &texture.rgba,
                )?;
                self.textures.insert(name.to_owned(), image.clone());
                Ok(image)
            }
            Err(e) => {
                log::warn!("{}, drawing untextured", e);
                self.missing_textures.insert(name.to_owned());
                Ok(self.white.clone())
            }
        }
    }
}

fn upload_rgba(
    gfx_queue: &Arc<Queue>,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Arc<ImmutableImage<Format>>, RenderError> {
    let (image, _upload) = ImmutableImage::from_iter(
        rgba.iter().cloned(),
        Dimensions::Dim2d { width, height },
        MipmapsCount::One,
        Format::R8G8B8A8Srgb,
        gfx_queue.clone(),
    )?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::prefab;
    use nalgebra::Matrix4;
    use crate::scene::material::{grid_plane_material, Colour};

    fn renderable(mesh: Mesh, material: Option<&str>) -> Renderable {
        Renderable {
            mesh: Arc::new(mesh),
            material: material.map(str::to_owned),
            world: Matrix4::identity(),
        }
    }

    #[test]
    fn override_wins_over_mesh_material() {
        let mut resources = ResourceGroupManager::new();
        resources.register_material(Material::new("Red").with_diffuse(Colour::rgb(1.0, 0.0, 0.0)));
        let r = renderable(prefab::professor("DustinBody.mesh"), Some("Red"));
        assert_eq!(resolve_material(&r, &resources).name, "Red");
    }

    #[test]
    fn unknown_names_fall_back_to_the_mesh_material() {
        let resources = ResourceGroupManager::new();
        let mesh = prefab::professor("DustinBody.mesh")
            .with_material(Material::new("Skin").with_diffuse(Colour::grey(0.5)));
        let r = renderable(mesh, Some("NoSuchMaterial"));
        let material = resolve_material(&r, &resources);
        assert_eq!(material.name, "Skin");
        assert_eq!(material.diffuse, Colour::grey(0.5));
    }

    #[test]
    fn grid_lines_are_fully_emissive() {
        let surface = SurfaceParams::of(&grid_plane_material());
        assert_eq!(surface.params[0], 1.0);
        assert_eq!(surface.texture, None);
    }

    #[test]
    fn tiling_is_forwarded() {
        let mut material = Material::new("Ground").with_texture("KPU_LOGO.png");
        material.tiling = [10.0, 10.0];
        let surface = SurfaceParams::of(&material);
        assert_eq!(surface.params, [0.0, 10.0, 10.0, 0.0]);
        assert_eq!(surface.texture.as_deref(), Some("KPU_LOGO.png"));
        assert_eq!(surface.tint, [1.0, 1.0, 1.0, 1.0]);
    }
}
