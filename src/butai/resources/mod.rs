pub mod gltf;

use crate::error::ResourceError;
use crate::figure::prefab::{self, PlaneParams};
use crate::figure::Mesh;
use crate::scene::material::{grid_plane_material, Material};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const BASE_WHITE: &str = "BaseWhite";
pub const KPU_LOGO: &str = "KPU_LOGO";
const KPU_LOGO_TEXTURE: &str = "KPU_LOGO.png";

/// Decoded RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Resolves mesh, material and texture names against the resource locations.
///
/// Meshes are loaded once and shared; a mesh name `foo.mesh` is looked up as
/// `foo.gltf` then `foo.glb`, and falls back to the built-in stand-ins.
#[derive(Debug)]
pub struct ResourceGroupManager {
    locations: Vec<PathBuf>,
    meshes: HashMap<String, Arc<Mesh>>,
    materials: HashMap<String, Material>,
    textures: HashMap<String, Arc<Texture>>,
    fallback: Material,
}

impl Default for ResourceGroupManager {
    fn default() -> Self {
        ResourceGroupManager::new()
    }
}

impl ResourceGroupManager {
    pub fn new() -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        let mut materials = HashMap::new();
        materials.insert(BASE_WHITE.to_owned(), Material::new(BASE_WHITE));
        ResourceGroupManager {
            locations: Vec::new(),
            meshes: HashMap::new(),
            materials,
            textures: HashMap::new(),
            fallback: Material::new(BASE_WHITE),
        }
    }

    pub fn add_resource_location<P: AsRef<Path>>(&mut self, location: P) {
        let location = location.as_ref().to_owned();
        if !location.is_dir() {
            log::warn!(
                "resource location {} is not a directory, skipping its files",
                location.display()
            );
        }
        if !self.locations.contains(&location) {
            log::info!("added resource location {}", location.display());
            self.locations.push(location);
        }
    }

    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Registers the materials every lab expects to exist.
    pub fn initialise_all_resource_groups(&mut self) {
        self.register_material(grid_plane_material());
        let mut logo = Material::new(KPU_LOGO);
        if self.locate(KPU_LOGO_TEXTURE).is_some() {
            logo = logo.with_texture(KPU_LOGO_TEXTURE);
        } else {
            log::warn!(
                "{} not found in any resource location, {} is drawn untextured",
                KPU_LOGO_TEXTURE,
                KPU_LOGO
            );
        }
        self.register_material(logo);
        log::info!(
            "resource groups initialised: {} locations, {} materials",
            self.locations.len(),
            self.materials.len()
        );
    }

    /// First existing file with this name, searching locations in order.
    pub fn locate(&self, file: &str) -> Option<PathBuf> {
        self.locations
            .iter()
            .map(|location| location.join(file))
            .find(|path| path.is_file())
    }

    pub fn load_mesh(&mut self, name: &str) -> Result<Arc<Mesh>, ResourceError> {
        if let Some(mesh) = self.meshes.get(name) {
            return Ok(mesh.clone());
        }
        let stem = name.strip_suffix(".mesh").unwrap_or(name);
        let file = [format!("{}.gltf", stem), format!("{}.glb", stem)]
            .iter()
            .find_map(|candidate| self.locate(candidate));
        let mesh = match file {
            Some(path) => gltf::load_mesh(&path, name)?,
            None => {
                let mesh =
                    prefab::builtin(name).ok_or_else(|| ResourceError::NotFound(name.to_owned()))?;
                log::info!("mesh {} not found on disk, using built-in stand-in", name);
                mesh
            }
        };
        let mesh = Arc::new(mesh);
        self.meshes.insert(name.to_owned(), mesh.clone());
        Ok(mesh)
    }

    /// Builds and registers a plane mesh under `params.name`.
    pub fn create_plane(&mut self, params: &PlaneParams) -> Result<Arc<Mesh>, ResourceError> {
        if self.meshes.contains_key(&params.name) {
            return Err(ResourceError::Duplicate(params.name.clone()));
        }
        let mesh = Arc::new(prefab::plane(params));
        self.meshes.insert(params.name.clone(), mesh.clone());
        Ok(mesh)
    }

    pub fn mesh(&self, name: &str) -> Option<&Arc<Mesh>> {
        self.meshes.get(name)
    }

    pub fn register_material(&mut self, material: Material) {
        if self.materials.contains_key(&material.name) {
            log::debug!("material {} replaced", material.name);
        }
        self.materials.insert(material.name.clone(), material);
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn material_or_default(&self, name: &str) -> &Material {
        self.materials.get(name).unwrap_or(&self.fallback)
    }

    pub fn texture(&mut self, name: &str) -> Result<Arc<Texture>, ResourceError> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(texture.clone());
        }
        let path = self
            .locate(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_owned()))?;
        let texture = Arc::new(decode_png(&path, name)?);
        self.textures.insert(name.to_owned(), texture.clone());
        Ok(texture)
    }
}

fn decode_png(path: &Path, name: &str) -> Result<Texture, ResourceError> {
    let file = File::open(path).map_err(|source| ResourceError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let png_error = |source| ResourceError::Png {
        path: path.to_owned(),
        source,
    };
    let (info, mut reader) = decoder.read_info().map_err(png_error)?;
    let mut data = vec![0; info.buffer_size()];
    reader.next_frame(&mut data).map_err(png_error)?;

    let pixels = (info.width * info.height) as usize;
    let rgba = match info.color_type {
        png::ColorType::RGBA => data,
        png::ColorType::RGB => data
            .chunks_exact(3)
            .flat_map(|c| vec![c[0], c[1], c[2], 255])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&g| vec![g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|c| vec![c[0], c[0], c[0], c[1]])
            .collect(),
        png::ColorType::Indexed => return Err(ResourceError::UnsupportedTexture(name.to_owned())),
    };
    if rgba.len() != pixels * 4 {
        return Err(ResourceError::UnsupportedTexture(name.to_owned()));
    }
    log::debug!("texture {} decoded, {}x{}", name, info.width, info.height);
    Ok(Texture {
        name: name.to_owned(),
        width: info.width,
        height: info.height,
        rgba,
    })
}
