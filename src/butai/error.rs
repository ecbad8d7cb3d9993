use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {0} not found")]
    NotFound(PathBuf),
    #[error("cannot read configuration file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {name}")]
    InvalidArgument { name: &'static str, value: String },
}

/// Mirrors the exception codes a scene manager raises on bad lookups.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("ItemNotFound: cannot find {kind} named '{name}'")]
    ItemNotFound { kind: &'static str, name: String },
    #[error("DuplicateItem: a {kind} named '{name}' already exists")]
    DuplicateItem { kind: &'static str, name: String },
    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),
    #[error("stale {0} handle")]
    StaleHandle(&'static str),
}

impl SceneError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        SceneError::ItemNotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        SceneError::DuplicateItem {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("FileNotFound: cannot locate resource {0}")]
    NotFound(String),
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot import mesh {path}: {source}")]
    Gltf { path: PathBuf, source: gltf::Error },
    #[error("cannot decode texture {path}: {source}")]
    Png {
        path: PathBuf,
        source: png::DecodingError,
    },
    #[error("texture {0} uses an unsupported pixel layout")]
    UnsupportedTexture(String),
    #[error("mesh {0} has no triangle geometry")]
    EmptyMesh(String),
    #[error("DuplicateItem: resource '{0}' already exists")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot create window: {0}")]
    Window(#[from] vulkano_win::CreationError),
    #[error("cannot create vulkan instance: {0}")]
    Instance(#[from] vulkano::instance::InstanceCreationError),
    #[error("no suitable GPU found")]
    NoDevice,
    #[error("cannot create logical device: {0}")]
    Device(#[from] vulkano::device::DeviceCreationError),
    #[error("cannot query surface capabilities: {0}")]
    Capabilities(#[from] vulkano::swapchain::CapabilitiesError),
    #[error("cannot create swapchain: {0}")]
    Swapchain(#[from] vulkano::swapchain::SwapchainCreationError),
    #[error("cannot allocate GPU memory: {0}")]
    Memory(#[from] vulkano::memory::DeviceMemoryAllocError),
    #[error("cannot upload image: {0}")]
    Image(#[from] vulkano::image::ImageCreationError),
    #[error("no viewport was added to the render window")]
    NoViewport,
    #[error("{what} failed: {message}")]
    Vulkan { what: &'static str, message: String },
}

pub(crate) trait VkResultExt<T> {
    fn vk(self, what: &'static str) -> Result<T, RenderError>;
}

impl<T, E: std::fmt::Display> VkResultExt<T> for std::result::Result<T, E> {
    fn vk(self, what: &'static str) -> Result<T, RenderError> {
        self.map_err(|e| RenderError::Vulkan {
            what,
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("unknown log level {0:?}")]
    Level(String),
    #[error("cannot open log file: {0}")]
    File(#[from] io::Error),
    #[error("cannot configure logger: {0}")]
    Setup(String),
}

/// Top-level error a lab reports from its single catch point.
#[derive(Debug, Error)]
pub enum ButaiError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Log(#[from] LogError),
}

pub type Result<T, E = ButaiError> = std::result::Result<T, E>;
