use thiserror::Error;

/// Problems with the level, sprite or shape data, raised while loading.
///
/// Everything here is detected before the first frame runs, so a running
/// scene never has to deal with a half-valid level.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no physics shape named `{key}`")]
    UnknownShape { key: String },
    #[error("no sprite named `{key}`")]
    UnknownSprite { key: String },
    #[error("physics shape `{key}` has no vertices")]
    EmptyShape { key: String },
}

/// GPU setup failures; fatal for the app.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
