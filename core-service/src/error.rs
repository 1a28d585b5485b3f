use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Player initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The service task has ended; commands can no longer be delivered.
    #[error("Player service is not running")]
    ServiceStopped,

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
