use hoist_api::HoistError;

pub type UploadResult<T> = Result<T, UploadError>;

/// Everything that can go wrong while uploading. Device-level failures are not retried, after a
/// failed `execute()` the uploader is faulted and must be recreated.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The device rejected creation of a queue, command pool, command buffer or fence
    #[error("failed to create {what}: {source}")]
    ResourceCreation {
        what: &'static str,
        #[source]
        source: HoistError,
    },

    /// A staging buffer could not be created or written
    #[error("failed to allocate a {size} byte staging buffer: {source}")]
    Allocation {
        size: u64,
        #[source]
        source: HoistError,
    },

    /// A command could not be recorded into one of the uploader's command buffers
    #[error("failed to record upload commands: {0}")]
    Recording(#[source] HoistError),

    /// A queue rejected a submit, signal or wait, or the completion wait failed
    #[error("{operation} failed: {source}")]
    Submission {
        operation: &'static str,
        #[source]
        source: HoistError,
    },

    #[error("invalid upload request: {0}")]
    InvalidRequest(String),

    /// The batch was already executed. Call `begin_batch()` before recording more uploads.
    #[error("the upload batch is closed, begin_batch() must be called before recording")]
    BatchClosed,

    /// An earlier device failure left the uploader unusable
    #[error("the uploader is faulted by an earlier device failure")]
    Faulted,

    #[error("invalid uploader config: {0}")]
    Config(String),

    #[error("failed to read uploader config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[cfg(feature = "serde-support")]
    #[error("failed to parse uploader config: {0}")]
    ConfigParse(#[from] ron::Error),
}

impl UploadError {
    pub(super) fn submission(operation: &'static str) -> impl FnOnce(HoistError) -> UploadError {
        move |source| UploadError::Submission { operation, source }
    }

    pub(super) fn resource_creation(what: &'static str) -> impl FnOnce(HoistError) -> UploadError {
        move |source| UploadError::ResourceCreation { what, source }
    }
}
