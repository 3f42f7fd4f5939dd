mod error;
pub use error::UploadError;
pub use error::UploadResult;

mod config;
pub use config::ResourceUploaderDef;

mod fence;
pub use fence::BatchFenceValues;
pub use fence::CrossQueueFence;

mod layout;
pub use layout::SubresourceData;

mod queue_pair;
pub use queue_pair::QueueContext;
pub use queue_pair::QueuePair;

mod staging;
pub use staging::StagingPool;

mod transitions;
pub use transitions::PendingTransition;
pub use transitions::TransitionBatcher;
pub use transitions::TransitionTarget;

mod uploader;
pub use uploader::ResourceUploader;
pub use uploader::UploadBatchResult;
pub use uploader::UploadBatchState;
