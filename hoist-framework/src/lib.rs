//! The hoist upload engine. Copies CPU data into GPU resources on a dedicated copy queue and
//! makes the results readable on the direct queue, with the two queues ordered by a shared
//! timeline fence.
//!
//! See [`upload::ResourceUploader`] for the entry point.

pub mod upload;

pub use hoist_api::HoistResult;
