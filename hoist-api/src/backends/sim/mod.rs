//! A software device. Queues are worker threads that execute command lists in submission order,
//! fences are CPU-side timelines, and copies move real bytes between host allocations. Resource
//! states are tracked and misuse is reported through the trace instead of being undefined
//! behavior.

mod api;
pub use api::*;

mod device_context;
pub use device_context::*;

mod buffer;
pub use buffer::*;

mod texture;
pub use texture::*;

mod command_buffer;
pub use command_buffer::*;

mod command_pool;
pub use command_pool::*;

mod fence;
pub use fence::*;

mod queue;
pub use queue::*;

mod trace;
pub use trace::*;

mod memory;
