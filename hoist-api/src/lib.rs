//! Hardware abstraction for the hoist upload engine.
//!
//! The API is shaped after D3D12: a device context creates queues, command pools, command
//! buffers, timeline fences, buffers and textures. Every object is an enum over the compiled
//! backends:
//!
//!  * `sim` - A software device. Each queue is a worker thread, fences are CPU timelines and
//!    copies really move bytes. It is always available and is what the tests run against.
//!  * `dx12` - Direct3D 12 through the `windows` crate. Enabled with the `hoist-dx12` feature.
//!
//! Use [`HoistApi::new_sim`] or [`HoistApi::new_dx12`] to create the root object and
//! [`HoistApi::device_context`] to get a cloneable handle to the device.

pub use api::*;
pub use buffer::*;
pub use command_buffer::*;
pub use command_pool::*;
pub use device_context::*;
pub use error::*;
pub use fence::*;
pub use queue::*;
pub use texture::*;
pub use types::*;

pub use backends::sim;
#[cfg(feature = "hoist-dx12")]
pub use backends::dx12;

mod backends;
mod internal_shared;
mod types;

mod api;
mod buffer;
mod command_buffer;
mod command_pool;
mod device_context;
mod error;
mod fence;
mod queue;
mod texture;
