use windows::Win32::Graphics::Direct3D as d3d;
use windows::Win32::Graphics::Direct3D12 as d3d12;
use windows::Win32::Graphics::Dxgi as dxgi;

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

mod internal;
