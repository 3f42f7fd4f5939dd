pub use hoist_api as api;

#[cfg(feature = "framework")]
pub use hoist_framework as framework;

#[cfg(feature = "framework")]
pub use hoist_framework::upload;
