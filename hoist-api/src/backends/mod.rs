pub mod sim;

#[cfg(feature = "hoist-dx12")]
pub mod dx12;
