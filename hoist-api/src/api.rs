#[cfg(feature = "hoist-dx12")]
use crate::dx12::{HoistApiDefDx12, HoistApiDx12};
use crate::sim::{HoistApiDefSim, HoistApiSim};
use crate::{HoistDeviceContext, HoistResult};

/// Primary entry point to using the API. Use the `new_*` functions to initialize the desired
/// backend.
///
/// **This API object must persist for the lifetime of all objects created through it.** This
/// is verified at runtime when the API object is destroyed or dropped.
pub enum HoistApi {
    Sim(HoistApiSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistApiDx12),
}

impl HoistApi {
    /// Initialize a device using the software backend. Always available.
    pub fn new_sim(api_def: &HoistApiDefSim) -> HoistResult<Self> {
        Ok(HoistApi::Sim(HoistApiSim::new(api_def)?))
    }

    /// Initialize a device using Direct3D 12
    ///
    /// # Safety
    ///
    /// GPU programming is fundamentally unsafe, so all APIs that interact with the GPU should
    /// be considered unsafe. However, hoist APIs are only gated by unsafe if they can cause
    /// undefined behavior on the CPU for reasons other than interacting with the GPU.
    #[cfg(feature = "hoist-dx12")]
    pub unsafe fn new_dx12(api_def: &HoistApiDefDx12) -> HoistResult<Self> {
        Ok(HoistApi::Dx12(HoistApiDx12::new(api_def)?))
    }

    /// Create a cloneable handle to the device. Most of the time you will use this to create
    /// resources.
    pub fn device_context(&self) -> HoistDeviceContext {
        match self {
            HoistApi::Sim(inner) => HoistDeviceContext::Sim(inner.device_context().clone()),
            #[cfg(feature = "hoist-dx12")]
            HoistApi::Dx12(inner) => HoistDeviceContext::Dx12(inner.device_context().clone()),
        }
    }

    /// Destroys the graphics API instance. Any `HoistDeviceContext` created from this API must
    /// be dropped before calling this.
    ///
    /// This is not usually necessary to call, it's called on drop. But if you want to see the
    /// error if one occurs, you can call it explicitly.
    pub fn destroy(&mut self) -> HoistResult<()> {
        match self {
            HoistApi::Sim(inner) => inner.destroy(),
            #[cfg(feature = "hoist-dx12")]
            HoistApi::Dx12(inner) => inner.destroy(),
        }
    }

    pub fn sim_api(&self) -> Option<&HoistApiSim> {
        match self {
            HoistApi::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistApi::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_api(&self) -> Option<&HoistApiDx12> {
        match self {
            HoistApi::Sim(_) => None,
            HoistApi::Dx12(inner) => Some(inner),
        }
    }
}
