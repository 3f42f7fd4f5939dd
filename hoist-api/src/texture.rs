#[cfg(feature = "hoist-dx12")]
use crate::dx12::HoistTextureDx12;
use crate::sim::HoistTextureSim;
use crate::{HoistResourceId, HoistTextureDef};

/// A GPU-only image with one or more mips and array layers. Cloning produces another handle to
/// the same resource.
#[derive(Debug, Clone)]
pub enum HoistTexture {
    Sim(HoistTextureSim),
    #[cfg(feature = "hoist-dx12")]
    Dx12(HoistTextureDx12),
}

impl HoistTexture {
    pub fn texture_def(&self) -> &HoistTextureDef {
        match self {
            HoistTexture::Sim(inner) => inner.texture_def(),
            #[cfg(feature = "hoist-dx12")]
            HoistTexture::Dx12(inner) => inner.texture_def(),
        }
    }

    pub fn resource_id(&self) -> HoistResourceId {
        match self {
            HoistTexture::Sim(inner) => inner.resource_id(),
            #[cfg(feature = "hoist-dx12")]
            HoistTexture::Dx12(inner) => inner.resource_id(),
        }
    }

    pub fn sim_texture(&self) -> Option<&HoistTextureSim> {
        match self {
            HoistTexture::Sim(inner) => Some(inner),
            #[cfg(feature = "hoist-dx12")]
            HoistTexture::Dx12(_) => None,
        }
    }

    #[cfg(feature = "hoist-dx12")]
    pub fn dx12_texture(&self) -> Option<&HoistTextureDx12> {
        match self {
            HoistTexture::Sim(_) => None,
            HoistTexture::Dx12(inner) => Some(inner),
        }
    }
}
