#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use super::{UploadError, UploadResult};
use hoist_api::HoistResourceState;

/// Used to create a `ResourceUploader`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize), serde(default))]
pub struct ResourceUploaderDef {
    /// Upper bound on the staging memory a single batch may allocate. None is unlimited
    pub max_staging_bytes_per_batch: Option<u64>,

    /// State every uploaded resource is transitioned to on the direct queue
    pub final_state: HoistResourceState,
}

impl Default for ResourceUploaderDef {
    fn default() -> Self {
        ResourceUploaderDef {
            max_staging_bytes_per_batch: None,
            final_state: HoistResourceState::GENERIC_READ,
        }
    }
}

impl ResourceUploaderDef {
    pub fn verify(&self) -> UploadResult<()> {
        if self.final_state == HoistResourceState::UNDEFINED
            || self.final_state.contains(HoistResourceState::COPY_DST)
        {
            return Err(UploadError::Config(format!(
                "final_state {:?} is not a readable state",
                self.final_state
            )));
        }

        if self.max_staging_bytes_per_batch == Some(0) {
            return Err(UploadError::Config(
                "max_staging_bytes_per_batch must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(feature = "serde-support")]
    pub fn from_ron_str(ron_str: &str) -> UploadResult<Self> {
        let uploader_def: ResourceUploaderDef = ron::de::from_str(ron_str)?;
        uploader_def.verify()?;
        Ok(uploader_def)
    }

    #[cfg(feature = "serde-support")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> UploadResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading uploader config from {}", path.display());
        let ron_str = std::fs::read_to_string(path)?;
        Self::from_ron_str(&ron_str)
    }

    #[cfg(feature = "serde-support")]
    pub fn to_ron_string(&self) -> UploadResult<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_generic_read() {
        let uploader_def = ResourceUploaderDef::default();
        assert_eq!(uploader_def.final_state, HoistResourceState::GENERIC_READ);
        assert!(uploader_def.verify().is_ok());
    }

    #[test]
    fn copy_dst_is_not_a_final_state() {
        let uploader_def = ResourceUploaderDef {
            final_state: HoistResourceState::COPY_DST,
            ..Default::default()
        };
        assert!(matches!(
            uploader_def.verify(),
            Err(UploadError::Config(_))
        ));
    }

    #[cfg(feature = "serde-support")]
    #[test]
    fn load_from_ron() {
        let uploader_def =
            ResourceUploaderDef::from_ron_str("(max_staging_bytes_per_batch: Some(4096))").unwrap();
        assert_eq!(uploader_def.max_staging_bytes_per_batch, Some(4096));
        assert_eq!(uploader_def.final_state, HoistResourceState::GENERIC_READ);

        let written = uploader_def.to_ron_string().unwrap();
        assert_eq!(
            ResourceUploaderDef::from_ron_str(&written).unwrap(),
            uploader_def
        );

        assert!(matches!(
            ResourceUploaderDef::from_ron_str("(max_staging_bytes_per_batch: \"lots\")"),
            Err(UploadError::ConfigParse(_))
        ));
        assert!(matches!(
            ResourceUploaderDef::from_ron_str("(max_staging_bytes_per_batch: Some(0))"),
            Err(UploadError::Config(_))
        ));
    }

    #[cfg(feature = "serde-support")]
    #[test]
    fn missing_config_file() {
        assert!(matches!(
            ResourceUploaderDef::load("does/not/exist.ron"),
            Err(UploadError::ConfigIo(_))
        ));
    }
}
