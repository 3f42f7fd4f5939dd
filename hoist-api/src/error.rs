use std::sync::Arc;

pub type HoistResult<T> = Result<T, HoistError>;

/// Generic error that contains all the different kinds of errors that may occur when using the API
#[derive(Debug, Clone)]
pub enum HoistError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    /// The device could not satisfy an allocation
    OutOfMemory {
        requested: u64,
        available: u64,
    },
    /// A queue stopped accepting work
    DeviceLost,
    #[cfg(feature = "hoist-dx12")]
    WindowsApiError(windows::core::Error),
    #[cfg(feature = "hoist-dx12")]
    GpuAllocatorError(Arc<gpu_allocator::AllocationError>),
}

impl std::error::Error for HoistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            HoistError::StringError(_) => None,
            HoistError::IoError(ref e) => Some(&**e),
            HoistError::OutOfMemory { .. } => None,
            HoistError::DeviceLost => None,
            #[cfg(feature = "hoist-dx12")]
            HoistError::WindowsApiError(ref e) => Some(e),
            #[cfg(feature = "hoist-dx12")]
            HoistError::GpuAllocatorError(ref e) => Some(&**e),
        }
    }
}

impl core::fmt::Display for HoistError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            HoistError::StringError(ref e) => e.fmt(fmt),
            HoistError::IoError(ref e) => e.fmt(fmt),
            HoistError::OutOfMemory {
                requested,
                available,
            } => write!(
                fmt,
                "Out of device memory: requested {} bytes, {} bytes available",
                requested, available
            ),
            HoistError::DeviceLost => write!(fmt, "Device lost"),
            #[cfg(feature = "hoist-dx12")]
            HoistError::WindowsApiError(ref e) => e.fmt(fmt),
            #[cfg(feature = "hoist-dx12")]
            HoistError::GpuAllocatorError(ref e) => e.fmt(fmt),
        }
    }
}

impl From<&str> for HoistError {
    fn from(str: &str) -> Self {
        HoistError::StringError(str.to_string())
    }
}

impl From<String> for HoistError {
    fn from(string: String) -> Self {
        HoistError::StringError(string)
    }
}

impl From<std::io::Error> for HoistError {
    fn from(error: std::io::Error) -> Self {
        HoistError::IoError(Arc::new(error))
    }
}

#[cfg(feature = "hoist-dx12")]
impl From<windows::core::Error> for HoistError {
    fn from(error: windows::core::Error) -> Self {
        HoistError::WindowsApiError(error)
    }
}

#[cfg(feature = "hoist-dx12")]
impl From<gpu_allocator::AllocationError> for HoistError {
    fn from(error: gpu_allocator::AllocationError) -> Self {
        HoistError::GpuAllocatorError(Arc::new(error))
    }
}
