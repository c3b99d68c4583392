use std::path::PathBuf;

use log::debug;

use crate::error_handling::types::PermissionError;

/// Gate checked before a live session is requested from the server.
pub trait CameraAccess: Send + Sync {
    fn request_access(&self) -> Result<(), PermissionError>;
}

/// Grants access when the configured capture device exists, or unconditionally when none is
/// configured (the server owns the camera in that setup).
#[derive(Debug, Clone, Default)]
pub struct DeviceCamera {
    device: Option<PathBuf>,
}

impl DeviceCamera {
    pub fn new(device: Option<PathBuf>) -> Self {
        Self { device }
    }
}

impl CameraAccess for DeviceCamera {
    fn request_access(&self) -> Result<(), PermissionError> {
        match &self.device {
            Some(path) if path.exists() => {
                debug!("Camera device {} available", path.display());
                Ok(())
            }
            Some(path) => Err(PermissionError::DeviceUnavailable(
                path.display().to_string(),
            )),
            None => Ok(()),
        }
    }
}
