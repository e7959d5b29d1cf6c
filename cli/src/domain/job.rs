//! Job request handed to the driver by the bundle runtime.
//!
//! Pure parsing only. Reading stdin happens in the command layer.

use anyhow::Result;
use serde::Deserialize;

use crate::domain::error::JobError;

/// One driver invocation, parsed once from stdin and never persisted.
///
/// Extra fields sent by newer runtimes (`environment`, `files`, `outputs`)
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    /// Becomes the VM name and `CNAB_INSTALLATION_NAME`.
    pub installation_name: String,
    /// `<resource-group>/<image>`.
    pub image: String,
    /// Bundle action, e.g. `install`.
    pub action: String,
    /// Bundle parameters. Not forwarded to the VM yet.
    pub parameters: serde_json::Value,
    /// Not forwarded to the VM yet.
    pub revision: String,
}

impl JobRequest {
    /// Parse a job description.
    ///
    /// All five fields are required; `parameters` may be any JSON value,
    /// including `null`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Malformed`] on invalid JSON or a missing field.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| JobError::Malformed(e).into())
    }

    /// Split `image` into resource group and image name.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidImage`] if the reference has fewer than two
    /// non-empty segments.
    pub fn image_ref(&self) -> Result<ImageRef> {
        ImageRef::parse(&self.image)
    }
}

/// An image reference of the form `<resource-group>/<image>[/...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub resource_group: String,
    pub image: String,
}

impl ImageRef {
    /// Parse a reference. Only the first two `/`-separated segments are used;
    /// anything after the second `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidImage`] if either of the first two segments
    /// is missing or empty.
    pub fn parse(reference: &str) -> Result<Self> {
        let mut segments = reference.splitn(3, '/');
        match (segments.next(), segments.next()) {
            (Some(group), Some(image)) if !group.is_empty() && !image.is_empty() => Ok(Self {
                resource_group: group.to_string(),
                image: image.to_string(),
            }),
            _ => Err(JobError::InvalidImage(reference.to_string()).into()),
        }
    }
}
