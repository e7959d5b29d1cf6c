//! VM description and the cloud CLI arguments derived from it.
//!
//! Pure functions only: the `az` binary is invoked from `crate::infra::azure`.

use anyhow::Result;
use serde::Deserialize;

use crate::domain::error::VmError;
use crate::domain::job::JobRequest;

/// Parameters of the throwaway VM created for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub resource_group: String,
    /// VM name; always the job's installation name.
    pub name: String,
    pub image: String,
    pub admin_username: String,
}

impl VmSpec {
    /// Derive the VM for `job`.
    ///
    /// # Errors
    ///
    /// Returns an error if the job's image reference is invalid.
    pub fn for_job(job: &JobRequest, admin_username: &str) -> Result<Self> {
        let image = job.image_ref()?;
        Ok(Self {
            resource_group: image.resource_group,
            name: job.installation_name.clone(),
            image: image.image,
            admin_username: admin_username.to_string(),
        })
    }

    /// Arguments for `az vm create`.
    #[must_use]
    pub fn create_args(&self) -> Vec<&str> {
        vec![
            "vm",
            "create",
            "--resource-group",
            self.resource_group.as_str(),
            "--name",
            self.name.as_str(),
            "--image",
            self.image.as_str(),
            "--admin-username",
            self.admin_username.as_str(),
            "--generate-ssh-keys",
        ]
    }

    /// Arguments for `az vm delete`.
    #[must_use]
    pub fn delete_args(&self) -> Vec<&str> {
        vec![
            "vm",
            "delete",
            "--yes",
            "--name",
            self.name.as_str(),
            "--resource-group",
            self.resource_group.as_str(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOutput {
    public_ip_address: Option<String>,
    private_ip_address: Option<String>,
    id: Option<String>,
    location: Option<String>,
    power_state: Option<String>,
}

/// The parts of `az vm create` output the driver uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedVm {
    pub public_ip: String,
    pub private_ip: Option<String>,
    pub id: Option<String>,
    pub location: Option<String>,
    pub power_state: Option<String>,
}

impl CreatedVm {
    /// Parse the JSON object printed by a successful `az vm create`.
    ///
    /// # Errors
    ///
    /// Returns [`VmError::MalformedCreateOutput`] if stdout is not a JSON
    /// object, or [`VmError::MissingPublicIp`] if `publicIpAddress` is absent
    /// or empty.
    pub fn from_json(stdout: &[u8]) -> Result<Self> {
        let raw: CreateOutput =
            serde_json::from_slice(stdout).map_err(VmError::MalformedCreateOutput)?;
        let public_ip = raw
            .public_ip_address
            .filter(|ip| !ip.trim().is_empty())
            .ok_or(VmError::MissingPublicIp)?;
        Ok(Self {
            public_ip,
            private_ip: raw.private_ip_address,
            id: raw.id,
            location: raw.location,
            power_state: raw.power_state,
        })
    }
}
