//! Cluster specification consumed by the renderers
//!
//! A [`SlurmCluster`] is loaded once (YAML or JSON) and then treated as an
//! immutable snapshot for the whole render pass.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts;
use crate::naming;

/// Errors for loading and validating a cluster specification
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse cluster spec: {0}")]
    Parse(String),

    #[error("Invalid cluster spec: {0}")]
    Invalid(String),
}

/// Resource quantities keyed by resource name (e.g. `cpu`, `memory`)
pub type ResourceList = BTreeMap<String, String>;

/// Cgroup version used on worker nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CgroupVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(rename = "v2")]
    V2,
}

impl CgroupVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            CgroupVersion::V1 => consts::CGROUP_V1,
            CgroupVersion::V2 => consts::CGROUP_V2,
        }
    }
}

/// A container of one of the cluster's node groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Name used for the container's port
    pub name: String,

    /// Image reference
    pub image: String,

    /// Port the daemon listens on
    pub port: u16,

    /// Requests and limits (always rendered symmetric)
    #[serde(default)]
    pub resources: ResourceList,
}

/// Controller node group (slurmctld)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeController {
    #[serde(default = "default_controller_size")]
    pub size: u32,

    #[serde(default = "default_slurmctld_container")]
    pub container_slurmctld: Container,
}

impl Default for NodeController {
    fn default() -> Self {
        Self {
            size: default_controller_size(),
            container_slurmctld: default_slurmctld_container(),
        }
    }
}

/// Worker node group (slurmd)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWorker {
    #[serde(default)]
    pub size: u32,

    #[serde(default = "default_slurmd_container")]
    pub container_slurmd: Container,

    #[serde(default)]
    pub cgroup_version: CgroupVersion,
}

impl Default for NodeWorker {
    fn default() -> Self {
        Self {
            size: 0,
            container_slurmd: default_slurmd_container(),
            cgroup_version: CgroupVersion::default(),
        }
    }
}

/// A sub-directory of the jail backed by its own volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JailSubMount {
    /// Mount name, also used as the pod volume name
    pub name: String,

    /// Path relative to the jail root
    pub mount_path: String,
}

/// Login node group (sshd)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLogin {
    #[serde(default)]
    pub size: u32,

    #[serde(default = "default_sshd_container")]
    pub container_sshd: Container,

    #[serde(default)]
    pub jail_sub_mounts: Vec<JailSubMount>,
}

impl Default for NodeLogin {
    fn default() -> Self {
        Self {
            size: 0,
            container_sshd: default_sshd_container(),
            jail_sub_mounts: Vec::new(),
        }
    }
}

/// The complete cluster specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlurmCluster {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Where the jail volume is mounted in every container
    #[serde(default = "default_jail_mount_path")]
    pub jail_mount_path: String,

    #[serde(default)]
    pub node_controller: NodeController,

    #[serde(default)]
    pub node_worker: NodeWorker,

    #[serde(default)]
    pub node_login: NodeLogin,
}

fn default_namespace() -> String {
    consts::DEFAULT_NAMESPACE.to_string()
}

fn default_jail_mount_path() -> String {
    consts::VOLUME_MOUNT_PATH_JAIL.to_string()
}

fn default_controller_size() -> u32 {
    1
}

fn default_container(name: &str, port: u16) -> Container {
    Container {
        name: name.to_string(),
        image: String::new(),
        port,
        resources: ResourceList::new(),
    }
}

fn default_slurmctld_container() -> Container {
    default_container(consts::SLURMCTLD_NAME, consts::DEFAULT_SLURMCTLD_PORT)
}

fn default_slurmd_container() -> Container {
    default_container(consts::SLURMD_NAME, consts::DEFAULT_SLURMD_PORT)
}

fn default_sshd_container() -> Container {
    default_container(consts::SSHD_NAME, consts::DEFAULT_SSHD_PORT)
}

impl SlurmCluster {
    /// A cluster with all node groups at their defaults
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            jail_mount_path: default_jail_mount_path(),
            node_controller: NodeController::default(),
            node_worker: NodeWorker::default(),
            node_login: NodeLogin::default(),
        }
    }

    /// Check the parts of the spec that end up in object names and paths.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_dns_label("cluster name", &self.name)?;
        validate_dns_label("namespace", &self.namespace)?;

        if !self.jail_mount_path.starts_with('/')
            || naming::normalize_mount_path(&self.jail_mount_path).is_none()
        {
            return Err(SpecError::Invalid(format!(
                "jail mount path must be absolute without '..', got '{}'",
                self.jail_mount_path
            )));
        }

        for (group, container) in [
            ("controller", &self.node_controller.container_slurmctld),
            ("worker", &self.node_worker.container_slurmd),
            ("login", &self.node_login.container_sshd),
        ] {
            if container.port == 0 {
                return Err(SpecError::Invalid(format!(
                    "{group} container '{}' has port 0",
                    container.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for sub_mount in &self.node_login.jail_sub_mounts {
            validate_dns_label("jail sub-mount name", &sub_mount.name)?;
            if naming::normalize_mount_path(&sub_mount.mount_path).is_none() {
                return Err(SpecError::Invalid(format!(
                    "jail sub-mount '{}' path '{}' must not contain '..'",
                    sub_mount.name, sub_mount.mount_path
                )));
            }
            if !seen.insert(sub_mount.name.as_str()) {
                return Err(SpecError::Invalid(format!(
                    "duplicate jail sub-mount name '{}'",
                    sub_mount.name
                )));
            }
        }

        Ok(())
    }
}

fn dns_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").expect("static regex is valid")
    })
}

fn validate_dns_label(what: &str, value: &str) -> Result<(), SpecError> {
    if dns_label_regex().is_match(value) {
        Ok(())
    } else {
        Err(SpecError::Invalid(format!(
            "{what} '{value}' is not a valid DNS-1123 label"
        )))
    }
}

// ============================================================================
// SBIO: Pure parsing functions (no I/O)
// ============================================================================

/// Parse a cluster spec from YAML. JSON is a subset of YAML, so this also
/// accepts JSON documents.
pub fn parse_cluster(content: &str) -> Result<SlurmCluster, SpecError> {
    serde_yaml::from_str(content).map_err(|e| SpecError::Parse(e.to_string()))
}

/// Parse a cluster spec from strict JSON.
pub fn parse_cluster_json(content: &str) -> Result<SlurmCluster, SpecError> {
    serde_json::from_str(content).map_err(|e| SpecError::Parse(e.to_string()))
}

// ============================================================================
// SBIO: I/O wrapper
// ============================================================================

/// Load, parse and validate a cluster spec file. Files ending in `.json`
/// are parsed as JSON, everything else as YAML.
pub fn load_cluster_file(path: &Path) -> Result<SlurmCluster, SpecError> {
    let content = std::fs::read_to_string(path)?;
    let cluster = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_cluster_json(&content)?,
        _ => parse_cluster(&content)?,
    };
    cluster.validate()?;
    debug!(
        cluster = %cluster.name,
        namespace = %cluster.namespace,
        "loaded cluster spec from {}",
        path.display()
    );
    Ok(cluster)
}
