//! Kubernetes-shaped resource types produced by the renderers
//!
//! Only the fields the renderers set are modelled. They serialize with the
//! Kubernetes field names so the output can be embedded into a manifest
//! as-is. All maps are ordered so serialized output is stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A ConfigMap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Kind is always "ConfigMap"
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl ConfigMap {
    pub fn new(metadata: ObjectMeta, data: BTreeMap<String, String>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            metadata,
            data,
        }
    }
}

/// Image pull policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullPolicy {
    Always,
}

/// Port protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
}

/// A port exposed by a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    pub name: String,

    #[serde(rename = "containerPort")]
    pub container_port: u16,

    pub protocol: Protocol,
}

/// A volume mounted into a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Name of the pod volume
    pub name: String,

    /// Path inside the container
    #[serde(rename = "mountPath")]
    pub mount_path: String,

    #[serde(rename = "subPath")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,

    #[serde(rename = "readOnly")]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl VolumeMount {
    pub fn new(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
            sub_path: None,
            read_only: false,
        }
    }

    pub fn with_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = Some(sub_path.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// TCP socket probe action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpSocketAction {
    pub port: u16,
}

/// A container probe. Only TCP socket probes are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    #[serde(rename = "tcpSocket")]
    pub tcp_socket: TcpSocketAction,
}

impl Probe {
    pub fn tcp(port: u16) -> Self {
        Self {
            tcp_socket: TcpSocketAction { port },
        }
    }
}

/// Linux capabilities to add or drop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

/// Container security context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

/// Resource requests and limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

impl ResourceRequirements {
    /// Requests equal to limits, leaving no burst headroom
    pub fn symmetric(resources: &BTreeMap<String, String>) -> Self {
        Self {
            limits: resources.clone(),
            requests: resources.clone(),
        }
    }
}

/// A container spec, ready to be embedded in a pod template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,

    pub image: String,

    #[serde(rename = "imagePullPolicy")]
    pub image_pull_policy: PullPolicy,

    #[serde(default)]
    pub ports: Vec<ContainerPort>,

    #[serde(rename = "volumeMounts")]
    #[serde(default)]
    pub volume_mounts: Vec<VolumeMount>,

    #[serde(rename = "readinessProbe")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,

    #[serde(rename = "securityContext")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    #[serde(default)]
    pub resources: ResourceRequirements,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_map_kind() {
        let cm = ConfigMap::new(ObjectMeta::default(), BTreeMap::new());
        assert_eq!(cm.kind, "ConfigMap");
        assert_eq!(cm.api_version, "v1");
    }

    #[test]
    fn test_volume_mount_serialization() {
        let mount = VolumeMount::new("ssh-configs", "/etc/ssh/sshd_config")
            .with_sub_path("sshd_config")
            .read_only();
        let json = serde_json::to_value(&mount).unwrap();
        assert_eq!(json["mountPath"], "/etc/ssh/sshd_config");
        assert_eq!(json["subPath"], "sshd_config");
        assert_eq!(json["readOnly"], true);

        let plain = serde_json::to_value(VolumeMount::new("jail", "/mnt/jail")).unwrap();
        assert!(plain.get("subPath").is_none());
        assert!(plain.get("readOnly").is_none());
    }

    #[test]
    fn test_protocol_serialization() {
        assert_eq!(serde_json::to_string(&Protocol::Tcp).unwrap(), "\"TCP\"");
        assert_eq!(
            serde_json::to_string(&PullPolicy::Always).unwrap(),
            "\"Always\""
        );
    }

    #[test]
    fn test_symmetric_resources() {
        let mut resources = BTreeMap::new();
        resources.insert("cpu".to_string(), "2".to_string());
        let req = ResourceRequirements::symmetric(&resources);
        assert_eq!(req.limits, req.requests);
    }
}
