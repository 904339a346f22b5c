//! # Rendering
//!
//! Turns a [`SlurmCluster`](crate::values::SlurmCluster) into the artifacts
//! an external manifest builder embeds into pods:
//!
//! ```text
//! SlurmCluster ──► generators ──► ConfigFile ──► ConfigMap (slurm.conf, cgroup.conf, ...)
//!      │
//!      └──► container assembler (+ jail sub-mounts) ──► Container (sshd)
//! ```
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod common;
pub mod config_file;
pub mod k8s;
pub mod login;

pub use common::{render_config_map_slurm_configs, render_pod_annotations};
pub use config_file::{ConfigFile, MultilineConfig, PropertiesConfig};
pub use k8s::{ConfigMap, Container, ObjectMeta, VolumeMount};
pub use login::{render_container_sshd, render_login_container};
