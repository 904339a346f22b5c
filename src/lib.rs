//! # slurmrender
//!
//! Rendering core of a Slurm cluster operator. Given a declarative
//! [`SlurmCluster`](values::SlurmCluster) it produces:
//!
//! - the slurm configs [`ConfigMap`](render::ConfigMap) (`slurm.conf`,
//!   `cgroup.conf`, `plugstack.conf`, `gres.conf`)
//! - the login node's sshd [`Container`](render::Container)
//!
//! Rendering is a pure function of the spec: the same spec always yields
//! byte-identical output.

pub mod cli;
pub mod consts;
pub mod error;
pub mod naming;
pub mod render;
pub mod values;

pub use error::{RenderError, RenderResult};
pub use values::{load_cluster_file, SlurmCluster, SpecError};
