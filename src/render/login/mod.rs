//! Renderers for the login node group

pub mod container;

pub use container::{render_container_sshd, render_login_container};
