//! Renderers shared across node groups

pub mod configmap;
pub mod labels;
pub mod volume;

pub use configmap::{render_config_map_slurm_configs, render_pod_annotations};
pub use labels::render_labels;
pub use volume::{
    ensure_unique_mount_paths, render_volume_mount_jail, render_volume_mount_munge_socket,
    render_volume_mount_security_limits, render_volume_mount_slurm_configs,
    render_volume_mounts_for_jail_sub_mounts,
};
