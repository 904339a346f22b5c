//! Canonical names for rendered objects, hosts and paths

use std::path::{Component, Path};

use crate::consts::{self, ComponentType};

/// Name of the ConfigMap holding the slurm `.conf` files
pub fn build_config_map_slurm_configs_name(cluster_name: &str) -> String {
    format!("{cluster_name}-{}", consts::VOLUME_SLURM_CONFIGS_NAME)
}

/// Name of the headless service fronting a component's pods
pub fn build_service_name(component: ComponentType) -> String {
    component.as_str().to_string()
}

/// Short hostname and FQDN of the `index`th pod of a component.
///
/// Example: `("controller-0", "controller-0.controller.slurm-poc.svc.cluster.local")`
pub fn build_service_host_fqdn(
    component: ComponentType,
    namespace: &str,
    index: u32,
) -> (String, String) {
    let host_name = format!("{}-{index}", component.as_str());
    let fqdn = format!(
        "{host_name}.{}.{namespace}.{}",
        build_service_name(component),
        consts::CLUSTER_DOMAIN
    );
    (host_name, fqdn)
}

/// Spool directory of a slurm daemon
pub fn build_volume_mount_spool_path(daemon: &str) -> String {
    format!("{}/{daemon}", consts::SPOOL_DIR_ROOT)
}

/// PID file of a slurm daemon
pub fn build_pid_file_path(daemon: &str) -> String {
    format!("{}/{daemon}.pid", consts::PID_FILE_DIR)
}

/// Lexically normalize a mount path: repeated separators, `.` segments and
/// trailing separators are dropped.
///
/// Returns `None` if the path has a `..` segment.
pub fn normalize_mount_path(path: &str) -> Option<String> {
    let mut absolute = false;
    let mut segments = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::RootDir => absolute = true,
            Component::CurDir => {}
            Component::Normal(segment) => segments.push(segment.to_string_lossy()),
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    let joined = segments.join("/");
    Some(if absolute { format!("/{joined}") } else { joined })
}

/// Path of a jail sub-mount inside the container, or `None` if either part
/// has a `..` segment.
pub fn build_jail_sub_mount_path(jail_mount_path: &str, sub_path: &str) -> Option<String> {
    let jail = normalize_mount_path(jail_mount_path)?;
    let sub = normalize_mount_path(sub_path)?;
    let sub = sub.trim_start_matches('/');
    Some(match (jail.as_str(), sub) {
        (jail, "") => jail.to_string(),
        ("/", sub) => format!("/{sub}"),
        (jail, sub) => format!("{jail}/{sub}"),
    })
}
