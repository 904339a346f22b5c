//! Named defaults for everything the renderers emit
//!
//! Every fixed value that ends up in a rendered file or container spec lives
//! here, so the output of a render pass can be audited in one place.

// ============================================================================
// Component types
// ============================================================================

/// Component types of a Slurm cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    Controller,
    Worker,
    Login,
}

impl ComponentType {
    /// Name used in object names, labels and service hostnames
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Controller => "controller",
            ComponentType::Worker => "worker",
            ComponentType::Login => "login",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Daemons and plugins
// ============================================================================

pub const MUNGE: &str = "munge";
pub const SLURMCTLD_NAME: &str = "slurmctld";
pub const SLURMD_NAME: &str = "slurmd";
pub const SSHD_NAME: &str = "sshd";

pub const DEFAULT_SLURMCTLD_PORT: u16 = 6817;
pub const DEFAULT_SLURMD_PORT: u16 = 6818;
pub const DEFAULT_SSHD_PORT: u16 = 22;

pub const SLURM_PLUGIN_DIR: &str = "/usr/lib/x86_64-linux-gnu/slurm";
pub const SLURM_USER: &str = "root";
pub const SPOOL_DIR_ROOT: &str = "/var/spool";
pub const PID_FILE_DIR: &str = "/var/run";

pub const HEALTH_CHECK_PROGRAM: &str = "/usr/bin/gpu_healthcheck.sh";
pub const HEALTH_CHECK_INTERVAL_SECS: u32 = 30;

/// Jobs kept in controller memory
pub const MAX_JOB_COUNT: u32 = 1000;
/// Seconds a finished job stays in controller memory
pub const MIN_JOB_AGE_SECS: u32 = 86400;
/// Upper bound for dynamically registered nodes
pub const MAX_NODE_COUNT: u32 = 512;

pub const SLURMCTLD_DEBUG_LEVEL: &str = "debug3";
pub const SLURMD_DEBUG_LEVEL: &str = "debug3";

pub const PYXIS_RUNTIME_PATH: &str = "/run/pyxis";

// ============================================================================
// Cgroups
// ============================================================================

pub const CGROUP_V1: &str = "v1";
pub const CGROUP_V2: &str = "v2";
pub const CGROUP_MOUNTPOINT: &str = "/sys/fs/cgroup";

// ============================================================================
// ConfigMap keys
// ============================================================================

pub const CONFIG_MAP_KEY_SLURM_CONFIG: &str = "slurm.conf";
pub const CONFIG_MAP_KEY_CGROUP_CONFIG: &str = "cgroup.conf";
pub const CONFIG_MAP_KEY_SPANK_CONFIG: &str = "plugstack.conf";
pub const CONFIG_MAP_KEY_GRES_CONFIG: &str = "gres.conf";

/// All keys of the slurm configs ConfigMap, in render order
pub const CONFIG_MAP_SLURM_CONFIGS_KEYS: [&str; 4] = [
    CONFIG_MAP_KEY_SLURM_CONFIG,
    CONFIG_MAP_KEY_CGROUP_CONFIG,
    CONFIG_MAP_KEY_SPANK_CONFIG,
    CONFIG_MAP_KEY_GRES_CONFIG,
];

/// Pod template annotation carrying the SHA-256 of the rendered ConfigMap data
pub const ANNOTATION_CONFIG_CHECKSUM: &str = "checksum/config";

// ============================================================================
// Volumes and mounts
// ============================================================================

pub const VOLUME_SLURM_CONFIGS_NAME: &str = "slurm-configs";
pub const VOLUME_MOUNT_PATH_SLURM_CONFIGS: &str = "/mnt/slurm-configs";

pub const VOLUME_JAIL_NAME: &str = "jail";
pub const VOLUME_MOUNT_PATH_JAIL: &str = "/mnt/jail";

pub const VOLUME_MUNGE_SOCKET_NAME: &str = "munge-socket";
pub const VOLUME_MOUNT_PATH_MUNGE_SOCKET: &str = "/run/munge";

pub const VOLUME_SECURITY_LIMITS_NAME: &str = "security-limits";
pub const VOLUME_MOUNT_PATH_SECURITY_LIMITS: &str = "/etc/security/limits.conf";
pub const VOLUME_SUB_PATH_SECURITY_LIMITS: &str = "limits.conf";

pub const VOLUME_SSHD_KEYS_NAME: &str = "sshd-keys";
pub const VOLUME_MOUNT_PATH_SSHD_KEYS: &str = "/etc/ssh/ssh_host_keys";

pub const VOLUME_SSH_CONFIGS_NAME: &str = "ssh-configs";
pub const VOLUME_MOUNT_PATH_SSH_CONFIGS: &str = "/etc/ssh/sshd_config";
pub const VOLUME_SUB_PATH_SSH_CONFIGS: &str = "sshd_config";

pub const VOLUME_SSH_ROOT_KEYS_NAME: &str = "ssh-root-keys";
pub const VOLUME_MOUNT_PATH_SSH_ROOT_KEYS: &str = "/root/.ssh/authorized_keys";
pub const VOLUME_SUB_PATH_SSH_ROOT_KEYS: &str = "authorized_keys";

// ============================================================================
// Containers
// ============================================================================

pub const CONTAINER_NAME_SSHD: &str = SSHD_NAME;
pub const CONTAINER_SECURITY_CONTEXT_CAPABILITY_SYS_ADMIN: &str = "SYS_ADMIN";

// ============================================================================
// Naming
// ============================================================================

pub const DEFAULT_NAMESPACE: &str = "default";
pub const CLUSTER_DOMAIN: &str = "svc.cluster.local";

pub const LABEL_NAME_KEY: &str = "app.kubernetes.io/name";
pub const LABEL_INSTANCE_KEY: &str = "app.kubernetes.io/instance";
pub const LABEL_COMPONENT_KEY: &str = "app.kubernetes.io/component";
pub const LABEL_PART_OF_KEY: &str = "app.kubernetes.io/part-of";
pub const LABEL_MANAGED_BY_KEY: &str = "app.kubernetes.io/managed-by";

pub const LABEL_NAME_VALUE: &str = "slurmcluster";
pub const LABEL_PART_OF_VALUE: &str = "slurm-operator";
pub const LABEL_MANAGED_BY_VALUE: &str = "slurm-operator";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_names() {
        assert_eq!(ComponentType::Controller.as_str(), "controller");
        assert_eq!(ComponentType::Worker.to_string(), "worker");
        assert_eq!(ComponentType::Login.as_str(), "login");
    }

    #[test]
    fn test_config_map_keys_are_distinct() {
        let mut keys = CONFIG_MAP_SLURM_CONFIGS_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 4);
    }
}
