//! Volume mounts shared by every Slurm container

use std::collections::HashSet;

use crate::consts;
use crate::error::{RenderError, RenderResult};
use crate::naming;
use crate::render::k8s::VolumeMount;
use crate::values::JailSubMount;

/// Mount of the slurm configs ConfigMap
pub fn render_volume_mount_slurm_configs() -> VolumeMount {
    VolumeMount::new(
        consts::VOLUME_SLURM_CONFIGS_NAME,
        consts::VOLUME_MOUNT_PATH_SLURM_CONFIGS,
    )
    .read_only()
}

/// Mount of the shared jail root filesystem
pub fn render_volume_mount_jail(jail_mount_path: &str) -> VolumeMount {
    VolumeMount::new(consts::VOLUME_JAIL_NAME, jail_mount_path)
}

/// Mount of the munge daemon socket directory
pub fn render_volume_mount_munge_socket() -> VolumeMount {
    VolumeMount::new(
        consts::VOLUME_MUNGE_SOCKET_NAME,
        consts::VOLUME_MOUNT_PATH_MUNGE_SOCKET,
    )
}

/// Mount of the PAM security limits policy
pub fn render_volume_mount_security_limits() -> VolumeMount {
    VolumeMount::new(
        consts::VOLUME_SECURITY_LIMITS_NAME,
        consts::VOLUME_MOUNT_PATH_SECURITY_LIMITS,
    )
    .with_sub_path(consts::VOLUME_SUB_PATH_SECURITY_LIMITS)
    .read_only()
}

/// One mount per jail sub-mount, placed under the jail mount path, in the
/// order they were given. Sub-mount paths with `..` segments are rejected.
pub fn render_volume_mounts_for_jail_sub_mounts(
    jail_mount_path: &str,
    sub_mounts: &[JailSubMount],
) -> RenderResult<Vec<VolumeMount>> {
    sub_mounts
        .iter()
        .map(|sub_mount| {
            let path = naming::build_jail_sub_mount_path(jail_mount_path, &sub_mount.mount_path)
                .ok_or_else(|| RenderError::InvalidMountPath {
                    path: sub_mount.mount_path.clone(),
                })?;
            Ok(VolumeMount::new(&sub_mount.name, path))
        })
        .collect()
}

/// Reject mount lists where two entries target the same container path.
///
/// Paths are compared after lexical normalization, so `/mnt/jail/./home`
/// and `/mnt/jail//home/` collide. Paths with `..` segments are rejected.
pub fn ensure_unique_mount_paths(mounts: &[VolumeMount]) -> RenderResult<()> {
    let mut seen = HashSet::with_capacity(mounts.len());
    for mount in mounts {
        let path = naming::normalize_mount_path(&mount.mount_path).ok_or_else(|| {
            RenderError::InvalidMountPath {
                path: mount.mount_path.clone(),
            }
        })?;
        if !seen.insert(path) {
            return Err(RenderError::DuplicateMountPath {
                path: mount.mount_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_mount(name: &str, path: &str) -> JailSubMount {
        JailSubMount {
            name: name.to_string(),
            mount_path: path.to_string(),
        }
    }

    #[test]
    fn test_jail_sub_mounts_keep_order() {
        let mounts = render_volume_mounts_for_jail_sub_mounts(
            "/mnt/jail",
            &[sub_mount("home", "/home"), sub_mount("data", "/data")],
        )
        .unwrap();
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].name, "home");
        assert_eq!(mounts[0].mount_path, "/mnt/jail/home");
        assert_eq!(mounts[1].mount_path, "/mnt/jail/data");
    }

    #[test]
    fn test_unique_mount_paths() {
        let mounts = vec![
            render_volume_mount_slurm_configs(),
            render_volume_mount_jail("/mnt/jail"),
            render_volume_mount_munge_socket(),
            render_volume_mount_security_limits(),
        ];
        assert!(ensure_unique_mount_paths(&mounts).is_ok());
    }

    #[test]
    fn test_duplicate_mount_paths() {
        let mounts = vec![
            render_volume_mount_jail("/mnt/jail"),
            VolumeMount::new("other", "/mnt/jail/"),
        ];
        assert_eq!(
            ensure_unique_mount_paths(&mounts),
            Err(RenderError::DuplicateMountPath {
                path: "/mnt/jail/".to_string()
            })
        );
    }

    #[test]
    fn test_jail_sub_mount_with_parent_dir_is_rejected() {
        let result = render_volume_mounts_for_jail_sub_mounts(
            "/mnt/jail",
            &[sub_mount("munge", "../../run/munge")],
        );
        assert_eq!(
            result,
            Err(RenderError::InvalidMountPath {
                path: "../../run/munge".to_string()
            })
        );
    }

    #[test]
    fn test_equivalent_paths_collide() {
        let mounts = vec![
            VolumeMount::new("a", "/mnt/jail/home"),
            VolumeMount::new("b", "/mnt//jail/./home/"),
        ];
        assert_eq!(
            ensure_unique_mount_paths(&mounts),
            Err(RenderError::DuplicateMountPath {
                path: "/mnt//jail/./home/".to_string()
            })
        );
    }

    #[test]
    fn test_parent_dir_in_mount_list_is_rejected() {
        let mounts = vec![
            render_volume_mount_munge_socket(),
            VolumeMount::new("escape", "/mnt/jail/../../run/munge"),
        ];
        assert!(matches!(
            ensure_unique_mount_paths(&mounts),
            Err(RenderError::InvalidMountPath { .. })
        ));
    }
}
