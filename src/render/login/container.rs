use tracing::debug;

use crate::consts;
use crate::error::RenderResult;
use crate::render::common::{
    ensure_unique_mount_paths, render_volume_mount_jail, render_volume_mount_munge_socket,
    render_volume_mount_security_limits, render_volume_mount_slurm_configs,
    render_volume_mounts_for_jail_sub_mounts,
};
use crate::render::k8s::{
    Capabilities, Container, ContainerPort, Probe, Protocol, PullPolicy, ResourceRequirements,
    SecurityContext, VolumeMount,
};
use crate::values::{self, JailSubMount, SlurmCluster};

/// Render the sshd container of the cluster's login nodes
pub fn render_login_container(cluster: &SlurmCluster) -> RenderResult<Container> {
    render_container_sshd(
        &cluster.node_login.container_sshd,
        &cluster.jail_mount_path,
        &cluster.node_login.jail_sub_mounts,
    )
}

/// Render the sshd [`Container`].
///
/// Mounts come in a fixed order: slurm configs, jail, munge socket,
/// security limits, sshd host keys, ssh configs, ssh root keys, then one
/// mount per jail sub-mount. Two mounts on the same path (after lexical
/// normalization) are rejected, and so are paths with `..` segments.
pub fn render_container_sshd(
    container: &values::Container,
    jail_mount_path: &str,
    jail_sub_mounts: &[JailSubMount],
) -> RenderResult<Container> {
    let mut volume_mounts = vec![
        render_volume_mount_slurm_configs(),
        render_volume_mount_jail(jail_mount_path),
        render_volume_mount_munge_socket(),
        render_volume_mount_security_limits(),
        render_volume_mount_sshd_keys(),
        render_volume_mount_ssh_configs(),
        render_volume_mount_ssh_root_keys(),
    ];
    volume_mounts.extend(render_volume_mounts_for_jail_sub_mounts(
        jail_mount_path,
        jail_sub_mounts,
    )?);
    ensure_unique_mount_paths(&volume_mounts)?;

    debug!(
        image = %container.image,
        mounts = volume_mounts.len(),
        "rendered sshd container"
    );

    Ok(Container {
        name: consts::CONTAINER_NAME_SSHD.to_string(),
        image: container.image.clone(),
        // TODO: pin images by digest and switch to IfNotPresent
        image_pull_policy: PullPolicy::Always,
        ports: vec![ContainerPort {
            name: container.name.clone(),
            container_port: container.port,
            protocol: Protocol::Tcp,
        }],
        volume_mounts,
        readiness_probe: Some(Probe::tcp(container.port)),
        security_context: Some(SecurityContext {
            privileged: Some(true),
            capabilities: Some(Capabilities {
                add: vec![consts::CONTAINER_SECURITY_CONTEXT_CAPABILITY_SYS_ADMIN.to_string()],
                drop: Vec::new(),
            }),
        }),
        resources: ResourceRequirements::symmetric(&container.resources),
    })
}

fn render_volume_mount_sshd_keys() -> VolumeMount {
    VolumeMount::new(consts::VOLUME_SSHD_KEYS_NAME, consts::VOLUME_MOUNT_PATH_SSHD_KEYS)
        .read_only()
}

fn render_volume_mount_ssh_configs() -> VolumeMount {
    VolumeMount::new(
        consts::VOLUME_SSH_CONFIGS_NAME,
        consts::VOLUME_MOUNT_PATH_SSH_CONFIGS,
    )
    .with_sub_path(consts::VOLUME_SUB_PATH_SSH_CONFIGS)
    .read_only()
}

fn render_volume_mount_ssh_root_keys() -> VolumeMount {
    VolumeMount::new(
        consts::VOLUME_SSH_ROOT_KEYS_NAME,
        consts::VOLUME_MOUNT_PATH_SSH_ROOT_KEYS,
    )
    .with_sub_path(consts::VOLUME_SUB_PATH_SSH_ROOT_KEYS)
    .read_only()
}
