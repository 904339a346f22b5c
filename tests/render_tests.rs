//! End-to-end rendering from a cluster spec file

use std::io::Write;

use slurmrender::cli::{format_render_output, render_cluster, OutputFormat};
use slurmrender::load_cluster_file;
use slurmrender::render::{render_config_map_slurm_configs, render_login_container};
use tempfile::Builder;

const CLUSTER_SPEC: &str = r#"
name: slurm1
namespace: slurm-poc
nodeController:
  size: 2
  containerSlurmctld:
    name: slurmctld
    image: cr.example/slurmctld:23.11
    port: 6817
nodeWorker:
  size: 4
  cgroupVersion: v2
  containerSlurmd:
    name: slurmd
    image: cr.example/slurmd:23.11
    port: 6818
nodeLogin:
  size: 1
  containerSshd:
    name: sshd
    image: cr.example/login:23.11
    port: 22
    resources:
      cpu: "1"
      memory: 1Gi
  jailSubMounts:
    - name: home
      mountPath: /home
"#;

fn write_spec(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_render_from_yaml_file() {
    let file = write_spec(CLUSTER_SPEC, ".yaml");
    let cluster = load_cluster_file(file.path()).unwrap();

    let cm = render_config_map_slurm_configs(&cluster);
    let slurm_conf = &cm.data["slurm.conf"];
    let lines: Vec<&str> = slurm_conf.lines().collect();
    assert_eq!(lines[0], "ClusterName=slurm1");
    assert_eq!(
        lines[2],
        "SlurmctldHost=controller-0(controller-0.controller.slurm-poc.svc.cluster.local)"
    );
    assert_eq!(
        lines[3],
        "SlurmctldHost=controller-1(controller-1.controller.slurm-poc.svc.cluster.local)"
    );
    assert!(cm.data["cgroup.conf"].contains("CgroupPlugin=cgroup/v2"));
    assert_eq!(
        cm.data["plugstack.conf"].lines().next(),
        Some("required chroot.so /mnt/jail")
    );

    let container = render_login_container(&cluster).unwrap();
    assert_eq!(container.volume_mounts.len(), 8);
    assert_eq!(container.volume_mounts[7].mount_path, "/mnt/jail/home");
}

#[test]
fn test_yaml_and_json_specs_render_identically() {
    let yaml = write_spec(CLUSTER_SPEC, ".yaml");
    let from_yaml = load_cluster_file(yaml.path()).unwrap();

    let json_spec = serde_json::to_string(&from_yaml).unwrap();
    let json = write_spec(&json_spec, ".json");
    let from_json = load_cluster_file(json.path()).unwrap();

    let left = format_render_output(&render_cluster(&from_yaml).unwrap(), OutputFormat::Yaml);
    let right = format_render_output(&render_cluster(&from_json).unwrap(), OutputFormat::Yaml);
    assert_eq!(left.unwrap(), right.unwrap());
}

#[test]
fn test_render_output_is_stable() {
    let file = write_spec(CLUSTER_SPEC, ".yaml");
    let cluster = load_cluster_file(file.path()).unwrap();

    let first = format_render_output(&render_cluster(&cluster).unwrap(), OutputFormat::Json);
    let second = format_render_output(&render_cluster(&cluster).unwrap(), OutputFormat::Json);
    assert_eq!(first.unwrap(), second.unwrap());
}

#[test]
fn test_invalid_spec_file_is_rejected() {
    let file = write_spec("name: Not_A_Label\n", ".yaml");
    assert!(load_cluster_file(file.path()).is_err());
}
