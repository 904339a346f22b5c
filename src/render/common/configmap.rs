//! Slurm `.conf` generators and the ConfigMap bundling them
//!
//! Every generator is a pure function of the cluster spec: the ConfigMap is
//! diffed by GitOps tooling, so the same spec must always produce the same
//! bytes.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::consts::{self, ComponentType};
use crate::naming;
use crate::render::common::labels::render_labels;
use crate::render::config_file::{ConfigFile, MultilineConfig, PropertiesConfig};
use crate::render::k8s::{ConfigMap, ObjectMeta};
use crate::values::{CgroupVersion, SlurmCluster};

/// Render the ConfigMap containing the slurm `.conf` files:
///
/// - [`consts::CONFIG_MAP_KEY_SLURM_CONFIG`]: slurm config
/// - [`consts::CONFIG_MAP_KEY_CGROUP_CONFIG`]: cgroup config
/// - [`consts::CONFIG_MAP_KEY_SPANK_CONFIG`]: SPANK plugins config
/// - [`consts::CONFIG_MAP_KEY_GRES_CONFIG`]: gres config
pub fn render_config_map_slurm_configs(cluster: &SlurmCluster) -> ConfigMap {
    let data = BTreeMap::from([
        (
            consts::CONFIG_MAP_KEY_SLURM_CONFIG.to_string(),
            generate_slurm_config(cluster).render(),
        ),
        (
            consts::CONFIG_MAP_KEY_CGROUP_CONFIG.to_string(),
            generate_cgroup_config(cluster).render(),
        ),
        (
            consts::CONFIG_MAP_KEY_SPANK_CONFIG.to_string(),
            generate_spank_config(cluster).render(),
        ),
        (
            consts::CONFIG_MAP_KEY_GRES_CONFIG.to_string(),
            generate_gres_config().render(),
        ),
    ]);

    debug!(cluster = %cluster.name, "rendered slurm configs");

    let metadata = ObjectMeta {
        name: naming::build_config_map_slurm_configs_name(&cluster.name),
        namespace: cluster.namespace.clone(),
        labels: render_labels(ComponentType::Controller, &cluster.name),
        annotations: BTreeMap::new(),
    };

    ConfigMap::new(metadata, data)
}

/// Annotations for the pod template of every pod mounting the ConfigMap.
///
/// The checksum changes whenever the rendered data does, so pods are rolled
/// on config changes.
pub fn render_pod_annotations(config_map: &ConfigMap) -> BTreeMap<String, String> {
    BTreeMap::from([(
        consts::ANNOTATION_CONFIG_CHECKSUM.to_string(),
        config_checksum(&config_map.data),
    )])
}

/// SHA-256 over the ConfigMap data, in key order.
pub fn config_checksum(data: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in data {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Render one of the ConfigMap documents by its key
pub fn generate_config_by_key(cluster: &SlurmCluster, key: &str) -> Option<ConfigFile> {
    match key {
        consts::CONFIG_MAP_KEY_SLURM_CONFIG => Some(generate_slurm_config(cluster)),
        consts::CONFIG_MAP_KEY_CGROUP_CONFIG => Some(generate_cgroup_config(cluster)),
        consts::CONFIG_MAP_KEY_SPANK_CONFIG => Some(generate_spank_config(cluster)),
        consts::CONFIG_MAP_KEY_GRES_CONFIG => Some(generate_gres_config()),
        _ => None,
    }
}

pub fn generate_slurm_config(cluster: &SlurmCluster) -> ConfigFile {
    let mut res = PropertiesConfig::new();

    res.add_property("ClusterName", &cluster.name);
    res.add_comment("");
    // example: SlurmctldHost=controller-0(controller-0.controller.slurm-poc.svc.cluster.local)
    for i in 0..cluster.node_controller.size {
        let (host_name, host_fqdn) =
            naming::build_service_host_fqdn(ComponentType::Controller, &cluster.namespace, i);
        res.add_property("SlurmctldHost", format!("{host_name}({host_fqdn})"));
    }
    res.add_comment("");
    res.add_property("AuthType", format!("auth/{}", consts::MUNGE));
    res.add_property("CredType", format!("cred/{}", consts::MUNGE));
    res.add_comment("");
    res.add_property("GresTypes", "gpu");
    res.add_property("MailProg", "/usr/bin/true");
    res.add_property("PluginDir", consts::SLURM_PLUGIN_DIR);
    res.add_property("ProctrackType", "proctrack/cgroup");
    res.add_property("ReturnToService", 2);
    res.add_comment("");
    res.add_property(
        "SlurmctldPidFile",
        naming::build_pid_file_path(consts::SLURMCTLD_NAME),
    );
    res.add_property(
        "SlurmctldPort",
        cluster.node_controller.container_slurmctld.port,
    );
    res.add_comment("");
    res.add_property("SlurmdPidFile", naming::build_pid_file_path(consts::SLURMD_NAME));
    res.add_property("SlurmdPort", cluster.node_worker.container_slurmd.port);
    res.add_comment("");
    res.add_property(
        "SlurmdSpoolDir",
        naming::build_volume_mount_spool_path(consts::SLURMD_NAME),
    );
    res.add_comment("");
    res.add_property("SlurmUser", consts::SLURM_USER);
    res.add_comment("");
    res.add_property(
        "StateSaveLocation",
        naming::build_volume_mount_spool_path(consts::SLURMCTLD_NAME),
    );
    res.add_comment("");
    res.add_property("TaskPlugin", "task/cgroup,task/affinity");
    res.add_comment("");
    res.add_property("CliFilterPlugins", "cli_filter/user_defaults");
    res.add_comment("");
    res.add_property("LaunchParameters", "use_interactive_step");
    res.add_comment("");
    res.add_property("MaxJobCount", consts::MAX_JOB_COUNT);
    res.add_property("MinJobAge", consts::MIN_JOB_AGE_SECS);
    res.add_comment("");
    res.add_comment("HEALTH CHECKS");
    res.add_comment("https://slurm.schedmd.com/slurm.conf.html#OPT_HealthCheckInterval");
    res.add_property("HealthCheckInterval", consts::HEALTH_CHECK_INTERVAL_SECS);
    res.add_property("HealthCheckProgram", consts::HEALTH_CHECK_PROGRAM);
    res.add_property("HealthCheckNodeState", "ANY");
    res.add_comment("");
    res.add_property("InactiveLimit", 0);
    res.add_property("KillWait", 30);
    res.add_property("SlurmctldTimeout", 120);
    res.add_property("SlurmdTimeout", 300);
    res.add_property("Waittime", 0);
    res.add_comment("");
    res.add_comment("SCHEDULING");
    res.add_property("SchedulerType", "sched/backfill");
    res.add_property("SelectType", "select/cons_tres");
    res.add_property("SelectTypeParameters", "CR_Core_Memory");
    res.add_comment("");
    res.add_comment("LOGGING AND ACCOUNTING");
    res.add_property("JobCompType", "jobcomp/none");
    res.add_property("JobAcctGatherFrequency", 30);
    res.add_property("SlurmctldDebug", consts::SLURMCTLD_DEBUG_LEVEL);
    res.add_property("SlurmctldLogFile", "/dev/null");
    res.add_property("SlurmdDebug", consts::SLURMD_DEBUG_LEVEL);
    res.add_property("SlurmdLogFile", "/dev/null");
    res.add_comment("");
    res.add_comment("COMPUTE NODES");
    res.add_comment(
        "We're using the \"dynamic nodes\" feature: https://slurm.schedmd.com/dynamic_nodes.html",
    );
    res.add_property("MaxNodeCount", consts::MAX_NODE_COUNT);
    res.add_property(
        "PartitionName",
        "main Nodes=ALL Default=YES MaxTime=INFINITE State=UP OverSubscribe=YES",
    );

    res.build()
}

pub fn generate_cgroup_config(cluster: &SlurmCluster) -> ConfigFile {
    let mut res = PropertiesConfig::new();
    res.add_property("CgroupMountpoint", consts::CGROUP_MOUNTPOINT);
    res.add_property("ConstrainCores", "yes");
    res.add_property("ConstrainDevices", "yes");
    res.add_property("ConstrainRAMSpace", "yes");
    debug!(
        cluster = %cluster.name,
        cgroup_version = cluster.node_worker.cgroup_version.as_str(),
        "rendering cgroup config"
    );
    match cluster.node_worker.cgroup_version {
        CgroupVersion::V2 => {
            res.add_property("CgroupPlugin", "cgroup/v2");
            res.add_property("ConstrainSwapSpace", "no");
            res.add_property("EnableControllers", "yes");
            res.add_property("IgnoreSystemd", "yes");
        }
        CgroupVersion::V1 => {
            res.add_property("ConstrainSwapSpace", "yes");
            res.add_property("CgroupPlugin", "cgroup/v1");
        }
    }
    res.build()
}

pub fn generate_spank_config(cluster: &SlurmCluster) -> ConfigFile {
    let mut res = MultilineConfig::new();
    res.add_line(format!("required chroot.so {}", cluster.jail_mount_path));
    res.add_line(format!(
        "required spank_pyxis.so runtime_path={} execute_entrypoint=0 container_scope=global sbatch_support=1",
        consts::PYXIS_RUNTIME_PATH
    ));
    res.build()
}

pub fn generate_gres_config() -> ConfigFile {
    let mut res = PropertiesConfig::new();
    res.add_property("AutoDetect", "nvml");
    res.build()
}
