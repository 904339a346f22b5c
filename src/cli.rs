//! CLI for slurmrender
//!
//! Subcommands:
//! - `slurmrender render` - Render the slurm configs ConfigMap and login container
//! - `slurmrender config` - Print rendered `.conf` files
//! - `slurmrender validate` - Validate a cluster spec and lint the rendered files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;

use crate::consts;
use crate::error::RenderError;
use crate::render::common::configmap::generate_config_by_key;
use crate::render::{
    render_config_map_slurm_configs, render_login_container, render_pod_annotations, ConfigMap,
    Container,
};
use crate::values::{SlurmCluster, SpecError};

#[derive(Parser, Debug)]
#[command(name = "slurmrender")]
#[command(about = "Render Slurm cluster configs and container specs from a cluster definition")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the slurm configs ConfigMap and the login sshd container
    Render(RenderArgs),

    /// Print rendered slurm config files
    Config(ConfigArgs),

    /// Validate a cluster spec and lint the rendered config files
    Validate(ValidateArgs),
}

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// Arguments for the render command
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to the cluster spec (YAML or JSON)
    pub spec: PathBuf,

    /// Write one file per artifact into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Path to the cluster spec (YAML or JSON)
    pub spec: PathBuf,

    /// Print only this file (e.g. slurm.conf)
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the cluster spec (YAML or JSON)
    pub spec: PathBuf,
}

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Unknown config key '{0}'")]
    UnknownKey(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

/// Expand `~` and environment variables in a path argument
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

// ============================================================================
// SBIO: Pure command logic (no I/O - returns values and strings)
// ============================================================================

/// Everything a render pass produces for one cluster
#[derive(Debug, Clone)]
pub struct RenderedCluster {
    pub config_map: ConfigMap,
    pub login_container: Container,
    /// To be set on the pod templates mounting `config_map`
    pub pod_annotations: BTreeMap<String, String>,
}

/// Render all artifacts of a cluster
pub fn render_cluster(cluster: &SlurmCluster) -> CommandResult<RenderedCluster> {
    let config_map = render_config_map_slurm_configs(cluster);
    let pod_annotations = render_pod_annotations(&config_map);
    Ok(RenderedCluster {
        config_map,
        login_container: render_login_container(cluster)?,
        pod_annotations,
    })
}

/// Serialize a value in the requested format
pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> CommandResult<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CommandError::Serialize(e.to_string()))
        }
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CommandError::Serialize(e.to_string())),
    }
}

/// File name and content for each rendered artifact
pub fn render_files(
    rendered: &RenderedCluster,
    format: OutputFormat,
) -> CommandResult<Vec<(String, String)>> {
    let ext = format.extension();
    Ok(vec![
        (
            format!("{}.{ext}", rendered.config_map.metadata.name),
            serialize(&rendered.config_map, format)?,
        ),
        (
            format!("container-{}.{ext}", rendered.login_container.name),
            serialize(&rendered.login_container, format)?,
        ),
        (
            format!("pod-annotations.{ext}"),
            serialize(&rendered.pod_annotations, format)?,
        ),
    ])
}

/// Join rendered artifacts into a single stream (a multi-document YAML
/// stream, or one JSON document per artifact).
pub fn format_render_output(
    rendered: &RenderedCluster,
    format: OutputFormat,
) -> CommandResult<String> {
    let files = render_files(rendered, format)?;
    let separator = match format {
        OutputFormat::Yaml => "---\n",
        OutputFormat::Json => "",
    };

    let mut output = String::new();
    for (_, content) in files {
        output.push_str(separator);
        output.push_str(&content);
    }
    Ok(output)
}

/// Rendered config text for one key, or all keys with headers
pub fn format_config_output(cluster: &SlurmCluster, key: Option<&str>) -> CommandResult<String> {
    if let Some(key) = key {
        let file = generate_config_by_key(cluster, key)
            .ok_or_else(|| CommandError::UnknownKey(key.to_string()))?;
        return Ok(format!("{}\n", file.render()));
    }

    let mut output = String::new();
    for key in consts::CONFIG_MAP_SLURM_CONFIGS_KEYS {
        if let Some(file) = generate_config_by_key(cluster, key) {
            output.push_str(&format!("==> {key} <==\n{}\n\n", file.render()));
        }
    }
    Ok(output)
}

/// Lint every rendered config file and render the login container.
/// Returns one line per checked artifact.
pub fn validate_cluster(cluster: &SlurmCluster) -> CommandResult<Vec<String>> {
    let mut report = Vec::new();
    for key in consts::CONFIG_MAP_SLURM_CONFIGS_KEYS {
        if let Some(file) = generate_config_by_key(cluster, key) {
            file.validate()?;
            report.push(format!("{key}: OK"));
        }
    }
    render_login_container(cluster)?;
    report.push(format!("container {}: OK", consts::CONTAINER_NAME_SSHD));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::JailSubMount;

    fn cluster() -> SlurmCluster {
        let mut cluster = SlurmCluster::new("slurm1", "slurm-poc");
        cluster.node_controller.size = 2;
        cluster
    }

    #[test]
    fn test_clap_render() {
        let cli = Cli::parse_from(["slurmrender", "-vv", "render", "cluster.yaml"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.spec, PathBuf::from("cluster.yaml"));
                assert_eq!(args.format, OutputFormat::Yaml);
                assert!(args.output_dir.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_clap_render_json_to_dir() {
        let cli = Cli::parse_from([
            "slurmrender",
            "render",
            "cluster.yaml",
            "--format",
            "json",
            "--output-dir",
            "out",
        ]);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_clap_config_key() {
        let cli = Cli::parse_from(["slurmrender", "config", "c.yaml", "--key", "gres.conf"]);
        match cli.command {
            Commands::Config(args) => assert_eq!(args.key.as_deref(), Some("gres.conf")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_format_render_output_yaml() {
        let rendered = render_cluster(&cluster()).unwrap();
        let output = format_render_output(&rendered, OutputFormat::Yaml).unwrap();

        assert_eq!(output.matches("---\n").count(), 3);
        assert!(output.contains("checksum/config: "));
        assert!(output.contains("kind: ConfigMap"));
        assert!(output.contains("name: slurm1-slurm-configs"));
        assert!(output.contains("imagePullPolicy: Always"));
    }

    #[test]
    fn test_render_files_json() {
        let rendered = render_cluster(&cluster()).unwrap();
        let files = render_files(&rendered, OutputFormat::Json).unwrap();

        assert_eq!(files[0].0, "slurm1-slurm-configs.json");
        assert_eq!(files[1].0, "container-sshd.json");
        assert_eq!(files[2].0, "pod-annotations.json");
        let value: serde_json::Value = serde_json::from_str(&files[0].1).unwrap();
        assert_eq!(value["data"]["gres.conf"], "AutoDetect=nvml");
    }

    #[test]
    fn test_format_config_output() {
        let output = format_config_output(&cluster(), Some("gres.conf")).unwrap();
        assert_eq!(output, "AutoDetect=nvml\n");

        let all = format_config_output(&cluster(), None).unwrap();
        assert!(all.contains("==> slurm.conf <=="));
        assert!(all.contains("==> plugstack.conf <=="));

        assert!(matches!(
            format_config_output(&cluster(), Some("nope.conf")),
            Err(CommandError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_validate_cluster() {
        let report = validate_cluster(&cluster()).unwrap();
        assert_eq!(report.len(), 5);

        let mut broken = cluster();
        broken.node_login.jail_sub_mounts = vec![JailSubMount {
            name: "root".to_string(),
            mount_path: "/".to_string(),
        }];
        assert!(matches!(
            validate_cluster(&broken),
            Err(CommandError::Render(RenderError::DuplicateMountPath { .. }))
        ));
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(
            expand_path(Path::new("/tmp/cluster.yaml")),
            PathBuf::from("/tmp/cluster.yaml")
        );
    }
}
