use std::process;

use anyhow::Context as _;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use slurmrender::cli::{
    expand_path, format_config_output, format_render_output, render_cluster, render_files,
    validate_cluster, Cli, Commands, ConfigArgs, RenderArgs, ValidateArgs,
};
use slurmrender::load_cluster_file;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => handle_render(args),
        Commands::Config(args) => handle_config(args),
        Commands::Validate(args) => handle_validate(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn handle_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec_path = expand_path(&args.spec);
    let cluster = load_cluster_file(&spec_path)
        .with_context(|| format!("Failed to load cluster spec {}", spec_path.display()))?;
    let rendered = render_cluster(&cluster)?;
    for (key, value) in &rendered.pod_annotations {
        info!(annotation = %key, value = %value, "pod template annotation");
    }

    match args.output_dir {
        Some(dir) => {
            let dir = expand_path(&dir);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for (name, content) in render_files(&rendered, args.format)? {
                let path = dir.join(name);
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {}", path.display());
            }
        }
        None => print!("{}", format_render_output(&rendered, args.format)?),
    }

    Ok(())
}

fn handle_config(args: ConfigArgs) -> anyhow::Result<()> {
    let spec_path = expand_path(&args.spec);
    let cluster = load_cluster_file(&spec_path)
        .with_context(|| format!("Failed to load cluster spec {}", spec_path.display()))?;
    print!("{}", format_config_output(&cluster, args.key.as_deref())?);
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let spec_path = expand_path(&args.spec);
    let cluster = load_cluster_file(&spec_path)
        .with_context(|| format!("Failed to load cluster spec {}", spec_path.display()))?;
    for line in validate_cluster(&cluster)? {
        println!("{line}");
    }
    println!("\nValidation: PASSED");
    Ok(())
}
