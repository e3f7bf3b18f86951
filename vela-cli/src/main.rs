use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use vela_core::status::Status;
use vela_provider_alicloud::ProviderConfig;
use vela_provider_alicloud::resources::resource_types;
use vela_provider_alicloud::user_data::{
    UserDataParams, attach_script, autoscaler_labels, compose_user_data,
};

#[derive(Parser)]
#[command(name = "vela")]
#[command(about = "Inspect and bootstrap Alibaba Cloud resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the user data attaching a node to a Kubernetes cluster
    UserData {
        /// Cluster version (e.g., 1.14.8-aliyun.1)
        #[arg(long)]
        version: String,

        /// Cluster region (e.g., cn-beijing)
        #[arg(long)]
        region: String,

        /// Permanent cluster token
        #[arg(long)]
        token: String,

        /// Comma-separated node labels
        #[arg(long, default_value = "")]
        labels: String,

        /// Comma-separated node taints
        #[arg(long, default_value = "")]
        taints: String,

        /// Add the cluster autoscaler label
        #[arg(long)]
        autoscaler: bool,

        /// Print the plain script instead of base64
        #[arg(long)]
        plain: bool,
    },
    /// Validate a provider config file and show the effective settings
    Config {
        /// Path to JSON config file
        #[arg(default_value = "vela.json")]
        file: PathBuf,
    },
    /// List the statuses waits understand
    Statuses,
    /// List resource types and their attributes
    Resources,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::UserData {
            version,
            region,
            token,
            labels,
            taints,
            autoscaler,
            plain,
        } => run_user_data(
            &version, &region, &token, &labels, &taints, autoscaler, plain,
        ),
        Commands::Config { file } => run_config(&file),
        Commands::Statuses => {
            run_statuses();
            Ok(())
        }
        Commands::Resources => {
            run_resources();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_user_data(
    version: &str,
    region: &str,
    token: &str,
    labels: &str,
    taints: &str,
    autoscaler: bool,
    plain: bool,
) -> Result<(), String> {
    let output = render_user_data(version, region, token, labels, taints, autoscaler, plain)?;
    println!("{}", output);
    Ok(())
}

fn render_user_data(
    version: &str,
    region: &str,
    token: &str,
    labels: &str,
    taints: &str,
    autoscaler: bool,
    plain: bool,
) -> Result<String, String> {
    if version.trim().is_empty() || region.trim().is_empty() || token.trim().is_empty() {
        return Err("version, region and token must not be empty".to_string());
    }

    let labels = if autoscaler {
        autoscaler_labels(labels)
    } else {
        labels.to_string()
    };
    let params = UserDataParams::new(version, region, token)
        .with_labels(&labels)
        .with_taints(taints);

    if plain {
        Ok(attach_script(&params))
    } else {
        Ok(compose_user_data(&params))
    }
}

fn run_config(file: &PathBuf) -> Result<(), String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    log::debug!("read {} bytes from {}", content.len(), file.display());

    println!("{}", "Validating...".cyan());
    let config = ProviderConfig::from_json(&content).map_err(|e| e.to_string())?;

    println!("{}", "✓ Provider config is valid.".green().bold());
    for line in describe_config(&config) {
        println!("  • {}", line);
    }
    Ok(())
}

fn describe_config(config: &ProviderConfig) -> Vec<String> {
    let waiter = config.waiter_config();
    vec![
        format!("region: {}", config.region),
        format!("poll interval: {}s", waiter.poll_interval.as_secs()),
        format!("default timeout: {}s", waiter.default_timeout.as_secs()),
        format!("debug: {}", if waiter.debug { "on" } else { "off" }),
    ]
}

fn run_statuses() {
    println!("{}", "Known statuses (matched ignoring case):".bold());
    for status in Status::KNOWN.iter() {
        let name = status.as_str();
        let colored_name = if status.is_deleted() {
            name.red()
        } else if status.matches(&Status::Running) {
            name.green()
        } else {
            name.yellow()
        };
        println!("  • {}", colored_name);
    }
}

fn run_resources() {
    for resource_type in resource_types() {
        let kind = if resource_type.is_data_source() {
            "data source".cyan()
        } else {
            "resource".green()
        };
        println!("{} ({})", resource_type.name().bold(), kind);

        let schema = resource_type.schema();
        let mut names: Vec<&String> = schema.attributes.keys().collect();
        names.sort();
        for name in names {
            let attr = &schema.attributes[name];
            let marker = if attr.computed { "computed" } else { "argument" };
            println!("  • {} {}", name, format!("[{}]", marker).dimmed());
        }
    }
}
