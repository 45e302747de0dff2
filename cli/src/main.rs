//! Meshdash CLI - Open the service mesh dashboards
//!
//! A command-line tool that tunnels into the cluster, checks that the
//! control plane is healthy and shows its dashboards.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use meshdash_core::config::DEFAULT_NAMESPACE;

#[derive(Parser)]
#[command(name = "meshdash")]
#[command(author, version, about = "Open the service mesh dashboards through a cluster tunnel")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the kubeconfig file to use for CLI requests
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Name of the kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Namespace in which the control plane is installed
    #[arg(
        short = 'l',
        long = "linkerd-namespace",
        global = true,
        env = "LINKERD_NAMESPACE",
        default_value = DEFAULT_NAMESPACE
    )]
    namespace: String,

    /// Override the control-plane API address (bypasses the Kubernetes API server)
    #[arg(long, global = true, env = "LINKERD_API_ADDR")]
    api_addr: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the Linkerd dashboard in a web browser
    Dashboard {
        /// The port on which to run the proxy (when set to 0, a random port will be used)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        port: i64,

        /// Open a dashboard in a browser or show URLs in the CLI (one of: linkerd, grafana, url)
        #[arg(long, default_value = "linkerd")]
        show: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Dashboard { port, show } => {
            let options = meshdash_core::DashboardOptions {
                port,
                show,
                namespace: cli.namespace,
                api_addr: cli.api_addr,
                kubeconfig: cli.kubeconfig,
                context: cli.context,
            };
            commands::dashboard::run(options).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Writes a fatal error, plus its remediation hint when there is one, to stderr.
fn report(err: &anyhow::Error) {
    eprintln!("Error: {err:#}");
    if let Some(hint) = err
        .downcast_ref::<meshdash_core::Error>()
        .and_then(meshdash_core::Error::hint)
    {
        eprintln!("{hint}");
    }
}
