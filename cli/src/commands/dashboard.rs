//! Dashboard command - tunnel, verify, show.

use anyhow::Result;
use meshdash_core::adapters::{
    KubectlApiClientFactory, KubectlClusterApi, KubectlDiscovery, KubectlProxyOpener, SystemBrowser,
};
use meshdash_core::{ClientResolver, DashboardOptions, KubeContext, Session};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(options: DashboardOptions) -> Result<()> {
    let discovery = KubectlDiscovery::new();
    let cluster = KubeContext {
        kubeconfig: options.kubeconfig.clone(),
        context: options.context.clone(),
    };

    let resolver = ClientResolver::new(
        KubectlClusterApi::new(discovery.clone(), cluster.clone()),
        KubectlApiClientFactory::new(discovery.clone(), &options.namespace),
    );
    let mut session = Session::new(
        options,
        KubectlProxyOpener::new(discovery, cluster),
        resolver,
        SystemBrowser::new(),
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    let mut stdout = std::io::stdout();
    session.run(cancel, &mut stdout).await?;
    Ok(())
}

/// Cancels `cancel` on Ctrl+C or SIGTERM.
async fn shutdown_on_signal(cancel: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }

    cancel.cancel();
}
