//! Dashboard session orchestration.
//!
//! A session walks a fixed sequence of states and never goes back:
//!
//! `Init -> TunnelOpened -> AddressesResolved -> ClientResolved ->
//! HealthVerified -> Presented -> Serving`
//!
//! Any error ends the session at the state it was in. Serving lasts until the
//! cancellation token fires.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client_resolver::ClientResolver;
use super::health::HealthVerifier;
use crate::config::DashboardOptions;
use crate::domain::{PresentationMode, PRIMARY_SERVICE, SECONDARY_SERVICE};
use crate::error::Result;
use crate::ports::{ApiClientFactory, BrowserPort, ClusterApiPort, TunnelOpener, TunnelPort};

/// Progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SessionState {
    #[default]
    Init,
    TunnelOpened,
    AddressesResolved,
    ClientResolved,
    HealthVerified,
    Presented,
    Serving,
}

/// Local URLs of the two dashboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardUrls {
    pub primary: String,
    pub secondary: String,
}

/// One dashboard run over a single tunnel.
pub struct Session<T, K, F, B>
where
    T: TunnelOpener,
    K: ClusterApiPort,
    F: ApiClientFactory,
    B: BrowserPort,
{
    options: DashboardOptions,
    opener: T,
    resolver: ClientResolver<K, F>,
    browser: B,
    state: SessionState,
}

impl<T, K, F, B> Session<T, K, F, B>
where
    T: TunnelOpener,
    K: ClusterApiPort,
    F: ApiClientFactory,
    B: BrowserPort,
{
    pub fn new(
        options: DashboardOptions,
        opener: T,
        resolver: ClientResolver<K, F>,
        browser: B,
    ) -> Self {
        Self {
            options,
            opener,
            resolver,
            browser,
            state: SessionState::Init,
        }
    }

    /// The furthest state reached so far.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn advance(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Run the session, writing operator output to `out`.
    ///
    /// Returns `Ok(())` only after serving was cancelled.
    pub async fn run<W: Write + Send>(
        &mut self,
        cancel: CancellationToken,
        out: &mut W,
    ) -> Result<()> {
        let options = self.options.validate()?;

        let tunnel = self.opener.open(&options.namespace, options.port).await?;
        self.advance(SessionState::TunnelOpened);

        let urls = DashboardUrls {
            primary: tunnel.resolve(PRIMARY_SERVICE)?,
            secondary: tunnel.resolve(SECONDARY_SERVICE)?,
        };
        self.advance(SessionState::AddressesResolved);

        let client = self
            .resolver
            .resolve(
                options.api_addr.as_deref(),
                &options.cluster,
                &options.namespace,
            )
            .await?;
        self.advance(SessionState::ClientResolved);

        HealthVerifier::new(&options.namespace)
            .verify(&client)
            .await?;
        self.advance(SessionState::HealthVerified);

        self.present(options.mode, &urls, out).await?;
        self.advance(SessionState::Presented);

        info!("Serving dashboards until interrupted");
        self.advance(SessionState::Serving);
        tunnel.run(cancel).await
    }

    async fn present<W: Write + Send>(
        &self,
        mode: PresentationMode,
        urls: &DashboardUrls,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Linkerd dashboard available at:\n{}", urls.primary)?;
        writeln!(out, "Grafana dashboard available at:\n{}", urls.secondary)?;

        let target = match mode {
            PresentationMode::OpenPrimary => Some(("Linkerd", &urls.primary)),
            PresentationMode::OpenSecondary => Some(("Grafana", &urls.secondary)),
            PresentationMode::PrintOnly => None,
        };

        if let Some((name, url)) = target {
            writeln!(out, "Opening {name} dashboard in the default browser")?;
            out.flush()?;
            self.browser.open(url).await?;
        }

        Ok(())
    }
}
