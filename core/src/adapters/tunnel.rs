//! Tunnel backed by a `kubectl proxy` child process.
//!
//! The proxy binds its listener before printing `Starting to serve on
//! <host>:<port>`, so the local port is known (even when `0` was requested)
//! as soon as `open` returns and URLs can be resolved before `run` starts.

use std::collections::VecDeque;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::kubectl::{KubectlDiscovery, KubectlError};
use crate::domain::{KubeContext, ServiceSelector};
use crate::error::{Error, Result};
use crate::ports::{TunnelOpener, TunnelPort};

/// Address the proxy listens on.
const LOCAL_HOST: &str = "127.0.0.1";

/// How long kubectl may take to report its listener.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Prefix of the line kubectl prints once it is listening.
const READY_PREFIX: &str = "Starting to serve on ";

/// Trailing stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Opens `kubectl proxy` tunnels.
#[derive(Debug, Clone)]
pub struct KubectlProxyOpener {
    discovery: KubectlDiscovery,
    cluster: KubeContext,
}

impl KubectlProxyOpener {
    pub fn new(discovery: KubectlDiscovery, cluster: KubeContext) -> Self {
        Self { discovery, cluster }
    }

    fn command(&self, local_port: u16) -> Result<Command> {
        let mut command = self.discovery.command(&self.cluster).map_err(|e| match e {
            KubectlError::NotFound => Error::KubectlNotFound,
            other => Error::TunnelInitFailed(other.to_string()),
        })?;
        command
            .args([
                "proxy",
                &format!("--port={local_port}"),
                &format!("--address={LOCAL_HOST}"),
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(command)
    }
}

impl TunnelOpener for KubectlProxyOpener {
    type Tunnel = KubectlProxy;

    async fn open(&self, namespace: &str, local_port: u16) -> Result<KubectlProxy> {
        let mut child = self
            .command(local_port)?
            .spawn()
            .map_err(|e| Error::TunnelInitFailed(format!("Failed to start kubectl: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::TunnelInitFailed("kubectl stdout not captured".to_string()))?;
        let stderr = spawn_stderr_reader(child.stderr.take());

        let (port, stdout) = match timeout(STARTUP_TIMEOUT, wait_until_serving(stdout)).await {
            Ok(Ok(ready)) => ready,
            Ok(Err(e)) => {
                let _ = child.kill().await;
                let diagnostics = stderr.await.unwrap_or_default();
                return Err(startup_error(&e.to_string(), &diagnostics));
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(Error::TunnelInitFailed(format!(
                    "kubectl proxy did not start within {}s",
                    STARTUP_TIMEOUT.as_secs()
                )));
            }
        };

        info!(namespace, port, "Proxy listening on {LOCAL_HOST}:{port}");

        Ok(KubectlProxy {
            child,
            _stdout: stdout,
            stderr,
            namespace: namespace.to_string(),
            host: LOCAL_HOST.to_string(),
            port,
        })
    }
}

/// A running `kubectl proxy`, scoped to one namespace.
#[derive(Debug)]
pub struct KubectlProxy {
    child: Child,
    /// Kept open so kubectl never sees a closed pipe.
    _stdout: BufReader<ChildStdout>,
    /// Resolves to the last stderr lines once kubectl closes the pipe.
    stderr: JoinHandle<String>,
    namespace: String,
    host: String,
    port: u16,
}

impl KubectlProxy {
    /// The port the proxy is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl TunnelPort for KubectlProxy {
    fn resolve(&self, selector: &str) -> Result<String> {
        proxy_url(&self.host, self.port, &self.namespace, selector)
    }

    async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        debug!(port = self.port, "Serving until cancelled");

        tokio::select! {
            status = self.child.wait() => {
                let status = status?;
                let diagnostics = self.stderr.await.unwrap_or_default();
                warn!(%status, "kubectl proxy exited");
                Err(Error::ProxyRunFailed(if diagnostics.is_empty() {
                    format!("kubectl proxy exited with {status}")
                } else {
                    diagnostics
                }))
            }
            _ = cancel.cancelled() => {
                info!("Stopping proxy");
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}

/// Builds the local URL for `selector` behind a proxy at `host:port`.
pub fn proxy_url(host: &str, port: u16, namespace: &str, selector: &str) -> Result<String> {
    let selector: ServiceSelector = selector.parse()?;
    Ok(format!("http://{host}:{port}{}", selector.proxy_path(namespace)))
}

/// Reads stdout until kubectl reports its listener and returns the bound port.
async fn wait_until_serving(
    stdout: ChildStdout,
) -> std::io::Result<(u16, BufReader<ChildStdout>)> {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "kubectl proxy exited before it started serving",
            ));
        }
        if let Some(port) = parse_serving_port(&line) {
            return Ok((port, reader));
        }
        debug!(line = line.trim_end(), "kubectl proxy output");
    }
}

/// Extracts the port from `Starting to serve on 127.0.0.1:8001`.
fn parse_serving_port(line: &str) -> Option<u16> {
    let address = line.trim().strip_prefix(READY_PREFIX)?;
    let (_, port) = address.rsplit_once(':')?;
    port.parse().ok()
}

/// Reads stderr until EOF so kubectl never blocks on a full pipe.
///
/// Every line is logged; the task resolves to the last few of them.
fn spawn_stderr_reader(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let Some(stderr) = stderr else {
            return String::new();
        };

        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    debug!(line = %line, "kubectl proxy stderr");
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read kubectl proxy stderr");
                    break;
                }
            }
        }

        Vec::from(tail).join("\n")
    })
}

fn startup_error(reason: &str, diagnostics: &str) -> Error {
    if let Some(port) = diagnostics.lines().find_map(detect_port_conflict) {
        return Error::TunnelInitFailed(format!("port {port} is already in use"));
    }
    if diagnostics.is_empty() {
        Error::TunnelInitFailed(reason.to_string())
    } else {
        Error::TunnelInitFailed(format!("{reason}: {diagnostics}"))
    }
}

/// Detects a bind conflict in a kubectl output line.
/// Returns the conflicting port if detected.
fn detect_port_conflict(line: &str) -> Option<u16> {
    // kubectl format: "listen tcp 127.0.0.1:8080: bind: address already in use"
    if !line.to_lowercase().contains("address already in use") {
        return None;
    }

    line.split(':').skip(1).find_map(|part| {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        // IP octets are small numbers, ports of interest are not
        digits.parse::<u16>().ok().filter(|port| *port > 255)
    })
}
