//! Platform browser launcher.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::BrowserPort;

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    pub fn new() -> Self {
        Self
    }
}

/// The launcher program and its arguments for `url`.
fn launcher(url: &str) -> (&'static str, Vec<String>) {
    #[cfg(target_os = "macos")]
    {
        ("open", vec![url.to_string()])
    }

    #[cfg(target_os = "windows")]
    {
        // The empty string is the window title `start` expects first.
        (
            "cmd",
            vec![
                "/C".to_string(),
                "start".to_string(),
                String::new(),
                url.replace('&', "^&"),
            ],
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("xdg-open", vec![url.to_string()])
    }
}

impl BrowserPort for SystemBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        let (program, args) = launcher(url);
        debug!(program, url, "Launching browser");

        let failed = |reason: String| Error::BrowserLaunchFailed {
            url: url.to_string(),
            reason,
        };

        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| failed(format!("could not run {program}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("{program} exited with {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_launcher_linux() {
        let (program, args) = launcher("http://127.0.0.1:8001/");
        assert_eq!(program, "xdg-open");
        assert_eq!(args, vec!["http://127.0.0.1:8001/"]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_launcher_macos() {
        let (program, _) = launcher("http://127.0.0.1:8001/");
        assert_eq!(program, "open");
    }
}
