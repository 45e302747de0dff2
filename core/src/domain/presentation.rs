//! What the session shows once the control plane is healthy.

use std::str::FromStr;

use crate::error::Error;

/// Presentation mode, selected once from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentationMode {
    /// Open the Linkerd web dashboard in a browser.
    #[default]
    OpenPrimary,
    /// Open the Grafana dashboard in a browser.
    OpenSecondary,
    /// Only print the dashboard URLs.
    PrintOnly,
}

impl PresentationMode {
    pub const ALL: [PresentationMode; 3] = [
        PresentationMode::OpenPrimary,
        PresentationMode::OpenSecondary,
        PresentationMode::PrintOnly,
    ];

    /// The `--show` value selecting this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenPrimary => "linkerd",
            Self::OpenSecondary => "grafana",
            Self::PrintOnly => "url",
        }
    }
}

impl std::fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresentationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                Error::ConfigInvalid(format!(
                    "unknown value for 'show' param, was: {s}, must be one of: linkerd, grafana, url"
                ))
            })
    }
}
