//! Service selectors of the form `<service>:<port-name>`.

use std::str::FromStr;

use crate::error::Error;

/// The primary dependent service (Linkerd web dashboard).
pub const PRIMARY_SERVICE: &str = "web:http";

/// The secondary dependent service (Grafana).
pub const SECONDARY_SERVICE: &str = "grafana:http";

/// A named service port inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceSelector {
    pub service: String,
    pub port: String,
}

impl ServiceSelector {
    /// API server path that proxies to this service in `namespace`.
    pub fn proxy_path(&self, namespace: &str) -> String {
        format!(
            "/api/v1/namespaces/{namespace}/services/{}:{}/proxy/",
            self.service, self.port
        )
    }
}

impl std::fmt::Display for ServiceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.service, self.port)
    }
}

impl FromStr for ServiceSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::ResolutionFailed {
            selector: s.to_string(),
            reason: reason.to_string(),
        };

        let (service, port) = s
            .split_once(':')
            .ok_or_else(|| invalid("expected <service>:<port>"))?;

        let is_name = |v: &str| {
            !v.is_empty()
                && v.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        };

        if !is_name(service) {
            return Err(invalid("invalid service name"));
        }
        if !is_name(port) {
            return Err(invalid("invalid port name"));
        }

        Ok(Self {
            service: service.to_string(),
            port: port.to_string(),
        })
    }
}
