//! Destination descriptors.
//!
//! A route names the adapter that formats records, the transport that
//! carries them, and the destination address:
//!
//! ```text
//! gelf://graylog.internal:12201      adapter "gelf", default transport
//! gelf+udp://10.0.0.5:12201          adapter "gelf", transport "udp"
//! gelf+stdout://                     adapter "gelf", transport "stdout"
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::GelfError;

/// A parsed destination descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub adapter: String,
    pub transport: Option<String>,
    pub address: String,
}

impl Route {
    /// Transport named by the route, or `default` when none is given.
    pub fn adapter_transport<'a>(&'a self, default: &'a str) -> &'a str {
        self.transport.as_deref().unwrap_or(default)
    }
}

impl FromStr for Route {
    type Err = GelfError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let (scheme, address) = uri
            .split_once("://")
            .ok_or_else(|| GelfError::Route(format!("'{uri}': expected <adapter>://<address>")))?;

        let (adapter, transport) = match scheme.split_once('+') {
            Some((adapter, transport)) => (adapter, Some(transport)),
            None => (scheme, None),
        };

        if adapter.is_empty() {
            return Err(GelfError::Route(format!("'{uri}': missing adapter name")));
        }
        if transport.is_some_and(str::is_empty) {
            return Err(GelfError::Route(format!("'{uri}': empty transport name")));
        }

        Ok(Self {
            adapter: adapter.to_ascii_lowercase(),
            transport: transport.map(str::to_ascii_lowercase),
            address: address.trim_end_matches('/').to_string(),
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transport {
            Some(ref transport) => write!(f, "{}+{}://{}", self.adapter, transport, self.address),
            None => write!(f, "{}://{}", self.adapter, self.address),
        }
    }
}
