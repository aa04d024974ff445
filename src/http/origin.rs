use hyper::Uri;
use std::fmt;
use std::net::IpAddr;

/// Scheme, host and port: what decides whether a connection can be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub secure: bool,
    pub host: String,
    pub port: u16,
}

impl Origin {
    pub fn from_uri(uri: &Uri) -> Result<Self, anyhow::Error> {
        let secure = match uri.scheme_str() {
            Some("https") => true,
            Some("http") => false,
            Some(other) => return Err(anyhow!("Unsupported scheme '{}' in {}", other, uri)),
            None => return Err(anyhow!("Can not find scheme in the uri:{}.", uri)),
        };
        let host = uri
            .host()
            .ok_or_else(|| anyhow!("Can not find host in the uri:{}.", uri))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        ensure!(!host.is_empty(), "Empty host in the uri:{}.", uri);

        let port = uri.port_u16().unwrap_or(if secure { 443 } else { 80 });
        Ok(Self {
            secure,
            host: host.to_string(),
            port,
        })
    }

    /// The host as an address, when it is an IP literal and needs no lookup.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "https" } else { "http" };
        match self.ip() {
            Some(IpAddr::V6(ip)) => write!(f, "{}://[{}]:{}", scheme, ip, self.port),
            _ => write!(f, "{}://{}:{}", scheme, self.host, self.port),
        }
    }
}
