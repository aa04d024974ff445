use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle timestamps of one request, in milliseconds on a monotonic clock.
///
/// Every field except `start` stays `None` until its event fires.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    pub start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_lookup: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_handshake: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
    pub phases: Phases,
}

/// Durations between consecutive lifecycle timestamps, in milliseconds.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phases {
    /// `socket - start`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    /// `dnsLookup - socket`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    /// `connect - dnsLookup`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp: Option<f64>,
    /// `upload - connect`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<f64>,
    /// `response - upload`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_byte: Option<f64>,
    /// `end - response`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<f64>,
    /// `end - start`, or `error - start` when the request failed first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl Timings {
    pub fn new(start: f64) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Whether a terminal event (`end` or `error`) has been recorded.
    pub fn is_settled(&self) -> bool {
        self.end.is_some() || self.error.is_some()
    }

    /// Present timestamps in lifecycle order, labelled. `tlsHandshake` and
    /// `error` are not part of the ordering.
    pub fn ordered(&self) -> Vec<(&'static str, f64)> {
        [
            ("start", Some(self.start)),
            ("socket", self.socket),
            ("dnsLookup", self.dns_lookup),
            ("connect", self.connect),
            ("upload", self.upload),
            ("response", self.response),
            ("end", self.end),
        ]
        .into_iter()
        .filter_map(|(name, at)| at.map(|at| (name, at)))
        .collect()
    }
}

fn write_phase(f: &mut fmt::Formatter<'_>, label: &str, value: Option<f64>) -> fmt::Result {
    match value {
        Some(ms) => writeln!(f, "  {:<17}{:>10.3} ms", label, ms),
        None => writeln!(f, "  {:<17}{:>10}", label, "N/A"),
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nTime breakdown:")?;
        write_phase(f, "Socket wait:", self.phases.wait)?;
        write_phase(f, "DNS lookup:", self.phases.dns)?;
        write_phase(f, "TCP connect:", self.phases.tcp)?;
        if let Some(tls) = self.tls_handshake {
            writeln!(f, "  {:<17}{:>10.3} ms (since start)", "TLS handshake:", tls - self.start)?;
        }
        write_phase(f, "Request sent:", self.phases.request)?;
        write_phase(f, "First byte:", self.phases.first_byte)?;
        write_phase(f, "Download:", self.phases.download)?;
        write_phase(f, "Total time:", self.phases.total)?;
        if let Some(error) = self.error {
            writeln!(f, "  {:<17}{:>10.3} ms (since start)", "Failed at:", error - self.start)?;
        }

        Ok(())
    }
}
