//! Per-source feed parsing into canonical network ranges.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::fetcher::SourceResult;
use crate::profiles::{FeedFormat, FeedSource};

/// Canonical ranges extracted from one feed payload, split by family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRanges {
    pub ipv4: BTreeSet<Ipv4Net>,
    pub ipv6: BTreeSet<Ipv6Net>,
}

impl ParsedRanges {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    pub fn extend(&mut self, other: ParsedRanges) {
        self.ipv4.extend(other.ipv4);
        self.ipv6.extend(other.ipv6);
    }
}

/// JSON-line record shape used by the Spamhaus DROP feeds.
#[derive(Deserialize)]
struct CidrRecord {
    cidr: Option<String>,
}

/// Parse one fetch outcome.
///
/// A failed or empty result yields empty sets with a diagnostic; it is the
/// orchestration layer's job to notice when every source came back empty.
pub fn parse_result(result: &SourceResult) -> ParsedRanges {
    match result.body.as_deref() {
        Some(body) if !body.is_empty() => parse_feed(result.source, body),
        _ => {
            warn!("No usable payload from {}; skipping", result.source.name);
            ParsedRanges::default()
        }
    }
}

/// Parse a raw feed payload line by line.
///
/// Malformed lines are dropped with a diagnostic; they never abort the
/// remainder of the payload.
pub fn parse_feed(source: &FeedSource, body: &str) -> ParsedRanges {
    let mut ranges = ParsedRanges::default();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let extracted = match extract_range(source.format, line) {
            Some(text) => text,
            None => {
                debug!("Parser threw out line from {}: {}", source.name, line);
                continue;
            }
        };

        match parse_range(extracted.trim()) {
            Some(IpNet::V4(net)) => {
                ranges.ipv4.insert(net.trunc());
            }
            Some(IpNet::V6(net)) => {
                ranges.ipv6.insert(net.trunc());
            }
            None => {
                debug!("Parser threw out invalid range from {}: {}", source.name, extracted);
            }
        }
    }

    ranges
}

/// Apply the source-format-specific extraction rule to one line.
fn extract_range(format: FeedFormat, line: &str) -> Option<String> {
    match format {
        FeedFormat::Plain => Some(line.to_string()),
        FeedFormat::Csv => line.split_once(',').map(|(cidr, _)| cidr.to_string()),
        FeedFormat::JsonLines => match serde_json::from_str::<CidrRecord>(line) {
            Ok(record) => record.cidr,
            Err(_) => None,
        },
    }
}

/// Parse a bare address or a CIDR into a network range.
fn parse_range(text: &str) -> Option<IpNet> {
    if text.contains('/') {
        text.parse::<IpNet>().ok()
    } else {
        text.parse::<IpAddr>().ok().map(IpNet::from)
    }
}
