//! Threat-feed source registry and blocking profiles.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a feed's lines must be interpreted before range parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// One IP or CIDR per line.
    Plain,
    /// CIDR is the first comma-separated field.
    Csv,
    /// Newline-delimited JSON objects carrying a `cidr` field.
    JsonLines,
}

/// A single threat-intelligence feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
    pub format: FeedFormat,
}

pub const IPSUM_LEVEL2: FeedSource = FeedSource {
    name: "ipsum-level-2",
    url: "https://raw.githubusercontent.com/stamparm/ipsum/master/levels/2.txt",
    format: FeedFormat::Plain,
};

pub const IPSUM_LEVEL3: FeedSource = FeedSource {
    name: "ipsum-level-3",
    url: "https://raw.githubusercontent.com/stamparm/ipsum/master/levels/3.txt",
    format: FeedFormat::Plain,
};

pub const SPAMHAUS_IPV6: FeedSource = FeedSource {
    name: "spamhaus-ipv6",
    url: "https://www.spamhaus.org/drop/drop_v6.json",
    format: FeedFormat::JsonLines,
};

pub const EMERGING_THREATS: FeedSource = FeedSource {
    name: "emerging-threats",
    url: "https://rules.emergingthreats.net/blockrules/compromised-ips.txt",
    format: FeedFormat::Plain,
};

pub const BLOCKLIST_DE_ALL: FeedSource = FeedSource {
    name: "blocklist-de-all",
    url: "https://lists.blocklist.de/lists/all.txt",
    format: FeedFormat::Plain,
};

pub const JAMESBRINE_SSH: FeedSource = FeedSource {
    name: "jamesbrine-ssh",
    url: "https://jamesbrine.com.au/csv",
    format: FeedFormat::Csv,
};

pub const APNIC_TELNET: FeedSource = FeedSource {
    name: "apnic-telnet",
    url: "https://feeds.honeynet.asia/bruteforce/latest-telnetbruteforce-unique.csv",
    format: FeedFormat::Csv,
};

pub const APNIC_SSH: FeedSource = FeedSource {
    name: "apnic-ssh",
    url: "https://feeds.honeynet.asia/bruteforce/latest-sshbruteforce-unique.csv",
    format: FeedFormat::Csv,
};

/// Named blocking policy selecting which feeds contribute to the denylist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Open,
    Lenient,
    #[default]
    Balanced,
    Firm,
    Strict,
}

impl Profile {
    /// The feeds polled for this profile.
    pub fn sources(&self) -> &'static [FeedSource] {
        match self {
            Profile::Open => &[IPSUM_LEVEL3],
            Profile::Lenient => &[IPSUM_LEVEL2, SPAMHAUS_IPV6],
            Profile::Balanced => &[
                IPSUM_LEVEL2,
                SPAMHAUS_IPV6,
                EMERGING_THREATS,
                BLOCKLIST_DE_ALL,
            ],
            Profile::Firm => &[
                IPSUM_LEVEL2,
                SPAMHAUS_IPV6,
                EMERGING_THREATS,
                BLOCKLIST_DE_ALL,
                JAMESBRINE_SSH,
                APNIC_TELNET,
            ],
            Profile::Strict => &[
                IPSUM_LEVEL2,
                SPAMHAUS_IPV6,
                EMERGING_THREATS,
                BLOCKLIST_DE_ALL,
                JAMESBRINE_SSH,
                APNIC_SSH,
                APNIC_TELNET,
            ],
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Open => "open",
            Profile::Lenient => "lenient",
            Profile::Balanced => "balanced",
            Profile::Firm => "firm",
            Profile::Strict => "strict",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Profile::Open),
            "lenient" => Ok(Profile::Lenient),
            "balanced" => Ok(Profile::Balanced),
            "firm" => Ok(Profile::Firm),
            "strict" => Ok(Profile::Strict),
            other => anyhow::bail!(
                "unknown profile '{}'; expected one of: open, lenient, balanced, firm, strict",
                other
            ),
        }
    }
}
