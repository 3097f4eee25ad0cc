//! Host facts consumed by the collector and the argument composer.
//!
//! Nothing in this crate reads ambient state on its own, callers pass a
//! [`HostFacts`] value. [`HostFacts::from_system()`] builds one from the usual
//! Linux sources for callers that want the live values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdcliError;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostFacts {
    pub networking: NetworkingFacts,
    pub os: OsFacts,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkingFacts {
    /// DNS domain, e.g. `example.org`
    pub domain: String,
    /// Short host name, e.g. `examplehost`
    pub hostname: String,
    /// e.g. `examplehost.example.org`
    pub fqdn: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OsFacts {
    pub name: String,
    pub release: OsRelease,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OsRelease {
    pub major: String,
    pub minor: String,
}

const HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";
const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";
const OS_RELEASE_PATH: &str = "/etc/os-release";

impl HostFacts {
    pub fn new(domain: &str, hostname: &str) -> Self {
        let fqdn = if domain.is_empty() {
            hostname.to_string()
        } else {
            format!("{hostname}.{domain}")
        };
        Self {
            networking: NetworkingFacts {
                domain: domain.to_string(),
                hostname: hostname.to_string(),
                fqdn,
            },
            os: OsFacts::default(),
        }
    }

    pub fn with_os(mut self, name: &str, major: &str, minor: &str) -> Self {
        self.os = OsFacts {
            name: name.to_string(),
            release: OsRelease {
                major: major.to_string(),
                minor: minor.to_string(),
            },
        };
        self
    }

    /// Reads the kernel host name, the resolver domain and `/etc/os-release`.
    ///
    /// A missing resolv.conf or os-release only leaves the related facts empty,
    /// the host name is required.
    pub fn from_system() -> Result<Self, AdcliError> {
        let kernel_hostname = read_to_string(HOSTNAME_PATH)?;
        let resolv_conf = fs::read_to_string(RESOLV_CONF_PATH).unwrap_or_default();
        let os_release = fs::read_to_string(OS_RELEASE_PATH).unwrap_or_default();
        let facts = Self::from_sources(&kernel_hostname, &resolv_conf, &os_release);
        debug!("discovered host facts: {facts:?}");
        Ok(facts)
    }

    /// Builds facts from the raw contents of the kernel host name, resolv.conf and os-release
    pub fn from_sources(kernel_hostname: &str, resolv_conf: &str, os_release: &str) -> Self {
        let kernel_hostname = kernel_hostname.trim();
        let (hostname, domain) = match kernel_hostname.split_once('.') {
            Some((host, domain)) => (host.to_string(), domain.to_string()),
            None => (
                kernel_hostname.to_string(),
                resolver_domain(resolv_conf).unwrap_or_default(),
            ),
        };
        let mut facts = Self::new(&domain, &hostname);
        facts.os = parse_os_release(os_release);
        facts
    }
}

fn read_to_string(path: impl AsRef<Path>) -> Result<String, AdcliError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| AdcliError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// `domain` wins over the first `search` entry, the last occurrence of each counts
fn resolver_domain(resolv_conf: &str) -> Option<String> {
    let mut domain = None;
    let mut search = None;
    for line in resolv_conf.lines() {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("domain") => domain = words.next().map(str::to_string),
            Some("search") => search = words.next().map(str::to_string),
            _ => {}
        }
    }
    domain.or(search)
}

fn parse_os_release(os_release: &str) -> OsFacts {
    let mut os = OsFacts::default();
    for line in os_release.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "NAME" => os.name = value.to_string(),
            "VERSION_ID" => {
                let mut parts = value.split('.');
                os.release.major = parts.next().unwrap_or_default().to_string();
                os.release.minor = parts.next().unwrap_or_default().to_string();
            }
            _ => {}
        }
    }
    os
}
