//! # Active Directory facts through adcli
//!
//! This crate reports the [Active Directory](https://learn.microsoft.com/en-us/windows-server/identity/ad-ds/get-started/virtual-dc/active-directory-domain-services-overview)
//! membership of a Linux host and composes the arguments used to join it.
//! All directory work is done by the external `adcli` and `kinit` programs.
//!
//! Central for that are [`Collector`], which runs `adcli` and turns its output
//! into a [`DomainReport`], and the two composers [`DomainArguments`] and
//! [`ComputerArguments`].
//!
//! ## Example
//!
//! ### Collecting domain facts
//! ```rust,no_run
//! use adcli_rs::{Collector, CollectorSettings, HostFacts, SystemExecutor};
//!
//! let facts = HostFacts::from_system().expect("readable host name");
//! let collector = Collector::new(SystemExecutor, CollectorSettings::default());
//! let report = collector.collect(&facts);
//! println!("{}", serde_json::to_string_pretty(&report).expect("serializable"));
//! ```
//!
//! ### Composing join arguments
//! ```rust
//! use adcli_rs::{DomainArguments, DomainParams, HostFacts};
//!
//! let facts = HostFacts::new("example.org", "examplehost");
//! let args = DomainArguments::compose(&DomainParams::default(), &facts);
//! assert_eq!(args.domain_realm, "EXAMPLE.ORG");
//! assert_eq!(args.domain_basedn, "dc=example,dc=org");
//! assert_eq!(args.computer_account, "EXAMPLEHOST$");
//! ```
//!
//! ## Quirks
//!
//! When `show-computer` yields nothing with the current ticket cache the
//! collector runs `kinit` with the host keytab once and asks again. If that
//! fails as well the computer section carries an `error` entry describing the
//! authentication failure instead of the attributes.

pub mod arguments;
mod collector;
mod command;
mod error;
mod executor;
mod facts;
pub mod helpers;
pub mod parser;
pub mod plan;
mod settings;
mod types;

pub use arguments::{
    ComputerArguments, ComputerParams, DomainArguments, DomainParams, LdapAuthType, LoginType,
};
pub use collector::{Collector, JoinState};
pub use command::{AdcliCommand, CommandSpec};
pub use error::*;
pub use executor::{CommandOutput, ProcessExecutor, SystemExecutor};
pub use facts::{HostFacts, NetworkingFacts, OsFacts, OsRelease};
pub use settings::{CollectorSettings, DEFAULT_KEYTAB};
pub use types::*;
