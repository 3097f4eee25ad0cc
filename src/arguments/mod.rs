//! Composition of adcli arguments from optional parameters and host facts.
//!
//! Every option resolves to a value and a shell fragment. A given value
//! (non-blank string, non-empty list, `true`) renders as `--flag='value'`.
//! Anything else falls back to a default derived from [`HostFacts`](crate::HostFacts)
//! and renders as an empty fragment. Composition never fails.
//!
//! Next to the shell fragments the composers keep an argument vector of the
//! given options for [`CommandSpec`](crate::CommandSpec), see [`crate::plan`].

mod computer;
mod domain;
mod lenient;

pub use computer::{ComputerArguments, ComputerParams, PasswordLifetime};
pub use domain::{DomainArguments, DomainParams};

use std::str::FromStr;

use serde::Serialize;

use crate::{error::ConversionError, helpers::quote};

/// Collects argv entries while rendering the matching shell fragments
#[derive(Debug, Default)]
pub(crate) struct Fragments {
    args: Vec<String>,
}

impl Fragments {
    /// `--flag='value'`
    pub(crate) fn valued(&mut self, flag: &str, value: &str) -> String {
        self.args.push(format!("--{flag}={value}"));
        format!("--{flag}={}", quote(value))
    }

    /// `--flag='a' --flag='b'`, empty for no values
    pub(crate) fn repeated(&mut self, flag: &str, values: &[String]) -> String {
        values
            .iter()
            .map(|value| self.valued(flag, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `--flag`
    pub(crate) fn bare(&mut self, flag: &str) -> String {
        self.args.push(format!("--{flag}"));
        format!("--{flag}")
    }

    /// `--flag=true`
    pub(crate) fn enabled(&mut self, flag: &str) -> String {
        let fragment = format!("--{flag}=true");
        self.args.push(fragment.clone());
        fragment
    }

    pub(crate) fn into_args(self) -> Vec<String> {
        self.args
    }
}

/// Account used to authenticate against the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    Computer,
    User,
}

impl From<LoginType> for &str {
    fn from(value: LoginType) -> Self {
        match value {
            LoginType::Computer => "computer",
            LoginType::User => "user",
        }
    }
}

impl FromStr for LoginType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "computer" => Ok(LoginType::Computer),
            "user" => Ok(LoginType::User),
            _ => Err(ConversionError::UnknownVariant(s.to_string())),
        }
    }
}

/// Bind method for ldap lookups of users and groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LdapAuthType {
    Insecure,
    Tls,
    GssSpnego,
    Gssapi,
}

impl From<LdapAuthType> for &str {
    fn from(value: LdapAuthType) -> Self {
        match value {
            LdapAuthType::Insecure => "insecure",
            LdapAuthType::Tls => "tls",
            LdapAuthType::GssSpnego => "gss_spnego",
            LdapAuthType::Gssapi => "gssapi",
        }
    }
}

impl FromStr for LdapAuthType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insecure" => Ok(LdapAuthType::Insecure),
            "tls" => Ok(LdapAuthType::Tls),
            "gss_spnego" => Ok(LdapAuthType::GssSpnego),
            "gssapi" => Ok(LdapAuthType::Gssapi),
            _ => Err(ConversionError::UnknownVariant(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn fragments() {
        let mut fragments = Fragments::default();
        assert_eq!(fragments.valued("os-name", "Linux"), "--os-name='Linux'");
        assert_eq!(
            fragments.repeated("setattr", &["a=1".to_string(), "b=2".to_string()]),
            "--setattr='a=1' --setattr='b=2'"
        );
        assert_eq!(fragments.repeated("service-name", &[]), "");
        assert_eq!(fragments.bare("add-samba-data"), "--add-samba-data");
        assert_eq!(fragments.enabled("account-disable"), "--account-disable=true");
        assert_eq!(
            fragments.into_args(),
            [
                "--os-name=Linux",
                "--setattr=a=1",
                "--setattr=b=2",
                "--add-samba-data",
                "--account-disable=true"
            ]
        );
    }

    #[rstest]
    #[case("computer", Ok(LoginType::Computer))]
    #[case("user", Ok(LoginType::User))]
    #[case("admin", Err(ConversionError::UnknownVariant("admin".to_string())))]
    fn login_type(#[case] input: &str, #[case] expected: Result<LoginType, ConversionError>) {
        assert_eq!(input.parse::<LoginType>(), expected)
    }

    #[rstest]
    #[case("insecure", Some(LdapAuthType::Insecure))]
    #[case("tls", Some(LdapAuthType::Tls))]
    #[case("gss_spnego", Some(LdapAuthType::GssSpnego))]
    #[case("gssapi", Some(LdapAuthType::Gssapi))]
    #[case("GSSAPI", None)]
    #[case("", None)]
    fn ldap_auth_type(#[case] input: &str, #[case] expected: Option<LdapAuthType>) {
        assert_eq!(input.parse::<LdapAuthType>().ok(), expected);
        if let Some(auth_type) = expected {
            assert_eq!(<&str>::from(auth_type), input);
        }
    }
}
