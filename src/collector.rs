use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    command::{AdcliCommand, CommandSpec},
    error::AdcliError,
    executor::{CommandOutput, ProcessExecutor},
    facts::HostFacts,
    helpers::{filetime_to_datetime, format_age, format_datetime, parse_filetime},
    parser::{normalize_name, parse_computer_info, parse_ini},
    settings::CollectorSettings,
    types::{DomainReport, FactValue},
};

const NOT_AUTHENTICATED: &str = "error:\n not authenticated or authorized\n";
const AUTHENTICATION_FAILED: &str =
    "error:\n authentication failed - not authenticated or authorized\n";

const SERVICE_PRINCIPAL_NAME: &str = "servicePrincipalName";
const PWD_LAST_SET: &str = "pwdLastSet";
const DERIVED_PWD_FIELDS: [&str; 3] = [
    "pwdLastSetUnix",
    "pwdLastSetDateTime",
    "computer_account_pwd_age",
];

/// Outcome of `adcli testjoin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Joined,
    NotJoined,
    Unknown,
}

impl From<JoinState> for &str {
    fn from(value: JoinState) -> Self {
        match value {
            JoinState::Joined => "true",
            JoinState::NotJoined => "false",
            JoinState::Unknown => "unknown",
        }
    }
}

/// Gathers the [`DomainReport`] of the local host.
///
/// Collection never fails. Every command is guarded on its own and a failing
/// step leaves the fields it would have filled absent, `"unknown"`, or sets
/// [`DomainReport::error`] when `adcli info` output cannot be parsed.
///
/// Commands run one after another and block until they exit, there is no timeout.
#[derive(Debug, Clone)]
pub struct Collector<E> {
    executor: E,
    settings: CollectorSettings,
}

impl<E: ProcessExecutor> Collector<E> {
    pub fn new(executor: E, settings: CollectorSettings) -> Self {
        Self { executor, settings }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    pub fn collect(&self, facts: &HostFacts) -> DomainReport {
        self.collect_at(facts, Utc::now())
    }

    /// Same as [`Collector::collect()`] with `now` as the reference for the password age
    pub fn collect_at(&self, facts: &HostFacts, now: DateTime<Utc>) -> DomainReport {
        let mut report = DomainReport::default();
        let domain = facts.networking.domain.as_str();
        let computer_name = facts.networking.hostname.to_uppercase();
        let computer_account = format!("{computer_name}$");

        report
            .computer
            .insert("computer_name".to_string(), computer_name.into());
        report.computer.insert(
            "computer_account".to_string(),
            computer_account.clone().into(),
        );
        report.computer.insert(
            "computer_joined".to_string(),
            <&str>::from(JoinState::Unknown).into(),
        );

        if self.executor.which(&self.settings.adcli).is_none() {
            info!("{} not found, skipping domain facts", self.settings.adcli.display());
            return report;
        }

        let joined = self.test_join();
        report
            .computer
            .insert("computer_joined".to_string(), <&str>::from(joined).into());

        if domain.is_empty() {
            debug!("host has no dns domain, skipping adcli info");
            return report;
        }

        match self.collect_details(&mut report, domain, &computer_account, now) {
            Ok(()) => {}
            Err(e @ AdcliError::Parse { .. }) => {
                warn!("{e}");
                report.error = Some(e.to_string());
            }
            Err(e) => debug!("domain facts incomplete: {e}"),
        }
        report
    }

    fn test_join(&self) -> JoinState {
        match self.run(&AdcliCommand::testjoin(&self.settings.adcli)) {
            Ok(output) if output.success() => JoinState::Joined,
            Ok(output) => {
                debug!("testjoin exited with {:?}: {}", output.status, output.stderr.trim());
                JoinState::NotJoined
            }
            Err(e) => {
                warn!("{e}");
                JoinState::Unknown
            }
        }
    }

    fn collect_details(
        &self,
        report: &mut DomainReport,
        domain: &str,
        computer_account: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AdcliError> {
        let info = self.run(&AdcliCommand::info(&self.settings.adcli, domain))?;
        if !info.success() {
            warn!("adcli info {domain} exited with {:?}: {}", info.status, info.stderr.trim());
        }
        apply_domain_info(report, &info.stdout)?;

        let computer_info = self.computer_info(computer_account)?;
        apply_computer_info(report, &computer_info, now);
        Ok(())
    }

    /// Output of `show-computer`, retried once after a keytab login when the
    /// ticket cache yields nothing
    fn computer_info(&self, computer_account: &str) -> Result<String, AdcliError> {
        let show_computer = AdcliCommand::show_computer(&self.settings.adcli);
        let output = self.run(&show_computer)?;
        if !output.stdout.trim().is_empty() {
            return Ok(output.stdout);
        }

        if computer_account == "$" || self.executor.which(&self.settings.kinit).is_none() {
            debug!("show-computer returned nothing and no keytab login is possible");
            return Ok(NOT_AUTHENTICATED.to_string());
        }

        info!("show-computer returned nothing, retrying after kinit as {computer_account}");
        let kinit = AdcliCommand::kinit(&self.settings.kinit, &self.settings.keytab, computer_account);
        let retry = self.run(&kinit).and_then(|_| self.run(&show_computer));
        match retry {
            Ok(output) if output.stdout.trim().is_empty() => Ok(AUTHENTICATION_FAILED.to_string()),
            Ok(output) => Ok(output.stdout),
            Err(e) => {
                warn!("{e}");
                Ok(NOT_AUTHENTICATED.to_string())
            }
        }
    }

    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, AdcliError> {
        debug!("running {command}");
        Ok(self.executor.run(command)?)
    }
}

/// Merges `adcli info` sections into the report
fn apply_domain_info(report: &mut DomainReport, text: &str) -> Result<(), AdcliError> {
    let document = parse_ini(text)?;
    for (section, entries) in document {
        let section = normalize_name(&section);
        let target = report.section_mut(&section);
        for (key, value) in entries {
            let key = normalize_name(&key);
            match (section.as_str(), key.as_str()) {
                ("domain", "domain_name") => {
                    target.insert("domain_realm".to_string(), value.to_uppercase().into());
                    target.insert(key, value.into());
                }
                ("domain", "domain_controller_flags") => {
                    let flags: Vec<String> = value.split_whitespace().map(str::to_string).collect();
                    target.insert(key, flags.into());
                }
                _ => {
                    target.insert(key, value.into());
                }
            }
        }
    }
    Ok(())
}

/// Merges `show-computer` attributes into the computer section
fn apply_computer_info(report: &mut DomainReport, text: &str, now: DateTime<Utc>) {
    for attribute in parse_computer_info(text) {
        let computer = &mut report.computer;
        match attribute.name.as_str() {
            SERVICE_PRINCIPAL_NAME => {
                computer.insert(attribute.name, attribute.values.into());
            }
            PWD_LAST_SET => {
                let raw = attribute.values.last().cloned().unwrap_or_default();
                for field in DERIVED_PWD_FIELDS {
                    computer.remove(field);
                }
                match parse_filetime(&raw).and_then(filetime_to_datetime) {
                    Ok(date_time) => {
                        let age = (now - date_time).num_seconds();
                        computer.insert(
                            "pwdLastSetUnix".to_string(),
                            date_time.timestamp().to_string().into(),
                        );
                        computer.insert(
                            "pwdLastSetDateTime".to_string(),
                            format_datetime(&date_time).into(),
                        );
                        computer.insert(
                            "computer_account_pwd_age".to_string(),
                            format_age(age).into(),
                        );
                    }
                    Err(e) => debug!("pwdLastSet not converted: {e}"),
                }
                computer.insert(attribute.name, raw.into());
            }
            _ => {
                let value = attribute.values.last().cloned().unwrap_or_default();
                computer.insert(attribute.name, FactValue::Text(value));
            }
        }
    }
}
