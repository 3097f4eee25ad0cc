//! Commands that bring a computer account into a desired state.
//!
//! Each [`ComputerPlan`] pairs the adcli command with a guard command, so a
//! caller can skip work that is already done. Passwords are passed on stdin
//! together with `--stdin-password`, never as arguments.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::{
    arguments::{ComputerArguments, DomainArguments},
    command::CommandSpec,
    error::{AdcliError, ConversionError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputerEnsure {
    /// Account exists in the directory, the host itself is not joined
    Preset,
    Joined,
    /// Attributes of an already joined account are brought up to date
    Updated,
    /// Account password is reset, the host has to join again
    Reset,
    Deleted,
}

impl From<ComputerEnsure> for &str {
    fn from(value: ComputerEnsure) -> Self {
        match value {
            ComputerEnsure::Preset => "preset",
            ComputerEnsure::Joined => "joined",
            ComputerEnsure::Updated => "updated",
            ComputerEnsure::Reset => "reset",
            ComputerEnsure::Deleted => "deleted",
        }
    }
}

impl FromStr for ComputerEnsure {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preset" => Ok(ComputerEnsure::Preset),
            "joined" => Ok(ComputerEnsure::Joined),
            "updated" => Ok(ComputerEnsure::Updated),
            "reset" => Ok(ComputerEnsure::Reset),
            "deleted" => Ok(ComputerEnsure::Deleted),
            _ => Err(ConversionError::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Skip the command when the guard exits successfully
    Unless(CommandSpec),
    /// Run the command only when the guard exits successfully
    OnlyIf(CommandSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerPlan {
    pub command: CommandSpec,
    pub guard: Guard,
}

/// Builds the plan for `ensure`
///
/// # Errors
/// `preset` needs a password. `joined` needs a password, a one time password
/// or a login ccache. `updated`, `reset` and `deleted` need a password or a
/// login ccache.
pub fn computer_plan(
    adcli: &Path,
    ensure: ComputerEnsure,
    domain: &DomainArguments,
    computer: &ComputerArguments,
) -> Result<ComputerPlan, AdcliError> {
    check_credentials(ensure, domain)?;

    let exists = with_password(
        CommandSpec::new(adcli)
            .arg("show-computer")
            .args(domain.connection_args().iter().cloned()),
        domain,
    )
    .arg(domain.computer_name.clone());
    let testjoin = CommandSpec::new(adcli)
        .arg("testjoin")
        .option("domain", Some(domain.domain.as_str()))
        .option("host-keytab", Some(domain.host_keytab.as_str()));

    let plan = match ensure {
        ComputerEnsure::Preset => {
            let command = CommandSpec::new(adcli)
                .arg("preset-computer")
                .args(domain.connection_args().iter().cloned())
                .args(domain.join_args().iter().cloned())
                .args(computer.adcli_args().iter().cloned());
            ComputerPlan {
                command: with_password(command, domain).arg(domain.computer_name.clone()),
                guard: Guard::Unless(exists),
            }
        }
        ComputerEnsure::Joined => {
            let command = CommandSpec::new(adcli)
                .arg("join")
                .args(domain.connection_args().iter().cloned())
                .args(domain.join_args().iter().cloned())
                .args(computer.adcli_args().iter().cloned());
            ComputerPlan {
                command: with_password(command, domain),
                guard: Guard::Unless(testjoin),
            }
        }
        ComputerEnsure::Updated => ComputerPlan {
            command: CommandSpec::new(adcli)
                .arg("update")
                .args(domain.update_args())
                .args(computer.adcli_args().iter().cloned()),
            guard: Guard::OnlyIf(testjoin),
        },
        ComputerEnsure::Reset | ComputerEnsure::Deleted => {
            let subcommand = if ensure == ComputerEnsure::Reset {
                "reset-computer"
            } else {
                "delete-computer"
            };
            let command = with_password(
                CommandSpec::new(adcli)
                    .arg(subcommand)
                    .args(domain.connection_args().iter().cloned()),
                domain,
            )
            .arg(domain.computer_name.clone());
            ComputerPlan {
                command,
                guard: Guard::OnlyIf(exists),
            }
        }
    };
    Ok(plan)
}

fn check_credentials(ensure: ComputerEnsure, domain: &DomainArguments) -> Result<(), AdcliError> {
    let password = domain.password.is_some();
    let ccache = domain.login_ccache.is_some();
    let (satisfied, required) = match ensure {
        ComputerEnsure::Preset => (password, "password"),
        ComputerEnsure::Joined => (
            password || ccache || domain.one_time_password.is_some(),
            "either password or one_time_password or login_ccache",
        ),
        ComputerEnsure::Updated | ComputerEnsure::Reset | ComputerEnsure::Deleted => {
            (password || ccache, "either password or login_ccache")
        }
    };
    if satisfied {
        return Ok(());
    }
    Err(AdcliError::MissingCredential(format!(
        "You must specify {required} to ensure {}",
        <&str>::from(ensure)
    )))
}

fn with_password(command: CommandSpec, domain: &DomainArguments) -> CommandSpec {
    match &domain.password {
        Some(password) => command.flag("stdin-password", true).stdin(password.clone()),
        None => command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arguments::ComputerParams, arguments::DomainParams, facts::HostFacts};
    use rstest::rstest;

    fn arguments(params: DomainParams) -> (DomainArguments, ComputerArguments) {
        let facts = HostFacts::new("example.org", "examplehost").with_os("RedHat", "9", "4");
        (
            DomainArguments::compose(&params, &facts),
            ComputerArguments::compose(&ComputerParams::default(), &facts),
        )
    }

    fn password() -> DomainParams {
        DomainParams {
            login_user: Some("admin".to_string()),
            password: Some("very_strong_password_placeholder".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn preset() {
        let (domain, computer) = arguments(password());
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Preset, &domain, &computer)
            .expect("password given");

        assert_eq!(
            plan.command.args,
            ["preset-computer", "--login-user=admin", "--stdin-password", "EXAMPLEHOST"]
        );
        assert_eq!(
            plan.command.stdin.as_deref(),
            Some("very_strong_password_placeholder")
        );
        assert!(!plan.command.to_string().contains("placeholder"));
        let Guard::Unless(guard) = plan.guard else {
            panic!("preset is guarded by unless");
        };
        assert_eq!(
            guard.args,
            ["show-computer", "--login-user=admin", "--stdin-password", "EXAMPLEHOST"]
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn preset_without_password(#[case] password: Option<&str>) {
        let (domain, computer) = arguments(DomainParams {
            password: password.map(str::to_string),
            ..Default::default()
        });
        let err = computer_plan(Path::new("adcli"), ComputerEnsure::Preset, &domain, &computer)
            .expect_err("password missing");
        assert_eq!(err.to_string(), "You must specify password to ensure preset");
    }

    #[test]
    fn joined_with_one_time_password() {
        let (domain, computer) = arguments(DomainParams {
            one_time_password: Some("very_strong_one_time_password_placeholder".to_string()),
            ..Default::default()
        });
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Joined, &domain, &computer)
            .expect("one time password given");

        assert_eq!(
            plan.command.args,
            ["join", "--one-time-password=very_strong_one_time_password_placeholder"]
        );
        assert_eq!(plan.command.stdin, None);
        assert_eq!(
            plan.guard,
            Guard::Unless(
                CommandSpec::new("adcli")
                    .arg("testjoin")
                    .arg("--domain=example.org")
                    .arg("--host-keytab=/etc/krb5.keytab")
            )
        );
    }

    #[test]
    fn joined_with_ccache() {
        let (domain, computer) = arguments(DomainParams {
            login_ccache: Some("KEYRING:persistent:%{uid}".to_string()),
            ..Default::default()
        });
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Joined, &domain, &computer)
            .expect("ccache given");
        assert_eq!(plan.command.args, ["join", "--login-ccache=KEYRING:persistent:%{uid}"]);
    }

    #[rstest]
    #[case(DomainParams::default())]
    #[case(DomainParams {
        password: Some(String::new()),
        one_time_password: Some(String::new()),
        login_ccache: Some(String::new()),
        ..Default::default()
    })]
    fn joined_without_credentials(#[case] params: DomainParams) {
        let (domain, computer) = arguments(params);
        let err = computer_plan(Path::new("adcli"), ComputerEnsure::Joined, &domain, &computer)
            .expect_err("no credential");
        assert_eq!(
            err.to_string(),
            "You must specify either password or one_time_password or login_ccache to ensure joined"
        );
    }

    #[test]
    fn updated() {
        let (domain, computer) = arguments(DomainParams {
            domain: Some("example.org".to_string()),
            login_user: Some("admin".to_string()),
            login_ccache: Some("KEYRING:persistent:%{uid}".to_string()),
            computer_name: Some("WWW".to_string()),
            ..Default::default()
        });
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Updated, &domain, &computer)
            .expect("ccache given");
        assert_eq!(
            plan.command.args,
            ["update", "--domain=example.org", "--computer-name=WWW"]
        );
        assert_eq!(plan.command.stdin, None);
        assert_eq!(
            plan.guard,
            Guard::OnlyIf(
                CommandSpec::new("adcli")
                    .arg("testjoin")
                    .arg("--domain=example.org")
                    .arg("--host-keytab=/etc/krb5.keytab")
            )
        );
    }

    #[test]
    fn reset() {
        let (domain, computer) = arguments(password());
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Reset, &domain, &computer)
            .expect("password given");
        assert_eq!(
            plan.command.args,
            ["reset-computer", "--login-user=admin", "--stdin-password", "EXAMPLEHOST"]
        );
        assert_eq!(
            plan.command.stdin.as_deref(),
            Some("very_strong_password_placeholder")
        );
        assert!(matches!(plan.guard, Guard::OnlyIf(ref guard) if guard.args[0] == "show-computer"));
    }

    #[test]
    fn deleted() {
        let (domain, computer) = arguments(password());
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Deleted, &domain, &computer)
            .expect("password given");
        assert_eq!(
            plan.command.args,
            ["delete-computer", "--login-user=admin", "--stdin-password", "EXAMPLEHOST"]
        );
        let Guard::OnlyIf(guard) = plan.guard else {
            panic!("deleted is guarded by onlyif");
        };
        assert_eq!(
            guard.args,
            ["show-computer", "--login-user=admin", "--stdin-password", "EXAMPLEHOST"]
        );
    }

    #[test]
    fn deleted_with_ccache() {
        let (domain, computer) = arguments(DomainParams {
            login_ccache: Some("FILE:/tmp/krb5cc_0".to_string()),
            ..Default::default()
        });
        let plan = computer_plan(Path::new("adcli"), ComputerEnsure::Deleted, &domain, &computer)
            .expect("ccache given");
        assert_eq!(
            plan.command.args,
            ["delete-computer", "--login-ccache=FILE:/tmp/krb5cc_0", "EXAMPLEHOST"]
        );
        assert_eq!(plan.command.stdin, None);
    }

    #[rstest]
    #[case(ComputerEnsure::Updated, None)]
    #[case(ComputerEnsure::Updated, Some(""))]
    #[case(ComputerEnsure::Reset, None)]
    #[case(ComputerEnsure::Reset, Some(""))]
    #[case(ComputerEnsure::Deleted, None)]
    #[case(ComputerEnsure::Deleted, Some(" "))]
    fn password_or_ccache_required(#[case] ensure: ComputerEnsure, #[case] credential: Option<&str>) {
        let (domain, computer) = arguments(DomainParams {
            password: credential.map(str::to_string),
            login_ccache: credential.map(str::to_string),
            one_time_password: Some("very_strong_one_time_password_placeholder".to_string()),
            ..Default::default()
        });
        let err = computer_plan(Path::new("adcli"), ensure, &domain, &computer)
            .expect_err("no password or ccache");
        assert_eq!(
            err.to_string(),
            format!(
                "You must specify either password or login_ccache to ensure {}",
                <&str>::from(ensure)
            )
        );
    }

    #[test]
    fn deleted_message() {
        let (domain, computer) = arguments(DomainParams::default());
        let err = computer_plan(Path::new("adcli"), ComputerEnsure::Deleted, &domain, &computer)
            .expect_err("no credential");
        assert_eq!(
            err.to_string(),
            "You must specify either password or login_ccache to ensure deleted"
        );
    }

    #[rstest]
    #[case("preset", Some(ComputerEnsure::Preset))]
    #[case("joined", Some(ComputerEnsure::Joined))]
    #[case("updated", Some(ComputerEnsure::Updated))]
    #[case("reset", Some(ComputerEnsure::Reset))]
    #[case("deleted", Some(ComputerEnsure::Deleted))]
    #[case("absent", None)]
    #[case("present", None)]
    fn ensure(#[case] input: &str, #[case] expected: Option<ComputerEnsure>) {
        assert_eq!(input.parse::<ComputerEnsure>().ok(), expected);
        if let Some(ensure) = expected {
            assert_eq!(<&str>::from(ensure), input);
        }
    }
}
