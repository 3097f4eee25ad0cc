use std::fmt;
use std::path::Path;

/// A program invocation as an argument vector, never a shell string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Written to the child's standard input, then closed
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().display().to_string(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends `--name=value` when a value is given
    pub fn option(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.arg(format!("--{name}={value}")),
            None => self,
        }
    }

    /// Appends `--name` when `enabled`
    pub fn flag(self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.arg(format!("--{name}"))
        } else {
            self
        }
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

/// Display form for logs, stdin content is never shown
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if self.stdin.is_some() {
            write!(f, " <stdin>")?;
        }
        Ok(())
    }
}

/// The commands the collector issues
pub struct AdcliCommand;

impl AdcliCommand {
    /// `adcli testjoin`, exit status tells whether the host is joined
    pub fn testjoin(adcli: &Path) -> CommandSpec {
        CommandSpec::new(adcli).arg("testjoin")
    }

    /// `adcli info <domain>`, INI text on stdout
    pub fn info(adcli: &Path, domain: &str) -> CommandSpec {
        CommandSpec::new(adcli).arg("info").arg(domain)
    }

    /// `adcli show-computer` authenticated with the computer account's ticket cache
    pub fn show_computer(adcli: &Path) -> CommandSpec {
        CommandSpec::new(adcli)
            .arg("show-computer")
            .arg("--login-ccache")
            .arg("--login-type=computer")
    }

    /// `kinit -k -t <keytab> <account>`
    pub fn kinit(kinit: &Path, keytab: &Path, computer_account: &str) -> CommandSpec {
        CommandSpec::new(kinit)
            .arg("-k")
            .arg("-t")
            .arg(keytab.display().to_string())
            .arg(computer_account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn kinit() {
        let cmd = AdcliCommand::kinit(
            &PathBuf::from("kinit"),
            &PathBuf::from("/etc/krb5.keytab"),
            "EXAMPLEHOST$",
        );
        assert_eq!(cmd.program, "kinit");
        assert_eq!(cmd.args, ["-k", "-t", "/etc/krb5.keytab", "EXAMPLEHOST$"]);
        assert_eq!(cmd.stdin, None);
    }

    #[test]
    fn account_is_a_single_argument() {
        let cmd = AdcliCommand::info(&PathBuf::from("adcli"), "example.org; rm -rf /");
        assert_eq!(cmd.args, ["info", "example.org; rm -rf /"]);
    }

    #[test]
    fn show_computer() {
        let cmd = AdcliCommand::show_computer(&PathBuf::from("/usr/sbin/adcli"));
        assert_eq!(
            cmd.to_string(),
            "/usr/sbin/adcli show-computer --login-ccache --login-type=computer"
        );
    }

    #[test]
    fn options_and_stdin() {
        let cmd = CommandSpec::new("adcli")
            .arg("join")
            .option("domain", Some("example.org"))
            .option("domain-ou", None)
            .flag("stdin-password", true)
            .flag("verbose", false)
            .stdin("secret");
        assert_eq!(cmd.args, ["join", "--domain=example.org", "--stdin-password"]);
        assert_eq!(cmd.to_string(), "adcli join --domain=example.org --stdin-password <stdin>");
    }
}
