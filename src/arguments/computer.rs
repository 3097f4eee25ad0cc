use serde::{Deserialize, Serialize};

use super::{lenient, Fragments};
use crate::{facts::HostFacts, helpers::non_blank};

/// `--computer-password-lifetime` in days, accepted as number or as a string
/// holding a non-negative decimal number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordLifetime {
    Days(u64),
    Text(String),
}

impl PasswordLifetime {
    fn resolve(&self) -> Option<String> {
        match self {
            PasswordLifetime::Days(days) => Some(days.to_string()),
            PasswordLifetime::Text(text) => {
                let days = text.trim();
                days.parse::<u64>().ok().map(|_| days.to_string())
            }
        }
    }
}

/// Optional computer object attributes, `None`/blank/empty means not given
///
/// A value of the wrong type in a parameter file counts as not given.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComputerParams {
    #[serde(deserialize_with = "lenient::string")]
    pub os_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub os_version: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub os_service_pack: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    /// Preset the default user principal `host/<fqdn>@<REALM>`
    #[serde(deserialize_with = "lenient::boolean")]
    pub preset_user_principal: Option<bool>,
    #[serde(deserialize_with = "lenient::string")]
    pub user_principal: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub service_names: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub service_principals: Vec<String>,
    /// `name=value` attributes set on the computer object
    #[serde(deserialize_with = "lenient::list")]
    pub attributes: Vec<String>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub trusted_for_delegation: Option<bool>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub dont_expire_password: Option<bool>,
    #[serde(deserialize_with = "lenient::lifetime")]
    pub computer_password_lifetime: Option<PasswordLifetime>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub account_disable: Option<bool>,
    #[serde(deserialize_with = "lenient::boolean")]
    pub add_samba_data: Option<bool>,
    #[serde(deserialize_with = "lenient::string")]
    pub samba_data_tool: Option<String>,
}

/// Resolved computer attributes and their adcli option fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputerArguments {
    pub os_name: String,
    pub os_name_option: String,
    pub os_version: String,
    pub os_version_option: String,
    pub os_service_pack: String,
    pub os_service_pack_option: String,
    pub description: String,
    pub description_option: String,
    pub preset_user_principal: bool,
    pub preset_user_principal_option: String,
    pub user_principal: Option<String>,
    pub user_principal_option: String,
    pub service_names: Vec<String>,
    pub service_names_option: String,
    pub service_principals: Vec<String>,
    pub service_principals_option: String,
    pub attributes: Vec<String>,
    pub attributes_option: String,
    pub trusted_for_delegation: bool,
    pub trusted_for_delegation_option: String,
    pub dont_expire_password: bool,
    pub dont_expire_password_option: String,
    pub computer_password_lifetime: String,
    pub computer_password_lifetime_option: String,
    pub account_disable: bool,
    pub account_disable_option: String,
    pub add_samba_data: bool,
    pub add_samba_data_option: String,
    pub samba_data_tool: Option<String>,
    pub samba_data_tool_option: String,
    #[serde(skip)]
    args: Vec<String>,
}

impl ComputerArguments {
    /// OS name, version and service pack default to the OS facts name,
    /// release major and release minor
    pub fn compose(params: &ComputerParams, facts: &HostFacts) -> Self {
        let mut fragments = Fragments::default();

        let (os_name, os_name_option) =
            scalar(&mut fragments, "os-name", params.os_name.as_deref(), &facts.os.name);
        let (os_version, os_version_option) = scalar(
            &mut fragments,
            "os-version",
            params.os_version.as_deref(),
            &facts.os.release.major,
        );
        let (os_service_pack, os_service_pack_option) = scalar(
            &mut fragments,
            "os-service-pack",
            params.os_service_pack.as_deref(),
            &facts.os.release.minor,
        );
        let (description, description_option) =
            scalar(&mut fragments, "description", params.description.as_deref(), "");

        let preset_user_principal = params.preset_user_principal == Some(true);
        let preset_user_principal_option = if preset_user_principal {
            fragments.bare("user-principal")
        } else {
            String::new()
        };

        let user_principal = non_blank(params.user_principal.as_deref()).map(str::to_string);
        let user_principal_option = user_principal
            .as_deref()
            .map(|principal| fragments.valued("user-principal", principal))
            .unwrap_or_default();

        let service_names = given_list(&params.service_names);
        let service_names_option = fragments.repeated("service-name", &service_names);
        let service_principals = given_list(&params.service_principals);
        let service_principals_option =
            fragments.repeated("service-principal", &service_principals);
        let attributes = given_list(&params.attributes);
        let attributes_option = fragments.repeated("setattr", &attributes);

        let (trusted_for_delegation, trusted_for_delegation_option) = switch(
            &mut fragments,
            "trusted-for-delegation",
            params.trusted_for_delegation,
        );
        let (dont_expire_password, dont_expire_password_option) = switch(
            &mut fragments,
            "dont-expire-password",
            params.dont_expire_password,
        );

        let computer_password_lifetime = params
            .computer_password_lifetime
            .as_ref()
            .and_then(PasswordLifetime::resolve);
        let computer_password_lifetime_option = computer_password_lifetime
            .as_deref()
            .map(|days| fragments.valued("computer-password-lifetime", days))
            .unwrap_or_default();

        let (account_disable, account_disable_option) =
            switch(&mut fragments, "account-disable", params.account_disable);

        let add_samba_data = params.add_samba_data == Some(true);
        let add_samba_data_option = if add_samba_data {
            fragments.bare("add-samba-data")
        } else {
            String::new()
        };

        let samba_data_tool = non_blank(params.samba_data_tool.as_deref()).map(str::to_string);
        let samba_data_tool_option = samba_data_tool
            .as_deref()
            .map(|tool| fragments.valued("samba-data-tool", tool))
            .unwrap_or_default();

        Self {
            os_name,
            os_name_option,
            os_version,
            os_version_option,
            os_service_pack,
            os_service_pack_option,
            description,
            description_option,
            preset_user_principal,
            preset_user_principal_option,
            user_principal,
            user_principal_option,
            service_names,
            service_names_option,
            service_principals,
            service_principals_option,
            attributes,
            attributes_option,
            trusted_for_delegation,
            trusted_for_delegation_option,
            dont_expire_password,
            dont_expire_password_option,
            computer_password_lifetime: computer_password_lifetime.unwrap_or_default(),
            computer_password_lifetime_option,
            account_disable,
            account_disable_option,
            add_samba_data,
            add_samba_data_option,
            samba_data_tool,
            samba_data_tool_option,
            args: fragments.into_args(),
        }
    }

    /// Given options as separate arguments, unquoted
    pub fn adcli_args(&self) -> &[String] {
        &self.args
    }
}

fn scalar(
    fragments: &mut Fragments,
    flag: &str,
    value: Option<&str>,
    default: &str,
) -> (String, String) {
    match non_blank(value) {
        Some(value) => (value.to_string(), fragments.valued(flag, value)),
        None => (default.to_string(), String::new()),
    }
}

fn given_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|value| non_blank(Some(value.as_str())).is_some())
        .cloned()
        .collect()
}

fn switch(fragments: &mut Fragments, flag: &str, value: Option<bool>) -> (bool, String) {
    if value == Some(true) {
        (true, fragments.enabled(flag))
    } else {
        (false, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn facts() -> HostFacts {
        HostFacts::new("example.org", "examplehost").with_os("RedHat", "9", "4")
    }

    #[test]
    fn defaults() {
        let args = ComputerArguments::compose(&ComputerParams::default(), &facts());

        assert_eq!(args.os_name, "RedHat");
        assert_eq!(args.os_version, "9");
        assert_eq!(args.os_service_pack, "4");
        assert_eq!(args.description, "");
        assert!(!args.preset_user_principal);
        assert_eq!(args.user_principal, None);
        assert!(args.service_names.is_empty());
        assert!(!args.trusted_for_delegation);
        assert_eq!(args.computer_password_lifetime, "");
        assert_eq!(args.samba_data_tool, None);
        for option in [
            &args.os_name_option,
            &args.os_version_option,
            &args.os_service_pack_option,
            &args.description_option,
            &args.preset_user_principal_option,
            &args.user_principal_option,
            &args.service_names_option,
            &args.service_principals_option,
            &args.attributes_option,
            &args.trusted_for_delegation_option,
            &args.dont_expire_password_option,
            &args.computer_password_lifetime_option,
            &args.account_disable_option,
            &args.add_samba_data_option,
            &args.samba_data_tool_option,
        ] {
            assert_eq!(option, "");
        }
        assert!(args.adcli_args().is_empty());
    }

    #[rstest]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[case(None)]
    fn blank_description(#[case] description: Option<&str>) {
        let params = ComputerParams {
            description: description.map(str::to_string),
            ..Default::default()
        };
        let args = ComputerArguments::compose(&params, &facts());
        assert_eq!(args.description, "");
        assert_eq!(args.description_option, "");
    }

    #[test]
    fn given_values() {
        let params = ComputerParams {
            os_name: Some("Rocky Linux".to_string()),
            os_version: Some("8".to_string()),
            description: Some("web server".to_string()),
            preset_user_principal: Some(true),
            service_names: vec!["HTTP".to_string(), "NFS".to_string()],
            service_principals: vec!["HTTP/www.example.org".to_string()],
            attributes: vec!["department=IT".to_string()],
            trusted_for_delegation: Some(true),
            dont_expire_password: Some(true),
            computer_password_lifetime: Some(PasswordLifetime::Days(30)),
            account_disable: Some(false),
            add_samba_data: Some(true),
            samba_data_tool: Some("/usr/bin/net".to_string()),
            ..Default::default()
        };
        let args = ComputerArguments::compose(&params, &facts());

        assert_eq!(args.os_name_option, "--os-name='Rocky Linux'");
        assert_eq!(args.os_version_option, "--os-version='8'");
        assert_eq!(args.os_service_pack, "4");
        assert_eq!(args.os_service_pack_option, "");
        assert_eq!(args.description_option, "--description='web server'");
        assert_eq!(args.preset_user_principal_option, "--user-principal");
        assert_eq!(args.service_names_option, "--service-name='HTTP' --service-name='NFS'");
        assert_eq!(
            args.service_principals_option,
            "--service-principal='HTTP/www.example.org'"
        );
        assert_eq!(args.attributes_option, "--setattr='department=IT'");
        assert_eq!(args.trusted_for_delegation_option, "--trusted-for-delegation=true");
        assert!(args.dont_expire_password);
        assert_eq!(args.dont_expire_password_option, "--dont-expire-password=true");
        assert_eq!(args.computer_password_lifetime, "30");
        assert_eq!(
            args.computer_password_lifetime_option,
            "--computer-password-lifetime='30'"
        );
        assert!(!args.account_disable);
        assert_eq!(args.account_disable_option, "");
        assert_eq!(args.add_samba_data_option, "--add-samba-data");
        assert_eq!(args.samba_data_tool_option, "--samba-data-tool='/usr/bin/net'");
        assert_eq!(
            args.adcli_args(),
            [
                "--os-name=Rocky Linux",
                "--os-version=8",
                "--description=web server",
                "--user-principal",
                "--service-name=HTTP",
                "--service-name=NFS",
                "--service-principal=HTTP/www.example.org",
                "--setattr=department=IT",
                "--trusted-for-delegation=true",
                "--dont-expire-password=true",
                "--computer-password-lifetime=30",
                "--add-samba-data",
                "--samba-data-tool=/usr/bin/net",
            ]
        );
    }

    #[test]
    fn explicit_user_principal() {
        let params = ComputerParams {
            user_principal: Some("host/examplehost@EXAMPLE.ORG".to_string()),
            ..Default::default()
        };
        let args = ComputerArguments::compose(&params, &facts());
        assert_eq!(args.user_principal.as_deref(), Some("host/examplehost@EXAMPLE.ORG"));
        assert_eq!(
            args.user_principal_option,
            "--user-principal='host/examplehost@EXAMPLE.ORG'"
        );
    }

    #[rstest]
    #[case(r#"{"computer_password_lifetime": 60}"#, "60")]
    #[case(r#"{"computer_password_lifetime": "45"}"#, "45")]
    #[case(r#"{"computer_password_lifetime": " "}"#, "")]
    #[case(r#"{"computer_password_lifetime": null}"#, "")]
    #[case(r#"{"computer_password_lifetime": -1}"#, "")]
    #[case(r#"{"computer_password_lifetime": "-1"}"#, "")]
    #[case(r#"{"computer_password_lifetime": "monthly"}"#, "")]
    #[case(r#"{"computer_password_lifetime": " 90 "}"#, "90")]
    fn password_lifetime(#[case] input: &str, #[case] expected: &str) {
        let params: ComputerParams = serde_json::from_str(input).expect("valid params");
        let args = ComputerArguments::compose(&params, &facts());
        assert_eq!(args.computer_password_lifetime, expected);
    }

    #[rstest]
    #[case(vec![""])]
    #[case(vec!["  ", "\t"])]
    fn blank_list_elements(#[case] values: Vec<&str>) {
        let values: Vec<String> = values.into_iter().map(str::to_string).collect();
        let params = ComputerParams {
            service_names: values.clone(),
            service_principals: values.clone(),
            attributes: values,
            ..Default::default()
        };
        let args = ComputerArguments::compose(&params, &facts());
        assert!(args.service_names.is_empty());
        assert_eq!(args.service_names_option, "");
        assert!(args.service_principals.is_empty());
        assert_eq!(args.service_principals_option, "");
        assert!(args.attributes.is_empty());
        assert_eq!(args.attributes_option, "");
        assert!(args.adcli_args().is_empty());
    }

    #[test]
    fn blank_elements_between_values() {
        let params = ComputerParams {
            service_names: vec!["HTTP".to_string(), " ".to_string(), "NFS".to_string()],
            ..Default::default()
        };
        let args = ComputerArguments::compose(&params, &facts());
        assert_eq!(args.service_names, ["HTTP", "NFS"]);
        assert_eq!(args.service_names_option, "--service-name='HTTP' --service-name='NFS'");
    }

    #[rstest]
    #[case(r#"{"trusted_for_delegation": "yes"}"#)]
    #[case(r#"{"dont_expire_password": 1}"#)]
    #[case(r#"{"account_disable": "true"}"#)]
    #[case(r#"{"add_samba_data": [true]}"#)]
    #[case(r#"{"preset_user_principal": {}}"#)]
    #[case(r#"{"os_name": 5}"#)]
    #[case(r#"{"description": false}"#)]
    #[case(r#"{"user_principal": ["host/x"]}"#)]
    #[case(r#"{"samba_data_tool": 1.5}"#)]
    #[case(r#"{"service_names": "HTTP"}"#)]
    #[case(r#"{"service_principals": {"a": 1}}"#)]
    #[case(r#"{"attributes": [1, null, false]}"#)]
    #[case(r#"{"computer_password_lifetime": true}"#)]
    fn wrong_types_count_as_not_given(#[case] input: &str) {
        let params: ComputerParams = serde_json::from_str(input).expect("lenient params");
        assert_eq!(params, ComputerParams::default());
        let args = ComputerArguments::compose(&params, &facts());
        assert_eq!(args, ComputerArguments::compose(&ComputerParams::default(), &facts()));
        assert!(args.adcli_args().is_empty());
    }

    #[test]
    fn non_string_list_elements_are_dropped() {
        let params: ComputerParams =
            serde_json::from_str(r#"{"service_names": ["HTTP", 5, null, "NFS"], "os_name": "Linux"}"#)
                .expect("lenient params");
        assert_eq!(params.service_names, ["HTTP", "NFS"]);
        assert_eq!(params.os_name.as_deref(), Some("Linux"));
    }

    #[test]
    fn serialized_keys() {
        let args = ComputerArguments::compose(&ComputerParams::default(), &facts());
        let value = serde_json::to_value(&args).expect("serializable");
        assert_eq!(value["os_name"], "RedHat");
        assert_eq!(value["os_name_option"], "");
        assert!(value["user_principal"].is_null());
        assert!(value.get("args").is_none());
    }
}
