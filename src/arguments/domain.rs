use serde::{Deserialize, Serialize};

use super::{lenient, Fragments, LdapAuthType, LoginType};
use crate::{
    facts::HostFacts,
    helpers::{domain_to_basedn, non_blank, quote},
    settings::DEFAULT_KEYTAB,
};

/// Optional domain connection parameters, `None` or blank means not given
///
/// A value that is not a string counts as not given.
#[derive(Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainParams {
    /// e.g. `example.org`
    #[serde(deserialize_with = "lenient::string")]
    pub domain: Option<String>,
    /// e.g. `EXAMPLE.ORG`
    #[serde(deserialize_with = "lenient::string")]
    pub domain_realm: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub domain_controller: Option<String>,
    /// e.g. `dc=example,dc=org`
    #[serde(deserialize_with = "lenient::string")]
    pub domain_basedn: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub domain_computer_ou: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub domain_user_ou: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub domain_group_ou: Option<String>,
    /// `computer` or `user`
    #[serde(deserialize_with = "lenient::string")]
    pub login_type: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub login_user: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub password: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub login_ccache: Option<String>,
    /// Password set on a preset computer account and used once to join
    #[serde(deserialize_with = "lenient::string")]
    pub one_time_password: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub host_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub host_fqdn: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub host_keytab: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub computer_name: Option<String>,
    /// `insecure`, `tls`, `gss_spnego` or `gssapi`
    #[serde(deserialize_with = "lenient::string")]
    pub ldap_auth_type: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub ldap_binddn: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub ldap_bindpw: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub ldaps_cacert_path: Option<String>,
}

/// Resolved domain parameters with option (`--flag='value'`) and
/// param (`'value'`) fragments
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DomainArguments {
    pub domain: String,
    pub domain_option: String,
    pub domain_param: String,
    pub domain_realm: String,
    pub domain_realm_option: String,
    pub domain_realm_param: String,
    pub domain_controller: Option<String>,
    pub domain_controller_option: String,
    pub domain_controller_param: String,
    pub domain_basedn: String,
    pub domain_basedn_param: String,
    pub domain_computer_ou: String,
    pub domain_computer_ou_option: String,
    pub domain_computer_ou_param: String,
    pub domain_user_ou: String,
    pub domain_user_ou_option: String,
    pub domain_user_ou_param: String,
    pub domain_group_ou: String,
    pub domain_group_ou_option: String,
    pub domain_group_ou_param: String,
    pub login_type: Option<LoginType>,
    pub login_type_option: String,
    pub login_user: Option<String>,
    pub login_user_option: String,
    pub login_user_param: String,
    pub password: Option<String>,
    pub password_param: String,
    /// `echo -n '<password>' |`
    pub stdout_password: String,
    /// `--stdin-password`
    pub stdin_password: String,
    pub login_ccache: Option<String>,
    pub login_ccache_option: String,
    pub login_ccache_param: String,
    pub one_time_password: Option<String>,
    pub one_time_password_option: String,
    pub one_time_password_param: String,
    pub host_name: String,
    pub host_name_param: String,
    pub host_fqdn: String,
    pub host_fqdn_option: String,
    pub host_fqdn_param: String,
    pub host_keytab: String,
    pub host_keytab_option: String,
    pub host_keytab_param: String,
    pub computer_name: String,
    pub computer_name_option: String,
    pub computer_name_param: String,
    pub computer_account: String,
    pub computer_account_param: String,
    pub ldap_auth_type: Option<LdapAuthType>,
    pub ldap_binddn: String,
    pub ldap_bindpw: String,
    pub ldaps_cacert_path: String,
    #[serde(skip)]
    connection_args: Vec<String>,
    #[serde(skip)]
    join_args: Vec<String>,
}

impl std::fmt::Debug for DomainArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainArguments")
            .field("domain", &self.domain)
            .field("domain_realm", &self.domain_realm)
            .field("domain_controller", &self.domain_controller)
            .field("login_type", &self.login_type)
            .field("login_user", &self.login_user)
            .field("host_fqdn", &self.host_fqdn)
            .field("computer_name", &self.computer_name)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for DomainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainParams")
            .field("domain", &self.domain)
            .field("login_type", &self.login_type)
            .field("login_user", &self.login_user)
            .field("host_name", &self.host_name)
            .field("computer_name", &self.computer_name)
            .finish_non_exhaustive()
    }
}

impl DomainArguments {
    /// Resolves every parameter, falling back to the networking facts.
    ///
    /// `domain_group_ou` defaults to `cn=Users,<basedn>` like `domain_user_ou`.
    /// That default is carried over from the adcli Puppet module and is open
    /// for confirmation, pass `domain_group_ou` to be explicit.
    pub fn compose(params: &DomainParams, facts: &HostFacts) -> Self {
        let networking = &facts.networking;
        let mut connection = Fragments::default();
        let mut join = Fragments::default();

        let (domain, domain_option) = resolve(
            &mut connection,
            "domain",
            params.domain.as_deref(),
            || networking.domain.clone(),
        );

        let (domain_realm, domain_realm_option) = match non_blank(params.domain_realm.as_deref()) {
            Some(realm) => (
                realm.to_string(),
                connection.valued("domain-realm", &realm.to_uppercase()),
            ),
            None => (domain.to_uppercase(), String::new()),
        };

        let domain_controller = given(params.domain_controller.as_deref());
        let domain_controller_option = domain_controller
            .as_deref()
            .map(|dc| connection.valued("domain-controller", dc))
            .unwrap_or_default();

        let domain_basedn = non_blank(params.domain_basedn.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| domain_to_basedn(&domain));

        let (domain_computer_ou, domain_computer_ou_option) = resolve(
            &mut join,
            "domain-ou",
            params.domain_computer_ou.as_deref(),
            || format!("cn=Computers,{domain_basedn}"),
        );
        // user and group containers only feed the shell fragments
        let mut unused = Fragments::default();
        let (domain_user_ou, domain_user_ou_option) = resolve(
            &mut unused,
            "domain-ou",
            params.domain_user_ou.as_deref(),
            || format!("cn=Users,{domain_basedn}"),
        );
        let (domain_group_ou, domain_group_ou_option) = resolve(
            &mut unused,
            "domain-ou",
            params.domain_group_ou.as_deref(),
            || format!("cn=Users,{domain_basedn}"),
        );

        let login_type = non_blank(params.login_type.as_deref())
            .and_then(|login_type| login_type.parse::<LoginType>().ok());
        let login_type_option = login_type
            .map(|login_type| connection.valued("login-type", login_type.into()))
            .unwrap_or_default();

        let login_user = given(params.login_user.as_deref());
        let login_user_option = login_user
            .as_deref()
            .map(|user| connection.valued("login-user", user))
            .unwrap_or_default();

        let password = given(params.password.as_deref());
        let (stdout_password, stdin_password) = match &password {
            Some(password) => (
                format!("echo -n {} |", quote(password)),
                "--stdin-password".to_string(),
            ),
            None => (String::new(), String::new()),
        };

        let login_ccache = given(params.login_ccache.as_deref());
        let login_ccache_option = login_ccache
            .as_deref()
            .map(|ccache| connection.valued("login-ccache", ccache))
            .unwrap_or_default();

        let one_time_password = given(params.one_time_password.as_deref());
        let one_time_password_option = one_time_password
            .as_deref()
            .map(|otp| join.valued("one-time-password", otp))
            .unwrap_or_default();

        let host_name = non_blank(params.host_name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| networking.hostname.clone());

        let (host_fqdn, host_fqdn_option) = resolve(
            &mut join,
            "host-fqdn",
            params.host_fqdn.as_deref(),
            || networking.fqdn.clone(),
        );
        let (host_keytab, host_keytab_option) = resolve(
            &mut join,
            "host-keytab",
            params.host_keytab.as_deref(),
            || DEFAULT_KEYTAB.to_string(),
        );
        let (computer_name, computer_name_option) = resolve(
            &mut join,
            "computer-name",
            params.computer_name.as_deref(),
            || host_name.to_uppercase(),
        );
        let computer_account = format!("{computer_name}$");

        let ldap_auth_type = params
            .ldap_auth_type
            .as_deref()
            .and_then(|auth_type| auth_type.parse::<LdapAuthType>().ok());
        let ldap_setting = |value: &Option<String>| match ldap_auth_type {
            Some(_) => value.clone().filter(|v| !v.is_empty()).unwrap_or_default(),
            None => String::new(),
        };

        Self {
            domain_param: quote(&domain),
            domain_realm_param: quote(&domain_realm),
            domain_controller_param: domain_controller.as_deref().map(quote).unwrap_or_default(),
            domain_basedn_param: quote(&domain_basedn),
            domain_computer_ou_param: quote(&domain_computer_ou),
            domain_user_ou_param: quote(&domain_user_ou),
            domain_group_ou_param: quote(&domain_group_ou),
            login_user_param: login_user.as_deref().map(quote).unwrap_or_default(),
            password_param: password.as_deref().map(quote).unwrap_or_default(),
            login_ccache_param: login_ccache.as_deref().map(quote).unwrap_or_default(),
            one_time_password_param: one_time_password.as_deref().map(quote).unwrap_or_default(),
            host_name_param: quote(&host_name),
            host_fqdn_param: quote(&host_fqdn),
            host_keytab_param: quote(&host_keytab),
            computer_name_param: quote(&computer_name),
            computer_account_param: quote(&computer_account),
            ldap_binddn: ldap_setting(&params.ldap_binddn),
            ldap_bindpw: ldap_setting(&params.ldap_bindpw),
            ldaps_cacert_path: ldap_setting(&params.ldaps_cacert_path),
            domain,
            domain_option,
            domain_realm,
            domain_realm_option,
            domain_controller,
            domain_controller_option,
            domain_basedn,
            domain_computer_ou,
            domain_computer_ou_option,
            domain_user_ou,
            domain_user_ou_option,
            domain_group_ou,
            domain_group_ou_option,
            login_type,
            login_type_option,
            login_user,
            login_user_option,
            password,
            stdout_password,
            stdin_password,
            login_ccache,
            login_ccache_option,
            one_time_password,
            one_time_password_option,
            host_name,
            host_fqdn,
            host_fqdn_option,
            host_keytab,
            host_keytab_option,
            computer_name,
            computer_name_option,
            computer_account,
            ldap_auth_type,
            connection_args: connection.into_args(),
            join_args: join.into_args(),
        }
    }

    /// Given domain, realm, controller and login options, unquoted
    pub fn connection_args(&self) -> &[String] {
        &self.connection_args
    }

    /// Given computer ou, host, keytab, computer name and one time password options, unquoted
    pub fn join_args(&self) -> &[String] {
        &self.join_args
    }

    /// The given options `adcli update` accepts: domain, realm, controller,
    /// host fqdn, keytab and computer name
    pub fn update_args(&self) -> Vec<String> {
        const UPDATE_FLAGS: [&str; 6] = [
            "--domain=",
            "--domain-realm=",
            "--domain-controller=",
            "--host-fqdn=",
            "--host-keytab=",
            "--computer-name=",
        ];
        self.connection_args
            .iter()
            .chain(&self.join_args)
            .filter(|arg| UPDATE_FLAGS.iter().any(|flag| arg.starts_with(flag)))
            .cloned()
            .collect()
    }
}

fn given(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

fn resolve(
    fragments: &mut Fragments,
    flag: &str,
    value: Option<&str>,
    default: impl FnOnce() -> String,
) -> (String, String) {
    match non_blank(value) {
        Some(value) => (value.to_string(), fragments.valued(flag, value)),
        None => (default(), String::new()),
    }
}
