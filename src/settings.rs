use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::Visitor, Deserialize, Deserializer};

use crate::error::AdcliError;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
/// Locations of the external programs the [`Collector`](crate::Collector) runs
pub struct CollectorSettings {
    /// adcli program, a bare name is looked up in `PATH`
    #[serde(deserialize_with = "program_deserializer")]
    pub adcli: PathBuf,
    /// kinit program used for the keytab login retry
    #[serde(deserialize_with = "program_deserializer")]
    pub kinit: PathBuf,
    /// keytab holding the computer account keys
    pub keytab: PathBuf,
}

pub const DEFAULT_KEYTAB: &str = "/etc/krb5.keytab";

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            adcli: PathBuf::from("adcli"),
            kinit: PathBuf::from("kinit"),
            keytab: PathBuf::from(DEFAULT_KEYTAB),
        }
    }
}

impl CollectorSettings {
    pub fn new(
        adcli: impl Into<PathBuf>,
        kinit: impl Into<PathBuf>,
        keytab: impl Into<PathBuf>,
    ) -> Self {
        Self {
            adcli: adcli.into(),
            kinit: kinit.into(),
            keytab: keytab.into(),
        }
    }

    /// Reads settings from a JSON file, missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AdcliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AdcliError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn program_deserializer<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    struct ProgramVisitor;

    impl<'de> Visitor<'de> for ProgramVisitor {
        type Value = PathBuf;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a program name or path without whitespace")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v.is_empty() || v.contains(char::is_whitespace) {
                return Err(serde::de::Error::invalid_value(
                    serde::de::Unexpected::Str(v),
                    &self,
                ));
            }
            Ok(PathBuf::from(v))
        }
    }
    deserializer.deserialize_str(ProgramVisitor)
}
