use std::collections::BTreeMap;

use serde::Serialize;

/// A single fact, either one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Text(String),
    List(Vec<String>),
}

impl FactValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(text) => Some(text),
            FactValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FactValue::Text(_) => None,
            FactValue::List(list) => Some(list),
        }
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

impl From<Vec<String>> for FactValue {
    fn from(value: Vec<String>) -> Self {
        FactValue::List(value)
    }
}

pub type FactSection = BTreeMap<String, FactValue>;

/// Domain membership state of the host as seen through adcli
///
/// Serializes to
/// ```json
/// {
///   "computer": { "computer_name": "EXAMPLEHOST", "computer_joined": "true", ... },
///   "domain": { "domain_name": "example.org", "domain_realm": "EXAMPLE.ORG", ... },
///   "<other adcli info section>": { ... },
///   "error": "only present after a fatal parse failure"
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub computer: FactSection,
    pub domain: FactSection,
    /// Further `adcli info` sections
    #[serde(flatten)]
    pub sections: BTreeMap<String, FactSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainReport {
    /// Section by normalized name, `computer` and `domain` resolve to the fixed maps
    pub fn section_mut(&mut self, name: &str) -> &mut FactSection {
        match name {
            "computer" => &mut self.computer,
            "domain" => &mut self.domain,
            _ => self.sections.entry(name.to_string()).or_default(),
        }
    }

    pub fn section(&self, name: &str) -> Option<&FactSection> {
        match name {
            "computer" => Some(&self.computer),
            "domain" => Some(&self.domain),
            _ => self.sections.get(name),
        }
    }

    pub fn computer_text(&self, key: &str) -> Option<&str> {
        self.computer.get(key).and_then(FactValue::as_text)
    }

    pub fn domain_text(&self, key: &str) -> Option<&str> {
        self.domain.get(key).and_then(FactValue::as_text)
    }
}
