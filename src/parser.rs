//! Parsers for the text adcli prints.
//!
//! `adcli info` prints INI sections:
//! ```plain
//! [domain]
//! domain-name = example.org
//! domain-controller-flags = gc ldap ds kdc
//! [computer]
//! computer-site = Default-First-Site-Name
//! ```
//! `adcli show-computer` prints each attribute name on its own line followed
//! by one indented line per value:
//! ```plain
//! sAMAccountName:
//!  EXAMPLEHOST$
//! servicePrincipalName:
//!  HOST/examplehost
//!  HOST/examplehost.example.org
//! ```

use std::collections::BTreeMap;

use crate::error::ParseError;

/// Section name used for keys that appear before the first section header
pub const GLOBAL_SECTION: &str = "global";

pub type IniSection = BTreeMap<String, String>;
pub type IniDocument = BTreeMap<String, IniSection>;

/// Parses INI text into section → key → value.
///
/// Blank lines and lines starting with `;` or `#` are skipped. Keys and values
/// are trimmed, surrounding double quotes are removed from values and a
/// repeated key keeps the last value. Section and key names are returned
/// as written, see [`normalize_name()`].
///
/// # Errors
/// Will `Err()` on an unterminated `[section` header or a line that is neither
/// a header nor a `key = value` pair
pub fn parse_ini(text: &str) -> Result<IniDocument, ParseError> {
    let mut document = IniDocument::new();
    let mut section = GLOBAL_SECTION.to_string();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(ParseError::MissingSectionEnd {
                    line: idx + 1,
                    text: raw.to_string(),
                });
            };
            section = name.trim().to_string();
            document.entry(section.clone()).or_default();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseError::InvalidLine {
                line: idx + 1,
                text: raw.to_string(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidLine {
                line: idx + 1,
                text: raw.to_string(),
            });
        }
        document
            .entry(section.clone())
            .or_default()
            .insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(document)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// `domain-controller-flags ` becomes `domain_controller_flags`
pub fn normalize_name(name: &str) -> String {
    name.trim().replace('-', "_")
}

/// One attribute of the `show-computer` output and its value lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerAttribute {
    pub name: String,
    pub values: Vec<String>,
}

/// Splits `show-computer` text into attributes in order of appearance.
///
/// A line consisting only of word characters followed by `:` starts a new
/// attribute. Every other non-blank line is one trimmed value of the current
/// attribute. Value lines before the first header have no owner and are dropped.
pub fn parse_computer_info(text: &str) -> Vec<ComputerAttribute> {
    let mut attributes: Vec<ComputerAttribute> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(name) = attribute_header(line) {
            attributes.push(ComputerAttribute {
                name: name.to_string(),
                values: Vec::new(),
            });
            continue;
        }
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        if let Some(current) = attributes.last_mut() {
            current.values.push(value.to_string());
        }
    }
    attributes
}

fn attribute_header(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?;
    let is_word = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_word.then_some(name)
}
