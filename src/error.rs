use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdcliError {
    /// Encapsulated INI ParseError
    #[error("could not parse adcli output: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },
    /// Conversion Error
    #[error("{source}")]
    Conversion {
        #[from]
        source: ConversionError,
    },
    /// Running an external program failed
    #[error("{source}")]
    Exec {
        #[from]
        source: ExecError,
    },
    #[error("invalid settings: {source}")]
    Settings {
        #[from]
        source: serde_json::Error,
    },
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
    /// A credential needed for the requested computer state is missing
    #[error("{0}")]
    MissingCredential(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: section header is not terminated: {text}")]
    MissingSectionEnd { line: usize, text: String },
    #[error("line {line}: expected 'key = value': {text}")]
    InvalidLine { line: usize, text: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("not a filetime value: {0}")]
    InvalidFiletime(String),
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
    #[error("unknown value: {0}")]
    UnknownVariant(String),
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("failed to write stdin of {program}: {source}")]
    Stdin { program: String, source: io::Error },
}
