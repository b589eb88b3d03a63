//! Query options applied to every submitted query.
//!
//! Options are a fixed set of recognised names, each holding a string value. Values are
//! never validated here; they are handed to the service verbatim as `NAME=value`.
use std::{collections::BTreeMap, fmt};

use log::debug;

use crate::error::OptionError;

const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("ABORT_ON_ERROR", "false"),
    ("MAX_ERRORS", "0"),
    ("DISABLE_CODEGEN", "false"),
    ("BATCH_SIZE", "0"),
    ("NUM_NODES", "0"),
    ("MAX_SCAN_RANGE_LENGTH", "0"),
    ("NUM_SCANNER_THREADS", "0"),
    ("MAX_IO_BUFFERS", "0"),
    ("ALLOW_UNSUPPORTED_FORMATS", "false"),
    ("DEFAULT_ORDER_BY_LIMIT", "-1"),
    ("DEBUG_ACTION", ""),
    ("MEM_LIMIT", "0"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    values: BTreeMap<String, String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        let values = DEFAULT_OPTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { values }
    }
}

impl QueryOptions {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Sets a recognised option. Names are case-insensitive and stored upper-case.
    pub fn set(&mut self, name: &str, value: &str) -> Result<String, OptionError> {
        let name = name.trim().to_uppercase();
        match self.values.get_mut(&name) {
            Some(slot) => {
                debug!("option {name} set to '{value}'");
                *slot = value.to_string();
                Ok(name)
            }
            None => Err(OptionError::Unknown {
                available: self.values.keys().cloned().collect::<Vec<_>>().join("\n\t"),
                name,
            }),
        }
    }

    /// Parses and applies a `NAME=value` assignment.
    pub fn assign(&mut self, assignment: &str) -> Result<String, OptionError> {
        match assignment.split('=').collect::<Vec<&str>>().as_slice() {
            [name, value] => {
                let name = self.set(name, value)?;
                Ok(format!("{name} set to {value}"))
            }
            _ => Err(OptionError::Malformed),
        }
    }

    /// Options in the `NAME=value` form submitted with each query.
    pub fn configuration(&self) -> Vec<String> {
        self.values.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

impl fmt::Display for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .values
            .iter()
            .map(|(k, v)| format!("\t{k}: {v}"))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}
