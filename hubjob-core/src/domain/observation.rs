//! Device observation types
//!
//! The hub records the last events reported by a device under namespaced
//! keys such as `notify./3/0/13`, `write.temperature` or `exec.reboot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Namespace of a device-reported event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    /// Resource value change notification
    Notify,
    /// Acknowledged property write
    Write,
    /// Executed command
    Exec,
    /// Property read response
    Read,
}

impl ObservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationKind::Notify => "notify",
            ObservationKind::Write => "write",
            ObservationKind::Exec => "exec",
            ObservationKind::Read => "read",
        }
    }
}

impl std::fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespaced observation key, `<kind>.<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    pub kind: ObservationKind,
    pub name: String,
}

impl ObservationKey {
    pub fn new(kind: ObservationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn notify(resource_path: impl Into<String>) -> Self {
        Self::new(ObservationKind::Notify, resource_path)
    }

    pub fn write(property: impl Into<String>) -> Self {
        Self::new(ObservationKind::Write, property)
    }

    pub fn exec(command: impl Into<String>) -> Self {
        Self::new(ObservationKind::Exec, command)
    }

    pub fn read(property: impl Into<String>) -> Self {
        Self::new(ObservationKind::Read, property)
    }
}

impl std::fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

/// Error returned when a string is not a valid observation key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError(pub String);

impl std::fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid observation key: {}", self.0)
    }
}

impl std::error::Error for ParseKeyError {}

impl FromStr for ObservationKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Resource paths contain dots and slashes, so only the first dot separates
        let (kind, name) = s.split_once('.').ok_or_else(|| ParseKeyError(s.to_string()))?;
        if name.is_empty() {
            return Err(ParseKeyError(s.to_string()));
        }

        let kind = match kind {
            "notify" => ObservationKind::Notify,
            "write" => ObservationKind::Write,
            "exec" => ObservationKind::Exec,
            "read" => ObservationKind::Read,
            _ => return Err(ParseKeyError(s.to_string())),
        };

        Ok(Self::new(kind, name))
    }
}

/// An event reported by a device and recorded by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedEvent {
    /// Namespaced key, e.g. `write.temperature`
    pub key: String,
    pub target_id: String,
    pub value: serde_json::Value,
    pub observed_at: DateTime<Utc>,
}

impl ObservedEvent {
    pub fn new(key: &ObservationKey, target_id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.to_string(),
            target_id: target_id.into(),
            value,
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(ObservationKey::notify("/3/0/13").to_string(), "notify./3/0/13");
        assert_eq!(ObservationKey::write("temperature").to_string(), "write.temperature");
        assert_eq!(ObservationKey::exec("reboot").to_string(), "exec.reboot");
    }

    #[test]
    fn test_key_parse_splits_on_first_dot() {
        let key: ObservationKey = "notify.fw.version".parse().unwrap();
        assert_eq!(key.kind, ObservationKind::Notify);
        assert_eq!(key.name, "fw.version");
    }

    #[test]
    fn test_key_parse_rejects_unknown_namespace() {
        assert!("telemetry.temp".parse::<ObservationKey>().is_err());
        assert!("write.".parse::<ObservationKey>().is_err());
        assert!("reboot".parse::<ObservationKey>().is_err());
    }
}
