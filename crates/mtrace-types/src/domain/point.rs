use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event type of a trace point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointType {
    #[serde(alias = "entry", alias = "ENTRY")]
    Entry,
    #[serde(alias = "exit", alias = "EXIT")]
    Exit,
    #[serde(alias = "event", alias = "EVENT")]
    Event,
}

impl PointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointType::Entry => "Entry",
            PointType::Exit => "Exit",
            PointType::Event => "Event",
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointType {
    type Err = std::convert::Infallible;

    /// Stored type text is matched case-insensitively; anything that is not
    /// an entry or exit is a plain event.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.eq_ignore_ascii_case("entry") {
            PointType::Entry
        } else if s.eq_ignore_ascii_case("exit") {
            PointType::Exit
        } else {
            PointType::Event
        })
    }
}

/// VM metadata reported by the trace decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInfo {
    /// VM version string
    pub version: String,
    /// Free-form summary of the trace header (multi-line)
    pub summary: String,
}

/// One application thread seen in the trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: i64,
    pub native_id: i64,
    pub name: String,
}

/// One decoded trace point, as handed over by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracePoint {
    pub tp_id: i64,
    pub component: String,
    #[serde(default)]
    pub container_component: String,
    #[serde(default)]
    pub debug_info: String,
    #[serde(default)]
    pub formatted_parameters: String,
    /// Raw parameter values; only the first three are persisted
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub formatted_time: String,
    /// Raw timestamp in monotonic clock units
    pub raw_time: i64,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PointType,
    pub thread_id: i64,
}

/// Point as read back from a session store.
///
/// Text fields are exactly as stored (sanitized); callers desanitize for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRow {
    pub tp_id: i64,
    pub component: String,
    pub formatted_parameters: String,
    pub parameters: String,
    pub raw_time: i64,
    pub kind: PointType,
    pub thread_id: i64,
}

impl PointRow {
    /// Component comparison used by every scan: trimmed, case-insensitive.
    pub fn is_component(&self, component: &str) -> bool {
        self.component.trim().eq_ignore_ascii_case(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_type_parses_loosely() {
        assert_eq!("Entry".parse::<PointType>().unwrap(), PointType::Entry);
        assert_eq!(" exit ".parse::<PointType>().unwrap(), PointType::Exit);
        assert_eq!("Exception".parse::<PointType>().unwrap(), PointType::Event);
    }

    #[test]
    fn test_trace_point_json_uses_type_key() {
        let json = r#"{"tp_id":1,"component":"mt","raw_time":10,"type":"entry","thread_id":7}"#;
        let point: TracePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.kind, PointType::Entry);
        assert!(point.parameters.is_empty());
        assert_eq!(point.thread_id, 7);
    }
}
