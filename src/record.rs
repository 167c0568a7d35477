//! Event metadata extracted from an EventSource class

use serde::{Deserialize, Serialize};

/// Level used when an `[Event]` attribute does not name one
pub const DEFAULT_LEVEL: &str = "Informational";

/// One documented event (one CSV row)
///
/// Field order is the column order of the generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    pub event_id: i32,
    pub event_name: String,
    pub level: String,
    pub keywords: String,
    pub opcode: String,
    pub task: String,
    pub channel: String,
    pub version: String,
    pub message: String,
    pub parameters: String,
}

impl EventRecord {
    /// Record with the given id and name, everything else at defaults
    pub fn new(event_id: i32, event_name: impl Into<String>) -> Self {
        Self {
            event_id,
            event_name: event_name.into(),
            level: DEFAULT_LEVEL.to_string(),
            keywords: String::new(),
            opcode: String::new(),
            task: String::new(),
            channel: String::new(),
            version: String::new(),
            message: String::new(),
            parameters: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Stable ascending sort by event id (ties keep discovery order)
pub fn sort_by_event_id(records: &mut [EventRecord]) {
    records.sort_by_key(|r| r.event_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_informational() {
        let record = EventRecord::new(3, "Stop");
        assert_eq!(record.level, "Informational");
        assert!(record.keywords.is_empty());
    }

    #[test]
    fn sort_keeps_discovery_order_for_equal_ids() {
        let mut records = vec![
            EventRecord::new(2, "Start"),
            EventRecord::new(1, "First"),
            EventRecord::new(1, "Second"),
        ];
        sort_by_event_id(&mut records);

        let names: Vec<_> = records.iter().map(|r| r.event_name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Start"]);
    }
}
