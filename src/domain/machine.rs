// Machine domain model
use super::status::{classify, ClassificationResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One washer or dryer as reported upstream. Fields are lenient because the
/// upstream payload is not under our control.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub machine_name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub machine_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub time_remaining: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MachineKind {
    Washer,
    Dryer,
    Other,
}

impl Machine {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn kind(&self) -> MachineKind {
        match self.machine_type.as_deref() {
            Some("Washer") => MachineKind::Washer,
            Some("Dryer") => MachineKind::Dryer,
            _ => MachineKind::Other,
        }
    }

    /// "Machine {id}" when upstream sends no name
    pub fn display_name(&self) -> String {
        match self.machine_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Machine {}", self.id()),
        }
    }

    pub fn classify(&self) -> ClassificationResult {
        classify(self.status.as_deref(), self.time_remaining)
    }

    /// Case-insensitive match against name, id, type and size
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        [&self.machine_name, &self.id, &self.machine_type, &self.size]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// A machine together with everything a card needs to render it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineView {
    #[serde(flatten)]
    pub machine: Machine,
    pub display_name: String,
    pub kind: MachineKind,
    pub classification: ClassificationResult,
    pub primary_text: String,
    pub secondary_text: Option<String>,
    pub can_set_reminder: bool,
    /// Whether a reminder is pending for this machine
    pub reminder_set: bool,
}

impl MachineView {
    pub fn new(machine: Machine) -> Self {
        let classification = machine.classify();
        Self {
            display_name: machine.display_name(),
            kind: machine.kind(),
            primary_text: classification.primary_text().to_string(),
            secondary_text: classification.secondary_text().map(str::to_string),
            can_set_reminder: classification.category.is_running(),
            reminder_set: false,
            classification,
            machine,
        }
    }
}

/// Accepts strings and numbers; anything else becomes None
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts integers, floats (truncated) and numeric strings
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StatusCategory;

    fn machine(json: Value) -> Machine {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_lenient_fields() {
        let m = machine(serde_json::json!({
            "id": 7,
            "machineName": "Washer 07",
            "type": "Washer",
            "size": 20,
            "status": "In Use",
            "timeRemaining": "23"
        }));
        assert_eq!(m.id(), "7");
        assert_eq!(m.size.as_deref(), Some("20"));
        assert_eq!(m.time_remaining, Some(23));
        assert_eq!(m.kind(), MachineKind::Washer);

        let sparse = machine(serde_json::json!({ "id": "d1", "status": null, "timeRemaining": 12.7 }));
        assert_eq!(sparse.status, None);
        assert_eq!(sparse.time_remaining, Some(12));
        assert_eq!(sparse.kind(), MachineKind::Other);
        assert_eq!(sparse.display_name(), "Machine d1");
    }

    #[test]
    fn test_search_matches_any_field() {
        let m = machine(serde_json::json!({
            "id": "w-12",
            "machineName": "Front Washer",
            "type": "Washer",
            "size": "Large"
        }));
        assert!(m.matches_search("front"));
        assert!(m.matches_search("W-12"));
        assert!(m.matches_search("large"));
        assert!(m.matches_search(""));
        assert!(!m.matches_search("dryer"));
    }

    #[test]
    fn test_view_composes_display_text() {
        let view = MachineView::new(machine(serde_json::json!({
            "id": "1",
            "type": "Dryer",
            "status": "45 min left",
            "timeRemaining": 125
        })));
        assert_eq!(view.classification.category, StatusCategory::InUse);
        assert_eq!(view.primary_text, "2h 5m");
        assert_eq!(view.secondary_text.as_deref(), Some("In Use"));
        assert!(view.can_set_reminder);

        let idle = MachineView::new(machine(serde_json::json!({ "id": "2", "status": "available" })));
        assert_eq!(idle.primary_text, "Available");
        assert_eq!(idle.secondary_text, None);
        assert!(!idle.can_set_reminder);
    }
}
