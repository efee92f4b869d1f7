// Reminder domain model
use super::status::{ClassificationResult, StatusCategory};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A request to be told when a running machine is done
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub room_id: String,
    pub machine_id: String,
    pub machine_name: String,
    pub room_name: String,
    pub set_at: DateTime<Utc>,
    /// Category seen on the most recent poll
    pub last_category: StatusCategory,
}

impl Reminder {
    pub fn new(
        room_id: String,
        machine_id: String,
        machine_name: String,
        room_name: String,
        current_category: StatusCategory,
    ) -> Self {
        Self {
            room_id,
            machine_id,
            machine_name,
            room_name,
            set_at: Utc::now(),
            last_category: current_category,
        }
    }

    /// Record the latest classification. Returns true when the machine moved
    /// from a non-terminal category into a terminal one.
    pub fn observe(&mut self, result: &ClassificationResult) -> bool {
        let fired = result.category.is_terminal() && !self.last_category.is_terminal();
        self.last_category = result.category.clone();
        fired
    }

    pub fn set_notification(&self) -> Notification {
        Notification {
            title: "LaundryLink Reminder Set".to_string(),
            body: format!(
                "Reminder set for {} in \"{}\". You'll be notified when it's done.",
                self.machine_name, self.room_name
            ),
            tag: format!("reminder-set-{}", self.machine_id),
        }
    }

    pub fn finished_notification(&self) -> Notification {
        Notification {
            title: "LaundryLink Reminder".to_string(),
            body: format!("{} in \"{}\" has finished!", self.machine_name, self.room_name),
            tag: format!("reminder-done-{}", self.machine_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other
    pub tag: String,
}
