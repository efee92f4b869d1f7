// Laundry room domain model
use super::machine::{MachineKind, MachineView};
use super::status::StatusCategory;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Link to the room's official tracker page
    #[serde(default)]
    pub url: Option<String>,
}

impl Room {
    pub fn new(id: String, name: String) -> Self {
        Self { id, name, url: None }
    }

    /// Upstream name, or one derived from the id ("harris_millis_" -> "harris millis")
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            Self::format_name(&self.id)
        } else {
            self.name.clone()
        }
    }

    fn format_name(id: &str) -> String {
        id.trim_end_matches('_').replace('_', " ")
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid room id: {}", other))),
    }
}

/// Sort rooms by display name, ignoring case
pub fn sort_rooms(rooms: &mut [Room]) {
    rooms.sort_by_cached_key(|room| {
        let name = room.display_name();
        (name.to_lowercase(), name)
    });
}

/// Washer and dryer counts shown in the room header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub washers_total: usize,
    pub washers_available: usize,
    pub dryers_total: usize,
    pub dryers_available: usize,
}

impl RoomSummary {
    pub fn from_machines(machines: &[MachineView]) -> Self {
        machines.iter().fold(Self::default(), |mut summary, view| {
            let available = view.classification.category == StatusCategory::Available;
            match view.kind {
                MachineKind::Washer => {
                    summary.washers_total += 1;
                    summary.washers_available += usize::from(available);
                }
                MachineKind::Dryer => {
                    summary.dryers_total += 1;
                    summary.dryers_available += usize::from(available);
                }
                MachineKind::Other => {}
            }
            summary
        })
    }
}

/// Everything the room detail view shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    pub room_id: String,
    pub room_name: String,
    pub room_url: Option<String>,
    pub summary: RoomSummary,
    pub machines: Vec<MachineView>,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::Machine;

    fn view(machine_type: &str, status: &str) -> MachineView {
        let machine: Machine = serde_json::from_value(serde_json::json!({
            "id": format!("{machine_type}-{status}"),
            "type": machine_type,
            "status": status
        }))
        .unwrap();
        MachineView::new(machine)
    }

    #[test]
    fn test_format_name() {
        let room = Room::new("harris_millis_".to_string(), String::new());
        assert_eq!(room.display_name(), "harris millis");

        let named = Room::new("hm".to_string(), "Harris Millis".to_string());
        assert_eq!(named.display_name(), "Harris Millis");
    }

    #[test]
    fn test_numeric_room_id() {
        let room: Room = serde_json::from_value(serde_json::json!({ "id": 12, "name": "Wing" })).unwrap();
        assert_eq!(room.id, "12");
        assert_eq!(room.url, None);

        let bad = serde_json::from_value::<Room>(serde_json::json!({ "id": [1], "name": "Wing" }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_sort_rooms_ignores_case() {
        let mut rooms = vec![
            Room::new("3".to_string(), "wing".to_string()),
            Room::new("1".to_string(), "Austin".to_string()),
            Room::new("2".to_string(), "Mason".to_string()),
        ];
        sort_rooms(&mut rooms);
        let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Austin", "Mason", "wing"]);
    }

    #[test]
    fn test_summary_counts() {
        let machines = vec![
            view("Washer", "Available"),
            view("Washer", "In Use"),
            view("Dryer", "available"),
            view("Dryer", "cycle complete"),
            view("Dryer", "Available"),
            view("Folding Table", "Available"),
        ];
        let summary = RoomSummary::from_machines(&machines);
        assert_eq!(
            summary,
            RoomSummary {
                washers_total: 2,
                washers_available: 1,
                dryers_total: 3,
                dryers_available: 2,
            }
        );
    }
}
