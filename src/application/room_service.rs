// Room service - Use cases for listing rooms and building the room detail view
use crate::application::laundry_repository::LaundryRepository;
use crate::domain::machine::{Machine, MachineView};
use crate::domain::room::{sort_rooms, Room, RoomDetail, RoomSummary};
use crate::domain::status::StatusCategory;
use anyhow::Context;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Status dropdown of the room view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    InUse,
    FinishingSoon,
    CycleFinished,
    OutOfOrder,
    Unknown,
    /// Any unrecognized upstream status
    Other,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown status filter: {0}")]
pub struct UnknownStatusFilter(pub String);

impl FromStr for StatusFilter {
    type Err = UnknownStatusFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let filter = match s.trim().to_lowercase().as_str() {
            "" | "all" => StatusFilter::All,
            "available" => StatusFilter::Available,
            "in use" | "inuse" => StatusFilter::InUse,
            "finishing soon" | "finishingsoon" => StatusFilter::FinishingSoon,
            "cycle finished" | "cyclefinished" => StatusFilter::CycleFinished,
            "out of order" | "outoforder" => StatusFilter::OutOfOrder,
            "unknown" | "status unknown" => StatusFilter::Unknown,
            "other" => StatusFilter::Other,
            _ => return Err(UnknownStatusFilter(s.to_string())),
        };
        Ok(filter)
    }
}

impl StatusFilter {
    pub fn matches(&self, category: &StatusCategory) -> bool {
        match (self, category) {
            (StatusFilter::All, _) => true,
            (StatusFilter::Available, StatusCategory::Available)
            | (StatusFilter::InUse, StatusCategory::InUse)
            | (StatusFilter::FinishingSoon, StatusCategory::FinishingSoon)
            | (StatusFilter::CycleFinished, StatusCategory::CycleFinished)
            | (StatusFilter::OutOfOrder, StatusCategory::OutOfOrder)
            | (StatusFilter::Unknown, StatusCategory::Unknown)
            | (StatusFilter::Other, StatusCategory::Other(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MachineFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl MachineFilter {
    pub fn matches(&self, view: &MachineView) -> bool {
        view.machine.matches_search(&self.search) && self.status.matches(&view.classification.category)
    }
}

#[derive(Clone)]
pub struct RoomService {
    repository: Arc<dyn LaundryRepository>,
    rooms: Arc<RwLock<Vec<Room>>>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn LaundryRepository>) -> Self {
        Self {
            repository,
            rooms: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fetch rooms sorted by name and refresh the room cache
    pub async fn list_rooms(&self) -> anyhow::Result<Vec<Room>> {
        let mut rooms = self
            .repository
            .list_rooms()
            .await
            .context("Failed to load room list")?;
        sort_rooms(&mut rooms);

        tracing::debug!("Fetched {} rooms", rooms.len());
        *self.rooms.write().await = rooms.clone();
        Ok(rooms)
    }

    /// Look a room up in the cache. A miss refreshes the room list once.
    pub async fn find_room(&self, room_id: &str) -> Option<Room> {
        if let Some(room) = self.cached_room(room_id).await {
            return Some(room);
        }

        match self.list_rooms().await {
            Ok(rooms) => rooms.into_iter().find(|room| room.id == room_id),
            Err(e) => {
                tracing::warn!("Could not load rooms while resolving {}: {:#}", room_id, e);
                None
            }
        }
    }

    async fn cached_room(&self, room_id: &str) -> Option<Room> {
        self.rooms
            .read()
            .await
            .iter()
            .find(|room| room.id == room_id)
            .cloned()
    }

    pub async fn fetch_machines(&self, room_id: &str) -> anyhow::Result<Vec<Machine>> {
        self.repository
            .list_machines(room_id)
            .await
            .with_context(|| format!("Failed to load machines for {}", room_id))
    }

    pub async fn room_detail(&self, room_id: &str, filter: &MachineFilter) -> anyhow::Result<RoomDetail> {
        let machines = self.fetch_machines(room_id).await?;
        Ok(self.build_detail(room_id, machines, filter).await)
    }

    /// Classify every machine; the summary counts ignore the filter
    pub async fn build_detail(
        &self,
        room_id: &str,
        machines: Vec<Machine>,
        filter: &MachineFilter,
    ) -> RoomDetail {
        let room = self
            .find_room(room_id)
            .await
            .unwrap_or_else(|| Room::new(room_id.to_string(), String::new()));

        let views: Vec<MachineView> = machines.into_iter().map(MachineView::new).collect();
        let summary = RoomSummary::from_machines(&views);
        let machines = views.into_iter().filter(|view| filter.matches(view)).collect();

        RoomDetail {
            room_id: room.id.clone(),
            room_name: room.display_name(),
            room_url: room.url,
            summary,
            machines,
            last_updated: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::laundry_repository::fake::FakeRepository;
    use serde_json::json;

    fn service(repo: FakeRepository) -> RoomService {
        RoomService::new(Arc::new(repo))
    }

    fn mason() -> FakeRepository {
        FakeRepository::with_room(
            "mason",
            "Mason Hall",
            json!([
                { "id": "w1", "machineName": "Washer 1", "type": "Washer", "size": "Large", "status": "Available" },
                { "id": "w2", "machineName": "Washer 2", "type": "Washer", "status": "23 min left", "timeRemaining": 23 },
                { "id": "d1", "machineName": "Dryer 1", "type": "Dryer", "status": "2 min" },
                { "id": "d2", "machineName": "Dryer 2", "type": "Dryer", "status": "offline" }
            ]),
        )
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("In Use".parse::<StatusFilter>().unwrap(), StatusFilter::InUse);
        assert_eq!("Status Unknown".parse::<StatusFilter>().unwrap(), StatusFilter::Unknown);
        assert!("Spinning".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_other_filter_matches_any_other_text() {
        assert!(StatusFilter::Other.matches(&StatusCategory::Other("Frozen".to_string())));
        assert!(!StatusFilter::Other.matches(&StatusCategory::Unknown));
        assert!(StatusFilter::All.matches(&StatusCategory::Unknown));
    }

    #[tokio::test]
    async fn test_list_rooms_sorted() {
        let repo = FakeRepository::default();
        {
            let mut rooms = repo.rooms.lock().unwrap();
            rooms.push(Room::new("b".to_string(), "wing".to_string()));
            rooms.push(Room::new("a".to_string(), "Austin".to_string()));
        }
        let rooms = service(repo).list_rooms().await.unwrap();
        assert_eq!(rooms[0].name, "Austin");
        assert_eq!(rooms[1].name, "wing");
    }

    #[tokio::test]
    async fn test_room_detail_classifies_and_summarizes() {
        let detail = service(mason())
            .room_detail("mason", &MachineFilter::default())
            .await
            .unwrap();

        assert_eq!(detail.room_name, "Mason Hall");
        assert_eq!(detail.machines.len(), 4);
        assert_eq!(detail.machines[1].primary_text, "23m");
        assert_eq!(
            detail.machines[2].classification.category,
            StatusCategory::FinishingSoon
        );
        assert_eq!(detail.summary.washers_total, 2);
        assert_eq!(detail.summary.washers_available, 1);
        assert_eq!(detail.summary.dryers_total, 2);
        assert_eq!(detail.summary.dryers_available, 0);
    }

    #[tokio::test]
    async fn test_filter_does_not_change_summary() {
        let filter = MachineFilter {
            search: "dryer".to_string(),
            status: StatusFilter::OutOfOrder,
        };
        let detail = service(mason()).room_detail("mason", &filter).await.unwrap();

        assert_eq!(detail.machines.len(), 1);
        assert_eq!(detail.machines[0].display_name, "Dryer 2");
        assert_eq!(detail.summary.washers_total, 2);
    }

    #[tokio::test]
    async fn test_unknown_room_falls_back_to_id() {
        let detail = service(FakeRepository::default())
            .room_detail("north_wing_", &MachineFilter::default())
            .await
            .unwrap();
        assert_eq!(detail.room_name, "north wing");
        assert!(detail.machines.is_empty());
    }

    #[tokio::test]
    async fn test_room_added_later_resolves() {
        let repo = Arc::new(mason());
        let rooms = RoomService::new(repo.clone());
        assert_eq!(rooms.list_rooms().await.unwrap().len(), 1);

        repo.rooms
            .lock()
            .unwrap()
            .push(Room::new("wing".to_string(), "West Wing".to_string()));

        let wing = rooms.find_room("wing").await.unwrap();
        assert_eq!(wing.display_name(), "West Wing");
        assert!(rooms.find_room("mason").await.is_some());
        assert!(rooms.find_room("attic").await.is_none());
    }

    #[tokio::test]
    async fn test_find_room_survives_upstream_failure() {
        let repo = Arc::new(mason());
        let rooms = RoomService::new(repo.clone());
        rooms.list_rooms().await.unwrap();
        repo.set_failing(true);

        assert!(rooms.find_room("mason").await.is_some());
        assert!(rooms.find_room("wing").await.is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_an_error() {
        let repo = mason();
        repo.set_failing(true);
        let err = service(repo)
            .room_detail("mason", &MachineFilter::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mason"));
    }
}
