// Application state for HTTP handlers
use crate::application::reminder_service::ReminderService;
use crate::application::room_service::RoomService;
use crate::application::streaming_service::RoomWatchService;

#[derive(Clone)]
pub struct AppState {
    pub room_service: RoomService,
    pub reminder_service: ReminderService,
    pub watch_service: RoomWatchService,
}
