// Room watch service - Live room snapshots while a client keeps the view open
use crate::application::reminder_service::ReminderService;
use crate::application::room_service::{MachineFilter, RoomService};
use crate::domain::room::RoomDetail;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// One frame of the watch stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WatchFrame {
    Snapshot(RoomDetail),
    /// A refresh failed; the previous snapshot is still the latest data
    Error { message: String },
}

#[derive(Clone)]
pub struct RoomWatchService {
    room_service: RoomService,
    reminder_service: ReminderService,
    interval: Duration,
}

impl RoomWatchService {
    pub fn new(room_service: RoomService, reminder_service: ReminderService, interval: Duration) -> Self {
        Self {
            room_service,
            reminder_service,
            interval,
        }
    }

    /// Send a snapshot now and on every tick after. Polling stops as soon as
    /// the receiver is dropped.
    pub fn watch_room(&self, room_id: String, filter: MachineFilter) -> mpsc::Receiver<WatchFrame> {
        let (tx, rx) = mpsc::channel(8);
        let service = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!("Watching room {}", room_id);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }

                let frame = service.refresh(&room_id, &filter).await;
                if tx.send(frame).await.is_err() {
                    break;
                }
            }

            tracing::debug!("Stopped watching room {}", room_id);
        });

        rx
    }

    async fn refresh(&self, room_id: &str, filter: &MachineFilter) -> WatchFrame {
        match self.room_service.fetch_machines(room_id).await {
            Ok(machines) => {
                self.reminder_service.evaluate(room_id, &machines).await;
                let mut detail = self.room_service.build_detail(room_id, machines, filter).await;
                self.reminder_service.mark_reminders(&mut detail).await;
                WatchFrame::Snapshot(detail)
            }
            Err(e) => {
                tracing::warn!("Background refresh of {} failed: {:#}", room_id, e);
                WatchFrame::Error {
                    message: format!("{:#}", e),
                }
            }
        }
    }
}
