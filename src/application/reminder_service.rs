// Reminder service - Tracks running machines and notifies when they finish
use crate::application::room_service::RoomService;
use crate::domain::machine::Machine;
use crate::domain::reminder::{Notification, Reminder};
use crate::domain::room::RoomDetail;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Delivers reminder notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("machine {machine_id} not found in room {room_id}")]
    MachineNotFound { room_id: String, machine_id: String },

    #[error("{machine_name} is {status}; reminders can only be set on running machines")]
    NotRunning { machine_name: String, status: String },

    #[error("a reminder is already set for {0}")]
    AlreadySet(String),

    #[error("no reminder set for machine {machine_id} in room {room_id}")]
    NotFound { room_id: String, machine_id: String },

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// (room id, machine id)
type ReminderKey = (String, String);

#[derive(Clone)]
pub struct ReminderService {
    room_service: RoomService,
    notifier: Arc<dyn Notifier>,
    reminders: Arc<Mutex<BTreeMap<ReminderKey, Reminder>>>,
}

impl ReminderService {
    pub fn new(room_service: RoomService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            room_service,
            notifier,
            reminders: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub async fn set_reminder(&self, room_id: &str, machine_id: &str) -> Result<Reminder, ReminderError> {
        if self.is_set(room_id, machine_id).await {
            return Err(ReminderError::AlreadySet(machine_id.to_string()));
        }

        let machines = self.room_service.fetch_machines(room_id).await?;
        let machine = machines
            .iter()
            .find(|m| m.id() == machine_id)
            .ok_or_else(|| ReminderError::MachineNotFound {
                room_id: room_id.to_string(),
                machine_id: machine_id.to_string(),
            })?;

        let status = machine.classify();
        if !status.category.is_running() {
            return Err(ReminderError::NotRunning {
                machine_name: machine.display_name(),
                status: status.display_label,
            });
        }

        let room_name = self
            .room_service
            .find_room(room_id)
            .await
            .map(|room| room.display_name())
            .unwrap_or_else(|| "Selected Room".to_string());

        let reminder = Reminder::new(
            room_id.to_string(),
            machine_id.to_string(),
            machine.display_name(),
            room_name,
            status.category,
        );

        {
            let key = (room_id.to_string(), machine_id.to_string());
            let mut reminders = self.reminders.lock().await;
            // Lost a race with a concurrent request for the same machine
            if reminders.contains_key(&key) {
                return Err(ReminderError::AlreadySet(machine_id.to_string()));
            }
            reminders.insert(key, reminder.clone());
        }

        tracing::info!(
            "Reminder set for {} ({}) in room {}",
            reminder.machine_name,
            machine_id,
            room_id
        );
        self.notifier.notify(&reminder.set_notification());
        Ok(reminder)
    }

    pub async fn remove_reminder(&self, room_id: &str, machine_id: &str) -> Result<Reminder, ReminderError> {
        let key = (room_id.to_string(), machine_id.to_string());
        self.reminders
            .lock()
            .await
            .remove(&key)
            .ok_or_else(|| ReminderError::NotFound {
                room_id: room_id.to_string(),
                machine_id: machine_id.to_string(),
            })
    }

    /// Pending reminders, oldest first
    pub async fn list_reminders(&self) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> = self.reminders.lock().await.values().cloned().collect();
        reminders.sort_by_key(|r| r.set_at);
        reminders
    }

    pub async fn is_set(&self, room_id: &str, machine_id: &str) -> bool {
        self.reminders
            .lock()
            .await
            .contains_key(&(room_id.to_string(), machine_id.to_string()))
    }

    /// Flag the machines of a room detail that have a pending reminder
    pub async fn mark_reminders(&self, detail: &mut RoomDetail) {
        let reminders = self.reminders.lock().await;
        for view in &mut detail.machines {
            let key = (detail.room_id.clone(), view.machine.id().to_string());
            view.reminder_set = reminders.contains_key(&key);
        }
    }

    /// Rooms with at least one pending reminder
    pub async fn pending_rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .reminders
            .lock()
            .await
            .keys()
            .map(|(room_id, _)| room_id.clone())
            .collect();
        rooms.dedup();
        rooms
    }

    /// Feed one poll's machines for a room through its reminders. Reminders
    /// whose machine just finished are notified and retired; reminders for
    /// machines missing from the list are left alone.
    pub async fn evaluate(&self, room_id: &str, machines: &[Machine]) -> Vec<Reminder> {
        let fired: Vec<Reminder> = {
            let mut reminders = self.reminders.lock().await;
            let mut fired = Vec::new();

            for ((reminder_room, machine_id), reminder) in reminders.iter_mut() {
                if reminder_room != room_id {
                    continue;
                }
                let Some(machine) = machines.iter().find(|m| m.id() == machine_id) else {
                    tracing::debug!("Machine {} missing from room {}, keeping reminder", machine_id, room_id);
                    continue;
                };
                if reminder.observe(&machine.classify()) {
                    fired.push(reminder.clone());
                }
            }

            for reminder in &fired {
                reminders.remove(&(reminder.room_id.clone(), reminder.machine_id.clone()));
            }
            fired
        };

        for reminder in &fired {
            tracing::info!(
                "{} in room {} finished, retiring reminder",
                reminder.machine_name,
                reminder.room_id
            );
            self.notifier.notify(&reminder.finished_notification());
        }

        fired
    }

    /// Fetch and evaluate every room that has pending reminders
    pub async fn poll_once(&self) -> usize {
        let mut fired = 0;
        for room_id in self.pending_rooms().await {
            match self.room_service.fetch_machines(&room_id).await {
                Ok(machines) => fired += self.evaluate(&room_id, &machines).await.len(),
                Err(e) => tracing::warn!("Reminder poll for {} failed, retrying next tick: {:#}", room_id, e),
            }
        }
        fired
    }

    /// Poll on a fixed interval until the returned handle is aborted
    pub fn spawn_poller(&self, interval: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let fired = service.poll_once().await;
                if fired > 0 {
                    tracing::debug!("Reminder poll fired {} notification(s)", fired);
                }
            }
        })
    }
}
