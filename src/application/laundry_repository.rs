// Repository trait for upstream laundry data access
use crate::domain::machine::Machine;
use crate::domain::room::Room;
use async_trait::async_trait;

#[async_trait]
pub trait LaundryRepository: Send + Sync {
    /// List every laundry room the upstream service knows about
    async fn list_rooms(&self) -> anyhow::Result<Vec<Room>>;

    /// Current machine records for one room, in upstream order
    async fn list_machines(&self, room_id: &str) -> anyhow::Result<Vec<Machine>>;
}
