use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use numble_persistence::RoomRepository;
use numble_types::Room;

/// Single source of truth for active rooms: an in-memory map backed by an
/// optional write-through durable store. The cache stays authoritative for
/// the life of the process; the store only matters for crash recovery, so
/// every store failure is logged and swallowed.
pub struct SessionRegistry {
    rooms: RwLock<HashMap<String, Room>>,
    repository: Option<Arc<RoomRepository>>,
}

impl SessionRegistry {
    pub fn new(repository: Option<Arc<RoomRepository>>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            repository,
        }
    }

    /// Looks a room up in the cache, falling back to a durable-store load
    /// on a miss. A store failure surfaces as "room not found".
    pub async fn get(&self, room_id: &str) -> Option<Room> {
        {
            let rooms = self.rooms.read().await;
            if let Some(room) = rooms.get(room_id) {
                return Some(room.clone());
            }
        }

        let repository = self.repository.as_ref()?;
        match repository.find_by_id(room_id).await {
            Ok(Some(room)) => {
                debug!("Recovered room {} from durable store", room_id);
                let mut rooms = self.rooms.write().await;
                rooms.insert(room_id.to_string(), room.clone());
                Some(room)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Durable store lookup failed for room {}: {}", room_id, e);
                None
            }
        }
    }

    pub async fn put(&self, room: Room) {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id.clone(), room);
    }

    /// Best-effort write-through. A store outage degrades durability, not
    /// availability.
    pub async fn persist(&self, room: &Room) {
        let Some(ref repository) = self.repository else {
            return;
        };
        if let Err(e) = repository.save(room).await {
            warn!("Failed to persist room {}: {}", room.id, e);
        }
    }

    pub async fn contains(&self, room_id: &str) -> bool {
        self.get(room_id).await.is_some()
    }

    /// Ids of every cached room with this player in a slot.
    pub async fn rooms_for_player(&self, player_id: &str) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms
            .values()
            .filter(|room| room.is_member(player_id))
            .map(|room| room.id.clone())
            .collect()
    }

    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}
