use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entities::{prelude::*, rooms};
use numble_types::{GameState, Player, Room};

/// Durable room store. The in-memory registry is the write-through leader;
/// this repository only ever sees whole-room upserts and id lookups.
pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_room(model: rooms::Model) -> Result<Room> {
        let player1: Player = serde_json::from_value(model.player1)?;
        let player2: Option<Player> = model
            .player2
            .map(serde_json::from_value)
            .transpose()?;
        let game_state: GameState = serde_json::from_value(model.game_state)?;

        Ok(Room {
            id: model.id,
            player1,
            player2,
            game_state,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Room>> {
        let model = Rooms::find_by_id(id).one(&self.db).await?;
        model.map(Self::model_to_room).transpose()
    }

    /// Upserts the room row, replacing both player documents and the game
    /// state under the room-code key.
    pub async fn save(&self, room: &Room) -> Result<()> {
        let now: sea_orm::entity::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let model = rooms::ActiveModel {
            id: sea_orm::ActiveValue::Set(room.id.clone()),
            player1: sea_orm::ActiveValue::Set(serde_json::to_value(&room.player1)?),
            player2: sea_orm::ActiveValue::Set(
                room.player2
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?,
            ),
            game_state: sea_orm::ActiveValue::Set(serde_json::to_value(&room.game_state)?),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
        };

        Rooms::insert(model)
            .on_conflict(
                OnConflict::column(rooms::Column::Id)
                    .update_columns([
                        rooms::Column::Player1,
                        rooms::Column::Player2,
                        rooms::Column::GameState,
                        rooms::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
