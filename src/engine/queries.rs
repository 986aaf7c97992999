use ulid::Ulid;

use crate::auth::Actor;
use crate::model::*;

use super::availability::count_available;
use super::{Engine, EngineError};

impl Engine {
    /// Visitor view: how many rooms of this type are free for the stay.
    pub async fn room_availability(
        &self,
        room_type_id: Ulid,
        range: DateRange,
    ) -> Result<RoomAvailability, EngineError> {
        let rt = self
            .get_room_type(&room_type_id)
            .ok_or(EngineError::NotFound(room_type_id))?;
        let guard = rt.read().await;
        let available = count_available(&guard.schedule, &range)?;
        Ok(RoomAvailability {
            room_type_id,
            name: guard.name.clone(),
            price_per_night: guard.price_per_night,
            total_rooms: guard.total_rooms(),
            available,
        })
    }

    /// Owner view: availability of every room type of the hotel over the
    /// range, in room-type creation order.
    pub async fn hotel_availability(
        &self,
        actor: &Actor,
        hotel_id: Ulid,
        range: DateRange,
    ) -> Result<Vec<RoomAvailability>, EngineError> {
        self.require_owner(actor, &hotel_id)?;
        let room_type_ids = self
            .hotel_rooms
            .get(&hotel_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();

        let mut out = Vec::with_capacity(room_type_ids.len());
        for id in room_type_ids {
            out.push(self.room_availability(id, range).await?);
        }
        Ok(out)
    }

    /// Owner view: every booking ever taken on the room type, in creation
    /// order, cancelled ones included.
    pub async fn bookings_for_room_type(
        &self,
        actor: &Actor,
        room_type_id: Ulid,
    ) -> Result<Vec<HotelBooking>, EngineError> {
        let rt = self
            .get_room_type(&room_type_id)
            .ok_or(EngineError::NotFound(room_type_id))?;
        let guard = rt.read().await;
        self.require_owner(actor, &guard.hotel_id)?;
        Ok(guard.bookings.clone())
    }

    pub fn list_hotels(&self) -> Vec<Hotel> {
        let mut hotels: Vec<Hotel> = self.hotels.iter().map(|e| e.value().clone()).collect();
        hotels.sort_by_key(|h| h.id);
        hotels
    }
}
