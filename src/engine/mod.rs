mod availability;
mod error;
mod mutations;
mod queries;
mod search;
#[cfg(test)]
mod tests;

pub use availability::{count_available, is_room_free, release, reserve};
pub use error::EngineError;
pub use search::{PriceRange, SearchFilters};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::auth::Actor;
use crate::model::*;
use crate::notify::Notifier;

pub type SharedRoomType = Arc<RwLock<RoomTypeState>>;

/// The in-process store and mutation surface. Each room type's calendar and
/// booking list live behind one `RwLock`: every reserve/release/reconcile is
/// a single atomic read-check-write, so two concurrent bookings can never
/// observe the same free slot.
pub struct Engine {
    pub(crate) hotels: DashMap<Ulid, Hotel>,
    pub(crate) room_types: DashMap<Ulid, SharedRoomType>,
    /// Hotel → room type ids, in creation order.
    pub(crate) hotel_rooms: DashMap<Ulid, Vec<Ulid>>,
    /// Reverse lookup: hotel booking id → room type id.
    pub(crate) booking_to_room_type: DashMap<Ulid, Ulid>,
    pub(crate) trips: DashMap<Ulid, Booking>,
    pub(crate) flights: DashMap<Ulid, FlightBooking>,
    pub notify: Arc<dyn Notifier>,
}

impl Engine {
    pub fn new(notify: Arc<dyn Notifier>) -> Self {
        Self {
            hotels: DashMap::new(),
            room_types: DashMap::new(),
            hotel_rooms: DashMap::new(),
            booking_to_room_type: DashMap::new(),
            trips: DashMap::new(),
            flights: DashMap::new(),
            notify,
        }
    }

    pub fn get_hotel(&self, id: &Ulid) -> Option<Hotel> {
        self.hotels.get(id).map(|e| e.value().clone())
    }

    pub fn get_room_type(&self, id: &Ulid) -> Option<SharedRoomType> {
        self.room_types.get(id).map(|e| e.value().clone())
    }

    pub fn room_type_for_booking(&self, booking_id: &Ulid) -> Option<Ulid> {
        self.booking_to_room_type.get(booking_id).map(|e| *e.value())
    }

    pub fn get_trip(&self, id: &Ulid) -> Option<Booking> {
        self.trips.get(id).map(|e| e.value().clone())
    }

    pub fn get_flight(&self, id: &Ulid) -> Option<FlightBooking> {
        self.flights.get(id).map(|e| e.value().clone())
    }

    /// Lookup booking → room type, get the state, acquire the write lock.
    pub(super) async fn resolve_booking_write(
        &self,
        booking_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<RoomTypeState>), EngineError> {
        let room_type_id = self
            .room_type_for_booking(booking_id)
            .ok_or(EngineError::NotFound(*booking_id))?;
        let rt = self
            .get_room_type(&room_type_id)
            .ok_or(EngineError::NotFound(room_type_id))?;
        let guard = rt.write_owned().await;
        Ok((room_type_id, guard))
    }

    /// Require that `actor` owns the hotel.
    pub(super) fn require_owner(
        &self,
        actor: &Actor,
        hotel_id: &Ulid,
    ) -> Result<Hotel, EngineError> {
        let hotel = self
            .get_hotel(hotel_id)
            .ok_or(EngineError::NotFound(*hotel_id))?;
        if hotel.owner_id != actor.user_id {
            return Err(EngineError::Forbidden(*hotel_id));
        }
        Ok(hotel)
    }

    /// Deliver a user notification without letting a delivery failure affect
    /// the mutation that already committed.
    pub(crate) async fn notify_best_effort(&self, uid: Ulid, message: &str) {
        if let Err(e) = self.notify.notify(uid, message).await {
            metrics::counter!(crate::observability::NOTIFY_FAILURES_TOTAL).increment(1);
            tracing::warn!("notification to {uid} failed: {e}");
        }
    }
}
