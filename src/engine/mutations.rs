use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{info, warn};
use ulid::Ulid;

use crate::auth::Actor;
use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::availability::{count_available, release, reserve};
use super::{Engine, EngineError};

impl Engine {
    pub fn create_hotel(
        &self,
        id: Ulid,
        owner_id: Ulid,
        name: String,
        address: String,
        city: String,
        star_rating: u8,
    ) -> Result<(), EngineError> {
        if self.hotels.len() >= MAX_HOTELS {
            return Err(EngineError::LimitExceeded("too many hotels"));
        }
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("hotel name length"));
        }
        if address.len() > MAX_ADDRESS_LEN {
            return Err(EngineError::LimitExceeded("address length"));
        }
        if city.is_empty() || city.len() > MAX_CITY_LEN {
            return Err(EngineError::LimitExceeded("city length"));
        }
        if !(1..=5).contains(&star_rating) {
            return Err(EngineError::Validation("star rating must be 1..=5"));
        }
        if self.hotels.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        self.hotels.insert(
            id,
            Hotel {
                id,
                owner_id,
                name,
                address,
                city,
                star_rating,
            },
        );
        self.hotel_rooms.entry(id).or_default();
        info!("hotel {id} created");
        Ok(())
    }

    /// Owner-only. The calendar is created here, fully free over
    /// `[opens, opens + horizon_days)`, and is never replaced afterwards;
    /// capacity changes flow through `reconcile_capacity`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_room_type(
        &self,
        actor: &Actor,
        id: Ulid,
        hotel_id: Ulid,
        name: String,
        amenities: BTreeSet<String>,
        price_per_night: f64,
        total_rooms: u32,
        opens: NaiveDate,
        horizon_days: u32,
    ) -> Result<(), EngineError> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("room type name length"));
        }
        if amenities.len() > MAX_AMENITIES {
            return Err(EngineError::LimitExceeded("too many amenities"));
        }
        if amenities.iter().any(|a| a.len() > MAX_AMENITY_LEN) {
            return Err(EngineError::LimitExceeded("amenity length"));
        }
        if !(price_per_night.is_finite() && price_per_night > 0.0) {
            return Err(EngineError::Validation("price per night must be positive"));
        }
        if total_rooms == 0 || total_rooms > MAX_TOTAL_ROOMS {
            return Err(EngineError::LimitExceeded("total rooms"));
        }
        if horizon_days == 0 || horizon_days > MAX_HORIZON_DAYS {
            return Err(EngineError::LimitExceeded("horizon days"));
        }
        self.require_owner(actor, &hotel_id)?;
        if self.room_types.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }
        let mut rooms_of_hotel = self.hotel_rooms.entry(hotel_id).or_default();
        if rooms_of_hotel.len() >= MAX_ROOM_TYPES_PER_HOTEL {
            return Err(EngineError::LimitExceeded("too many room types for hotel"));
        }

        let schedule = Calendar::new(total_rooms, opens, horizon_days);
        let state = RoomTypeState::new(id, hotel_id, name, amenities, price_per_night, schedule);
        self.room_types.insert(id, Arc::new(RwLock::new(state)));
        rooms_of_hotel.push(id);
        info!("room type {id} created for hotel {hotel_id} ({total_rooms} rooms)");
        Ok(())
    }

    /// Reserve one free room for the stay and record the booking. The whole
    /// read-check-write runs under the room type's write lock.
    pub async fn book_room(
        &self,
        actor: &Actor,
        id: Ulid,
        room_type_id: Ulid,
        stay: DateRange,
    ) -> Result<HotelBooking, EngineError> {
        if self.booking_to_room_type.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }
        let rt = self
            .get_room_type(&room_type_id)
            .ok_or(EngineError::NotFound(room_type_id))?;
        let mut guard = rt.write().await;
        if guard.bookings.len() >= MAX_BOOKINGS_PER_ROOM_TYPE {
            return Err(EngineError::LimitExceeded("too many bookings on room type"));
        }

        let room_index = reserve(&mut guard.schedule, &stay)?;
        let booking = HotelBooking {
            id,
            hotel_id: guard.hotel_id,
            room_type_id,
            user_id: actor.user_id,
            room_index,
            stay,
            status: BookingStatus::Active,
        };
        guard.bookings.push(booking.clone());
        self.booking_to_room_type.insert(id, room_type_id);
        metrics::counter!(observability::BOOKINGS_TOTAL).increment(1);
        info!(
            "booked room {room_index} of {room_type_id} for {}..{}",
            stay.check_in, stay.check_out
        );
        Ok(booking)
    }

    /// Release the slot and mark the booking cancelled. Returns false when
    /// the booking was already cancelled (the call is then a no-op).
    pub async fn cancel_hotel_booking(&self, id: Ulid) -> Result<bool, EngineError> {
        let (room_type_id, mut guard) = self.resolve_booking_write(&id).await?;
        let pos = guard
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(EngineError::NotFound(id))?;
        if guard.bookings[pos].status.is_cancelled() {
            return Ok(false);
        }

        let (room_index, stay) = (guard.bookings[pos].room_index, guard.bookings[pos].stay);
        release(&mut guard.schedule, room_index, &stay)?;
        guard.bookings[pos].status = BookingStatus::Cancelled;
        metrics::counter!(observability::CANCELLATIONS_TOTAL, "leg" => "hotel").increment(1);
        info!("hotel booking {id} cancelled (room type {room_type_id})");
        Ok(true)
    }

    /// Cascading cancellation toward a lowered availability target.
    ///
    /// Walks bookings in creation order, cancelling only those overlapping
    /// the window, and stops the moment the target is reached, never past
    /// it. When the bookings run out first the shortfall is reported, not
    /// swallowed; the caller decides whether to accept it.
    pub async fn reconcile_capacity(
        &self,
        actor: &Actor,
        room_type_id: Ulid,
        target: u32,
        window: DateRange,
    ) -> Result<ReconcileReport, EngineError> {
        let rt = self
            .get_room_type(&room_type_id)
            .ok_or(EngineError::NotFound(room_type_id))?;
        let mut guard = rt.write().await;
        self.require_owner(actor, &guard.hotel_id)?;
        let total_rooms = guard.total_rooms();
        if target > total_rooms {
            return Err(EngineError::TargetOutOfRange {
                target,
                total_rooms,
            });
        }

        let mut available = count_available(&guard.schedule, &window)?;
        let mut cancelled = Vec::new();
        let mut to_notify = Vec::new();

        if available < target {
            for pos in 0..guard.bookings.len() {
                let b = &guard.bookings[pos];
                if b.status.is_cancelled() || !b.stay.overlaps(&window) {
                    continue;
                }
                let (bid, room_index, stay, uid) = (b.id, b.room_index, b.stay, b.user_id);

                release(&mut guard.schedule, room_index, &stay)?;
                guard.bookings[pos].status = BookingStatus::Cancelled;
                cancelled.push(bid);
                to_notify.push(uid);

                available = count_available(&guard.schedule, &window)?;
                if available >= target {
                    break;
                }
            }
        }
        drop(guard);

        let satisfied = available >= target;
        if !cancelled.is_empty() {
            metrics::counter!(observability::RECONCILE_CANCELLED_TOTAL)
                .increment(cancelled.len() as u64);
            info!(
                "reconciled {room_type_id} to target {target}: cancelled {}",
                cancelled.len()
            );
        }
        if !satisfied {
            warn!(
                "target {target} unreachable for {room_type_id}: {available} available after \
                 cancelling every overlapping booking"
            );
        }
        for uid in to_notify {
            self.notify_best_effort(uid, "Your hotel room booking has been cancelled.")
                .await;
        }

        Ok(ReconcileReport {
            room_type_id,
            target,
            available,
            satisfied,
            cancelled,
        })
    }

    // ── Trip assembly ────────────────────────────────────────

    pub fn register_flight_booking(&self, id: Ulid, reference: String) -> Result<(), EngineError> {
        if reference.is_empty() || reference.len() > MAX_REFERENCE_LEN {
            return Err(EngineError::LimitExceeded("flight reference length"));
        }
        if self.flights.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }
        self.flights.insert(
            id,
            FlightBooking {
                id,
                reference,
                status: BookingStatus::Active,
            },
        );
        Ok(())
    }

    /// Assemble the user-facing trip record. Component records must already
    /// exist, and a hotel leg must belong to the same user.
    pub async fn create_trip(
        &self,
        actor: &Actor,
        id: Ulid,
        flight_booking_id: Option<Ulid>,
        hotel_booking_id: Option<Ulid>,
    ) -> Result<Booking, EngineError> {
        if flight_booking_id.is_none() && hotel_booking_id.is_none() {
            return Err(EngineError::Validation("trip needs at least one component"));
        }
        if self.trips.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }
        if let Some(fid) = flight_booking_id
            && !self.flights.contains_key(&fid)
        {
            return Err(EngineError::NotFound(fid));
        }
        if let Some(hid) = hotel_booking_id {
            let room_type_id = self
                .room_type_for_booking(&hid)
                .ok_or(EngineError::NotFound(hid))?;
            let rt = self
                .get_room_type(&room_type_id)
                .ok_or(EngineError::NotFound(room_type_id))?;
            let guard = rt.read().await;
            let booking = guard.booking(hid).ok_or(EngineError::NotFound(hid))?;
            if booking.user_id != actor.user_id {
                return Err(EngineError::Forbidden(hid));
            }
        }

        let trip = Booking {
            id,
            user_id: actor.user_id,
            status: BookingStatus::Active,
            flight_booking_id,
            hotel_booking_id,
        };
        self.trips.insert(id, trip.clone());
        info!("trip {id} created for user {}", actor.user_id);
        Ok(trip)
    }

    // ── Status flips used by the cancellation saga ───────────

    pub fn mark_flight_cancelled(&self, id: &Ulid) -> Result<(), EngineError> {
        let mut flight = self
            .flights
            .get_mut(id)
            .ok_or(EngineError::NotFound(*id))?;
        flight.status = BookingStatus::Cancelled;
        metrics::counter!(observability::CANCELLATIONS_TOTAL, "leg" => "flight").increment(1);
        Ok(())
    }

    pub fn mark_trip_cancelled(&self, id: &Ulid) -> Result<(), EngineError> {
        let mut trip = self.trips.get_mut(id).ok_or(EngineError::NotFound(*id))?;
        trip.status = BookingStatus::Cancelled;
        metrics::counter!(observability::CANCELLATIONS_TOTAL, "leg" => "trip").increment(1);
        Ok(())
    }
}
