use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Day-granular half-open stay `[check_in, check_out)`. Check-out day is
/// never occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        debug_assert!(check_in < check_out, "check-in must be before check-out");
        Self {
            check_in,
            check_out,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    #[allow(dead_code)]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

/// Booking lifecycle. A record is cancelled at most once; everything else is
/// a no-op or an error at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

impl BookingStatus {
    pub fn is_cancelled(self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

// ── Calendar ─────────────────────────────────────────────────────

/// Per-room free/occupied bitmap over a fixed horizon `[opens, opens + days)`.
/// `rooms[i][d]` is true when physical room `i` is free on day `opens + d`.
/// Dates outside the horizon have no entry and are an out-of-range error at
/// the query layer, never implicitly free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub(crate) opens: NaiveDate,
    pub(crate) rooms: Vec<Vec<bool>>,
}

impl Calendar {
    /// Every (room, date) pair starts free.
    pub fn new(total_rooms: u32, opens: NaiveDate, horizon_days: u32) -> Self {
        let row = vec![true; horizon_days as usize];
        Self {
            opens,
            rooms: vec![row; total_rooms as usize],
        }
    }

    pub fn total_rooms(&self) -> u32 {
        self.rooms.len() as u32
    }

    pub fn opens(&self) -> NaiveDate {
        self.opens
    }

    pub fn horizon_days(&self) -> u32 {
        self.rooms.first().map_or(0, |row| row.len() as u32)
    }

    /// First day past the horizon (exclusive bound).
    pub fn closes(&self) -> NaiveDate {
        self.opens + Days::new(u64::from(self.horizon_days()))
    }

    /// Offset of `date` inside the horizon, or None when out of range.
    pub(crate) fn day_offset(&self, date: NaiveDate) -> Option<usize> {
        let delta = (date - self.opens).num_days();
        if delta < 0 || delta >= i64::from(self.horizon_days()) {
            None
        } else {
            Some(delta as usize)
        }
    }

    // ── Persistence shape ────────────────────────────────────

    /// One ISO-date→free map per physical room, covering the whole horizon.
    pub fn to_rows(&self) -> Vec<BTreeMap<NaiveDate, bool>> {
        self.rooms
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(d, free)| (self.opens + Days::new(d as u64), *free))
                    .collect()
            })
            .collect()
    }

    /// Rebuild from the persistence shape. Rows must be non-empty, equal in
    /// length, and cover the same contiguous date span.
    pub fn from_rows(rows: Vec<BTreeMap<NaiveDate, bool>>) -> Result<Self, CalendarShapeError> {
        let first = rows.first().ok_or(CalendarShapeError::NoRooms)?;
        let Some((&opens, _)) = first.iter().next() else {
            return Err(CalendarShapeError::EmptyRow);
        };
        let days = first.len();

        let mut rooms = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != days {
                return Err(CalendarShapeError::RaggedRows);
            }
            let mut bits = Vec::with_capacity(days);
            let mut expected = opens;
            for (&date, &free) in row {
                if date != expected {
                    return Err(CalendarShapeError::NonContiguous(date));
                }
                bits.push(free);
                expected = expected
                    .succ_opt()
                    .ok_or(CalendarShapeError::NonContiguous(date))?;
            }
            rooms.push(bits);
        }
        Ok(Self { opens, rooms })
    }
}

impl Serialize for Calendar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Calendar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<BTreeMap<NaiveDate, bool>>::deserialize(deserializer)?;
        Calendar::from_rows(rows).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CalendarShapeError {
    NoRooms,
    EmptyRow,
    RaggedRows,
    NonContiguous(NaiveDate),
}

impl std::fmt::Display for CalendarShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarShapeError::NoRooms => write!(f, "calendar has no room rows"),
            CalendarShapeError::EmptyRow => write!(f, "calendar row covers no dates"),
            CalendarShapeError::RaggedRows => write!(f, "calendar rows cover different spans"),
            CalendarShapeError::NonContiguous(date) => {
                write!(f, "calendar row not contiguous at {date}")
            }
        }
    }
}

impl std::error::Error for CalendarShapeError {}

// ── Records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Ulid,
    pub owner_id: Ulid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub star_rating: u8,
}

/// One stay on one physical room. `room_index` names which of the room
/// type's calendars was consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelBooking {
    pub id: Ulid,
    pub hotel_id: Ulid,
    pub room_type_id: Ulid,
    pub user_id: Ulid,
    pub room_index: u32,
    pub stay: DateRange,
    pub status: BookingStatus,
}

/// Opaque beyond its reference and status; the remote service owns the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightBooking {
    pub id: Ulid,
    pub reference: String,
    pub status: BookingStatus,
}

/// The user-facing trip record. Cancelled only once every component named in
/// a single cancellation request has been cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub user_id: Ulid,
    pub status: BookingStatus,
    pub flight_booking_id: Option<Ulid>,
    pub hotel_booking_id: Option<Ulid>,
}

/// A room type and everything guarded by its lock: the calendar plus the
/// bookings taken against it, in creation order.
#[derive(Debug, Clone)]
pub struct RoomTypeState {
    pub id: Ulid,
    pub hotel_id: Ulid,
    pub name: String,
    pub amenities: BTreeSet<String>,
    pub price_per_night: f64,
    pub schedule: Calendar,
    pub bookings: Vec<HotelBooking>,
}

impl RoomTypeState {
    pub fn new(
        id: Ulid,
        hotel_id: Ulid,
        name: String,
        amenities: BTreeSet<String>,
        price_per_night: f64,
        schedule: Calendar,
    ) -> Self {
        Self {
            id,
            hotel_id,
            name,
            amenities,
            price_per_night,
            schedule,
            bookings: Vec::new(),
        }
    }

    pub fn total_rooms(&self) -> u32 {
        self.schedule.total_rooms()
    }

    pub fn booking(&self, id: Ulid) -> Option<&HotelBooking> {
        self.bookings.iter().find(|b| b.id == id)
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAvailability {
    pub room_type_id: Ulid,
    pub name: String,
    pub price_per_night: f64,
    pub total_rooms: u32,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomTypeSummary {
    pub id: Ulid,
    pub name: String,
    pub price_per_night: f64,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelSummary {
    pub id: Ulid,
    pub name: String,
    pub city: String,
    pub star_rating: u8,
    /// Cheapest qualifying room type.
    pub starting_price: f64,
    pub room_types: Vec<RoomTypeSummary>,
}

/// Outcome of a capacity reconciliation. `satisfied` is false when every
/// overlapping booking was cancelled and the target still was not reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub room_type_id: Ulid,
    pub target: u32,
    pub available: u32,
    pub satisfied: bool,
    pub cancelled: Vec<Ulid>,
}
