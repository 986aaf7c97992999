//! Input-size guard rails. Every externally supplied value is bounded before
//! it reaches the store.

/// Hotel, room-type and guest display names.
pub const MAX_NAME_LEN: usize = 256;

pub const MAX_CITY_LEN: usize = 128;

pub const MAX_ADDRESS_LEN: usize = 512;

/// Amenity tags per room type.
pub const MAX_AMENITIES: usize = 64;

pub const MAX_AMENITY_LEN: usize = 64;

/// Physical rooms tracked by one room-type calendar.
pub const MAX_TOTAL_ROOMS: u32 = 1024;

/// Calendar horizon created with a new room type unless overridden.
pub const DEFAULT_HORIZON_DAYS: u32 = 365;

/// Three years. Longer calendars are a sizing mistake, not a booking need.
pub const MAX_HORIZON_DAYS: u32 = 1096;

pub const MAX_HOTELS: usize = 100_000;

pub const MAX_ROOM_TYPES_PER_HOTEL: usize = 256;

/// Lifetime bookings retained per room type (cancelled ones included).
pub const MAX_BOOKINGS_PER_ROOM_TYPE: usize = 65_536;

/// Remote flight-booking reference strings.
pub const MAX_REFERENCE_LEN: usize = 64;
