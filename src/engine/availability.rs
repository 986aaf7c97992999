use crate::model::{Calendar, DateRange};

use super::error::EngineError;

// ── Availability Algorithms ──────────────────────────────────────

/// Resolve `range` to day offsets inside the calendar horizon.
///
/// Rejects empty/inverted ranges before any horizon check, and treats any
/// date outside the pre-populated horizon as an error rather than free.
pub(crate) fn range_offsets(
    calendar: &Calendar,
    range: &DateRange,
) -> Result<(usize, usize), EngineError> {
    if range.check_in >= range.check_out {
        return Err(EngineError::InvalidRange {
            check_in: range.check_in,
            check_out: range.check_out,
        });
    }
    let start = calendar
        .day_offset(range.check_in)
        .ok_or(EngineError::OutOfHorizon(range.check_in))?;
    let end = start + range.nights() as usize;
    if end > calendar.horizon_days() as usize {
        return Err(EngineError::OutOfHorizon(range.check_out));
    }
    Ok((start, end))
}

/// Count rooms free across the whole of `[check_in, check_out)`. A room
/// qualifies only if every night in the range is free. Pure; no side effects.
pub fn count_available(calendar: &Calendar, range: &DateRange) -> Result<u32, EngineError> {
    let (start, end) = range_offsets(calendar, range)?;
    let free = calendar
        .rooms
        .iter()
        .filter(|row| row[start..end].iter().all(|f| *f))
        .count();
    Ok(free as u32)
}

/// Same check restricted to one physical room.
pub fn is_room_free(
    calendar: &Calendar,
    room_index: u32,
    range: &DateRange,
) -> Result<bool, EngineError> {
    let (start, end) = range_offsets(calendar, range)?;
    let row = calendar
        .rooms
        .get(room_index as usize)
        .ok_or(EngineError::LimitExceeded("room index out of range"))?;
    Ok(row[start..end].iter().all(|f| *f))
}

/// Mark the first fully-free room (ascending index order) occupied for the
/// range and return its index. All-or-nothing: when every room is taken,
/// nothing is mutated.
pub fn reserve(calendar: &mut Calendar, range: &DateRange) -> Result<u32, EngineError> {
    let (start, end) = range_offsets(calendar, range)?;
    let index = calendar
        .rooms
        .iter()
        .position(|row| row[start..end].iter().all(|f| *f))
        .ok_or(EngineError::NoCapacity(calendar.total_rooms()))?;
    for slot in &mut calendar.rooms[index][start..end] {
        *slot = false;
    }
    Ok(index as u32)
}

/// Mark the range free on one room. Idempotent: releasing an already-free
/// slot is a no-op, because cancellation may be retried.
pub fn release(
    calendar: &mut Calendar,
    room_index: u32,
    range: &DateRange,
) -> Result<(), EngineError> {
    let (start, end) = range_offsets(calendar, range)?;
    let row = calendar
        .rooms
        .get_mut(room_index as usize)
        .ok_or(EngineError::LimitExceeded("room index out of range"))?;
    for slot in &mut row[start..end] {
        *slot = true;
    }
    Ok(())
}
