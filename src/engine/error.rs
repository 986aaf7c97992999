use chrono::NaiveDate;
use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    /// Actor does not own the named resource.
    Forbidden(Ulid),
    InvalidRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    /// Date falls outside the calendar's pre-populated horizon.
    OutOfHorizon(NaiveDate),
    /// Every physical room is taken for the requested range.
    NoCapacity(u32),
    TargetOutOfRange {
        target: u32,
        total_rooms: u32,
    },
    Validation(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::Forbidden(id) => write!(f, "not permitted on resource: {id}"),
            EngineError::InvalidRange {
                check_in,
                check_out,
            } => {
                write!(f, "check-out {check_out} is not after check-in {check_in}")
            }
            EngineError::OutOfHorizon(date) => {
                write!(f, "date outside calendar horizon: {date}")
            }
            EngineError::NoCapacity(total) => {
                write!(f, "no room free for the requested range: all {total} taken")
            }
            EngineError::TargetOutOfRange {
                target,
                total_rooms,
            } => {
                write!(f, "target {target} outside [0, {total_rooms}]")
            }
            EngineError::Validation(msg) => write!(f, "invalid request: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
