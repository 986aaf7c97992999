use std::sync::Arc;

use tracing::info;
use ulid::Ulid;

use crate::auth::{Actor, TokenVerifier};
use crate::engine::{Engine, EngineError};
use crate::flights::{CancelConfirmation, FlightApiError, FlightGateway};

/// Which parts of the trip to cancel. At least one component id must be
/// named, and each must match the trip's own component ids.
#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub booking_id: Ulid,
    pub flight_booking_id: Option<Ulid>,
    pub hotel_booking_id: Option<Ulid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotelLegOutcome {
    Cancelled,
    /// The slot had already been released by an earlier request.
    AlreadyCancelled,
}

/// Per-component outcomes, so a caller can tell "flight cancelled, hotel
/// pending" apart from full success.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelReport {
    pub booking_id: Ulid,
    pub flight: Option<CancelConfirmation>,
    pub hotel: Option<HotelLegOutcome>,
    pub trip_cancelled: bool,
}

#[derive(Debug)]
pub enum CancelError {
    Unauthorized,
    Forbidden(Ulid),
    NotFound(Ulid),
    NothingToCancel,
    /// A named component id is not part of the named trip.
    ComponentMismatch(Ulid),
    /// Remote refusal, carried verbatim for the caller to act on.
    FlightRejected(String),
    /// Remote transport/server failure; the flight may still be active.
    FlightUnavailable(String),
    Engine(EngineError),
}

impl std::fmt::Display for CancelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelError::Unauthorized => write!(f, "unauthorized"),
            CancelError::Forbidden(id) => write!(f, "booking {id} belongs to someone else"),
            CancelError::NotFound(id) => write!(f, "not found: {id}"),
            CancelError::NothingToCancel => {
                write!(f, "cancellation must name at least one component")
            }
            CancelError::ComponentMismatch(id) => {
                write!(f, "component {id} is not part of this booking")
            }
            CancelError::FlightRejected(msg) => write!(f, "{msg}"),
            CancelError::FlightUnavailable(e) => write!(f, "flight cancellation failed: {e}"),
            CancelError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CancelError {}

impl From<EngineError> for CancelError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotFound(id) => CancelError::NotFound(id),
            EngineError::Forbidden(id) => CancelError::Forbidden(id),
            other => CancelError::Engine(other),
        }
    }
}

impl From<FlightApiError> for CancelError {
    fn from(e: FlightApiError) -> Self {
        match e {
            FlightApiError::Rejected(msg) => CancelError::FlightRejected(msg),
            FlightApiError::Transport(e) => CancelError::FlightUnavailable(e),
        }
    }
}

enum Leg {
    Flight { id: Ulid, reference: String },
    Hotel { id: Ulid },
}

/// Ordered execution plan for one cancellation. Construction always puts the
/// flight leg first: the remote call is the only step that can fail after
/// validation, so nothing local mutates before it has returned success.
struct CancelPlan {
    legs: Vec<Leg>,
    cancels_whole_trip: bool,
}

impl CancelPlan {
    fn build(actor: &Actor, engine: &Engine, req: &CancelRequest) -> Result<Self, CancelError> {
        if req.flight_booking_id.is_none() && req.hotel_booking_id.is_none() {
            return Err(CancelError::NothingToCancel);
        }
        let trip = engine
            .get_trip(&req.booking_id)
            .ok_or(CancelError::NotFound(req.booking_id))?;
        if trip.user_id != actor.user_id {
            return Err(CancelError::Forbidden(req.booking_id));
        }

        let mut legs = Vec::new();
        if let Some(flight_id) = req.flight_booking_id {
            if trip.flight_booking_id != Some(flight_id) {
                return Err(CancelError::ComponentMismatch(flight_id));
            }
            let flight = engine
                .get_flight(&flight_id)
                .ok_or(CancelError::NotFound(flight_id))?;
            legs.push(Leg::Flight {
                id: flight_id,
                reference: flight.reference,
            });
        }
        if let Some(hotel_booking_id) = req.hotel_booking_id {
            if trip.hotel_booking_id != Some(hotel_booking_id) {
                return Err(CancelError::ComponentMismatch(hotel_booking_id));
            }
            if engine.room_type_for_booking(&hotel_booking_id).is_none() {
                return Err(CancelError::NotFound(hotel_booking_id));
            }
            legs.push(Leg::Hotel {
                id: hotel_booking_id,
            });
        }

        Ok(Self {
            cancels_whole_trip: req.flight_booking_id.is_some() && req.hotel_booking_id.is_some(),
            legs,
        })
    }
}

/// Coordinates cancellation of a combined flight+hotel booking across the
/// remote flight service and the local store.
pub struct CancelOrchestrator {
    engine: Arc<Engine>,
    flights: Arc<dyn FlightGateway>,
    auth: Arc<dyn TokenVerifier>,
}

impl CancelOrchestrator {
    pub fn new(
        engine: Arc<Engine>,
        flights: Arc<dyn FlightGateway>,
        auth: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            engine,
            flights,
            auth,
        }
    }

    /// Cancel the named components of a trip. Fail fast, mutate last:
    /// everything up to the remote flight call is read-only, so a rejected
    /// or unreachable flight cancellation leaves the store untouched.
    pub async fn cancel_trip(
        &self,
        token: &str,
        req: &CancelRequest,
    ) -> Result<CancelReport, CancelError> {
        let actor = self
            .auth
            .verify(token)
            .await
            .map_err(|_| CancelError::Unauthorized)?;
        let plan = CancelPlan::build(&actor, &self.engine, req)?;

        let mut report = CancelReport {
            booking_id: req.booking_id,
            flight: None,
            hotel: None,
            trip_cancelled: false,
        };
        for leg in &plan.legs {
            match leg {
                Leg::Flight { id, reference } => {
                    let confirmation = self.flights.cancel(reference, &actor.last_name).await?;
                    // Remote success is the point of no return; the local
                    // flip and everything after it is record keeping.
                    self.engine.mark_flight_cancelled(id)?;
                    self.engine
                        .notify_best_effort(actor.user_id, "Your flight booking has been cancelled.")
                        .await;
                    info!("flight booking {id} cancelled for trip {}", req.booking_id);
                    report.flight = Some(confirmation);
                }
                Leg::Hotel { id } => {
                    let changed = self.engine.cancel_hotel_booking(*id).await?;
                    report.hotel = Some(if changed {
                        HotelLegOutcome::Cancelled
                    } else {
                        HotelLegOutcome::AlreadyCancelled
                    });
                }
            }
        }

        if plan.cancels_whole_trip {
            self.engine.mark_trip_cancelled(&req.booking_id)?;
            self.engine
                .notify_best_effort(
                    actor.user_id,
                    "Your hotel room booking has been cancelled.",
                )
                .await;
            info!("trip {} fully cancelled", req.booking_id);
            report.trip_cancelled = true;
        }
        Ok(report)
    }
}
