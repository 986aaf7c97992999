use tracing::debug;

use crate::model::*;
use crate::observability;

use super::availability::count_available;
use super::{Engine, EngineError};

/// Inclusive nightly price band, from the `"min-max"` query form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let Some((lo, hi)) = s.split_once('-') else {
            return Err(EngineError::Validation("price range must be \"min-max\""));
        };
        let (min, max) = match (lo.trim().parse::<f64>(), hi.trim().parse::<f64>()) {
            (Ok(min), Ok(max)) => (min, max),
            _ => return Err(EngineError::Validation("price range bounds must be numbers")),
        };
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(EngineError::Validation("price range bounds out of order"));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// The date pair and city are required; everything else narrows further.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub stay: DateRange,
    pub city: String,
    pub name: Option<String>,
    pub star_rating: Option<u8>,
    pub price_range: Option<PriceRange>,
}

impl SearchFilters {
    fn validate(&self) -> Result<(), EngineError> {
        if self.stay.check_in >= self.stay.check_out {
            return Err(EngineError::InvalidRange {
                check_in: self.stay.check_in,
                check_out: self.stay.check_out,
            });
        }
        if self.city.is_empty() {
            return Err(EngineError::Validation("city is required"));
        }
        if let Some(stars) = self.star_rating
            && !(1..=5).contains(&stars)
        {
            return Err(EngineError::Validation("star rating must be 1..=5"));
        }
        Ok(())
    }

    fn matches_hotel(&self, hotel: &Hotel) -> bool {
        if hotel.city != self.city {
            return false;
        }
        if let Some(ref name) = self.name
            && hotel.name != *name
        {
            return false;
        }
        if let Some(stars) = self.star_rating
            && hotel.star_rating < stars
        {
            return false;
        }
        true
    }
}

impl Engine {
    /// Availability-aware hotel search. A room type qualifies when at least
    /// one room is free for the whole stay and its price is in range; a
    /// hotel qualifies when at least one room type does. Results come back
    /// ordered by hotel id.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<HotelSummary>, EngineError> {
        filters.validate()?;
        let start = std::time::Instant::now();

        let mut candidates = self.list_hotels();
        candidates.retain(|h| filters.matches_hotel(h));

        let mut results = Vec::new();
        for hotel in candidates {
            let room_type_ids = self
                .hotel_rooms
                .get(&hotel.id)
                .map(|e| e.value().clone())
                .unwrap_or_default();

            let mut qualifying = Vec::new();
            for id in room_type_ids {
                let Some(rt) = self.get_room_type(&id) else {
                    continue;
                };
                let guard = rt.read().await;
                if let Some(ref band) = filters.price_range
                    && !band.contains(guard.price_per_night)
                {
                    continue;
                }
                let available = match count_available(&guard.schedule, &filters.stay) {
                    Ok(n) => n,
                    // A stay the calendar does not cover cannot be booked;
                    // that is "unavailable", not a failed search.
                    Err(EngineError::OutOfHorizon(date)) => {
                        debug!("room type {id} horizon misses {date}");
                        0
                    }
                    Err(e) => return Err(e),
                };
                if available == 0 {
                    continue;
                }
                qualifying.push(RoomTypeSummary {
                    id,
                    name: guard.name.clone(),
                    price_per_night: guard.price_per_night,
                    available,
                });
            }
            if qualifying.is_empty() {
                continue;
            }

            let starting_price = qualifying
                .iter()
                .map(|rt| rt.price_per_night)
                .fold(f64::INFINITY, f64::min);
            results.push(HotelSummary {
                id: hotel.id,
                name: hotel.name,
                city: hotel.city,
                star_rating: hotel.star_rating,
                starting_price,
                room_types: qualifying,
            });
        }

        metrics::histogram!(observability::SEARCH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        Ok(results)
    }
}
