use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use ulid::Ulid;

use crate::auth::{Actor, Role};
use crate::limits::*;
use crate::model::*;
use crate::notify::testing::RecordingNotifier;

use super::*;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn range(check_in: &str, check_out: &str) -> DateRange {
    DateRange::new(d(check_in), d(check_out))
}

fn actor() -> Actor {
    Actor {
        user_id: Ulid::new(),
        last_name: "Okafor".into(),
        role: Role::User,
    }
}

fn engine() -> (Engine, Arc<RecordingNotifier>) {
    let notify = Arc::new(RecordingNotifier::default());
    (Engine::new(notify.clone()), notify)
}

/// Hotel owned by `owner` with one room type of `total_rooms` doubles,
/// calendar opening 2025-06-01 for a year.
fn hotel_with_rooms(engine: &Engine, owner: &Actor, total_rooms: u32) -> (Ulid, Ulid) {
    let hotel_id = Ulid::new();
    engine
        .create_hotel(
            hotel_id,
            owner.user_id,
            "Harbour House".into(),
            "1 Quay St".into(),
            "Lisbon".into(),
            4,
        )
        .unwrap();
    let room_type_id = Ulid::new();
    engine
        .create_room_type(
            owner,
            room_type_id,
            hotel_id,
            "Double".into(),
            BTreeSet::from(["wifi".into(), "balcony".into()]),
            120.0,
            total_rooms,
            d("2025-06-01"),
            365,
        )
        .unwrap();
    (hotel_id, room_type_id)
}

// ── Hotel / room type creation ───────────────────────────

#[tokio::test]
async fn create_hotel_and_room_type() {
    let (engine, _) = engine();
    let owner = actor();
    let (hotel_id, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let hotel = engine.get_hotel(&hotel_id).unwrap();
    assert_eq!(hotel.city, "Lisbon");
    let rt = engine.get_room_type(&room_type_id).unwrap();
    let guard = rt.read().await;
    assert_eq!(guard.total_rooms(), 2);
    assert_eq!(guard.schedule.opens(), d("2025-06-01"));
    assert_eq!(guard.schedule.horizon_days(), 365);
}

#[test]
fn create_hotel_validates_fields() {
    let (engine, _) = engine();
    let owner = actor();
    let err = engine
        .create_hotel(
            Ulid::new(),
            owner.user_id,
            "H".into(),
            "A".into(),
            "C".into(),
            7,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_hotel(
            Ulid::new(),
            owner.user_id,
            String::new(),
            "A".into(),
            "C".into(),
            3,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::LimitExceeded(_)));
}

#[test]
fn duplicate_hotel_rejected() {
    let (engine, _) = engine();
    let owner = actor();
    let id = Ulid::new();
    engine
        .create_hotel(id, owner.user_id, "A".into(), "B".into(), "C".into(), 3)
        .unwrap();
    assert!(matches!(
        engine.create_hotel(id, owner.user_id, "A".into(), "B".into(), "C".into(), 3),
        Err(EngineError::AlreadyExists(_))
    ));
}

#[test]
fn room_type_requires_hotel_owner() {
    let (engine, _) = engine();
    let owner = actor();
    let stranger = actor();
    let hotel_id = Ulid::new();
    engine
        .create_hotel(hotel_id, owner.user_id, "A".into(), "B".into(), "C".into(), 3)
        .unwrap();

    let err = engine
        .create_room_type(
            &stranger,
            Ulid::new(),
            hotel_id,
            "Twin".into(),
            BTreeSet::new(),
            80.0,
            1,
            d("2025-06-01"),
            30,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[test]
fn room_type_validates_sizing() {
    let (engine, _) = engine();
    let owner = actor();
    let hotel_id = Ulid::new();
    engine
        .create_hotel(hotel_id, owner.user_id, "A".into(), "B".into(), "C".into(), 3)
        .unwrap();

    let too_many = engine.create_room_type(
        &owner,
        Ulid::new(),
        hotel_id,
        "Twin".into(),
        BTreeSet::new(),
        80.0,
        MAX_TOTAL_ROOMS + 1,
        d("2025-06-01"),
        30,
    );
    assert!(matches!(too_many, Err(EngineError::LimitExceeded(_))));

    let zero_rooms = engine.create_room_type(
        &owner,
        Ulid::new(),
        hotel_id,
        "Twin".into(),
        BTreeSet::new(),
        80.0,
        0,
        d("2025-06-01"),
        30,
    );
    assert!(matches!(zero_rooms, Err(EngineError::LimitExceeded(_))));

    let bad_price = engine.create_room_type(
        &owner,
        Ulid::new(),
        hotel_id,
        "Twin".into(),
        BTreeSet::new(),
        -1.0,
        1,
        d("2025-06-01"),
        30,
    );
    assert!(matches!(bad_price, Err(EngineError::Validation(_))));
}

// ── Booking ──────────────────────────────────────────────

#[tokio::test]
async fn booking_scenario_two_rooms() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);
    let stay = range("2025-06-01", "2025-06-03");

    let first = engine
        .book_room(&guest, Ulid::new(), room_type_id, stay)
        .await
        .unwrap();
    assert_eq!(
        engine.room_availability(room_type_id, stay).await.unwrap().available,
        1
    );

    engine
        .book_room(&guest, Ulid::new(), room_type_id, stay)
        .await
        .unwrap();
    assert_eq!(
        engine.room_availability(room_type_id, stay).await.unwrap().available,
        0
    );

    let exhausted = engine
        .book_room(&guest, Ulid::new(), room_type_id, stay)
        .await;
    assert!(matches!(exhausted, Err(EngineError::NoCapacity(2))));

    assert!(engine.cancel_hotel_booking(first.id).await.unwrap());
    assert_eq!(
        engine.room_availability(room_type_id, stay).await.unwrap().available,
        1
    );
}

#[tokio::test]
async fn bookings_get_distinct_room_indices() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 3);

    let a = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-01", "2025-06-05"))
        .await
        .unwrap();
    let b = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-03", "2025-06-07"))
        .await
        .unwrap();
    assert_ne!(a.room_index, b.room_index);

    // Disjoint stay reuses the lowest index again.
    let c = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-05", "2025-06-08"))
        .await
        .unwrap();
    assert_eq!(c.room_index, 0);
}

#[tokio::test]
async fn booking_out_of_horizon_rejected() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let err = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2026-07-01", "2026-07-03"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::OutOfHorizon(_)));
}

#[tokio::test]
async fn booking_duplicate_id_rejected() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let id = Ulid::new();
    engine
        .book_room(&guest, id, room_type_id, range("2025-06-01", "2025-06-02"))
        .await
        .unwrap();
    let err = engine
        .book_room(&guest, id, room_type_id, range("2025-07-01", "2025-07-02"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 1);
    let stay = range("2025-06-01", "2025-06-04");

    let booking = engine
        .book_room(&guest, Ulid::new(), room_type_id, stay)
        .await
        .unwrap();
    assert!(engine.cancel_hotel_booking(booking.id).await.unwrap());
    // Second cancellation is a no-op, not an error.
    assert!(!engine.cancel_hotel_booking(booking.id).await.unwrap());
    assert_eq!(
        engine.room_availability(room_type_id, stay).await.unwrap().available,
        1
    );
}

#[tokio::test]
async fn cancel_unknown_booking_not_found() {
    let (engine, _) = engine();
    assert!(matches!(
        engine.cancel_hotel_booking(Ulid::new()).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn concurrent_bookings_never_double_book() {
    let (engine, _) = engine();
    let owner = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 4);
    let engine = Arc::new(engine);
    let stay = range("2025-06-10", "2025-06-14");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = engine.clone();
        let guest = actor();
        handles.push(tokio::spawn(async move {
            engine.book_room(&guest, Ulid::new(), room_type_id, stay).await
        }));
    }

    let mut indices = Vec::new();
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(b) => indices.push(b.room_index),
            Err(EngineError::NoCapacity(_)) => exhausted += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(exhausted, 12);
}

// ── Capacity reconciliation ──────────────────────────────

#[tokio::test]
async fn reconcile_noop_when_target_already_met() {
    let (engine, notify) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);
    let window = range("2025-06-01", "2025-06-05");

    let booking = engine
        .book_room(&guest, Ulid::new(), room_type_id, window)
        .await
        .unwrap();

    // One room is free; a target of 1 requires no cancellation.
    let report = engine
        .reconcile_capacity(&owner, room_type_id, 1, window)
        .await
        .unwrap();
    assert!(report.satisfied);
    assert!(report.cancelled.is_empty());
    assert_eq!(report.available, 1);
    assert!(notify.sent().is_empty());

    let rt = engine.get_room_type(&room_type_id).unwrap();
    assert_eq!(
        rt.read().await.booking(booking.id).unwrap().status,
        BookingStatus::Active
    );
}

#[tokio::test]
async fn reconcile_cancels_earliest_booking_first_and_stops() {
    let (engine, notify) = engine();
    let owner = actor();
    let first_guest = actor();
    let second_guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);
    let window = range("2025-06-01", "2025-06-05");

    let first = engine
        .book_room(&first_guest, Ulid::new(), room_type_id, window)
        .await
        .unwrap();
    let second = engine
        .book_room(&second_guest, Ulid::new(), room_type_id, window)
        .await
        .unwrap();

    // 0 free, target 1: exactly one cancellation, the earliest created.
    let report = engine
        .reconcile_capacity(&owner, room_type_id, 1, window)
        .await
        .unwrap();
    assert!(report.satisfied);
    assert_eq!(report.available, 1);
    assert_eq!(report.cancelled, vec![first.id]);

    let rt = engine.get_room_type(&room_type_id).unwrap();
    let guard = rt.read().await;
    assert!(guard.booking(first.id).unwrap().status.is_cancelled());
    assert_eq!(guard.booking(second.id).unwrap().status, BookingStatus::Active);
    drop(guard);

    // Only the displaced guest heard about it.
    assert_eq!(
        notify.sent(),
        vec![(
            first_guest.user_id,
            "Your hotel room booking has been cancelled.".to_string()
        )]
    );
}

#[tokio::test]
async fn reconcile_skips_bookings_outside_window() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 1);

    let outside = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-07-01", "2025-07-05"))
        .await
        .unwrap();
    let inside = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-01", "2025-06-05"))
        .await
        .unwrap();

    let report = engine
        .reconcile_capacity(&owner, room_type_id, 1, range("2025-06-01", "2025-06-05"))
        .await
        .unwrap();
    // The July stay never overlapped the window: untouched even though it
    // was created first.
    assert_eq!(report.cancelled, vec![inside.id]);
    let rt = engine.get_room_type(&room_type_id).unwrap();
    assert_eq!(
        rt.read().await.booking(outside.id).unwrap().status,
        BookingStatus::Active
    );
}

#[tokio::test]
async fn reconcile_rejects_target_above_total() {
    let (engine, _) = engine();
    let owner = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    assert!(matches!(
        engine
            .reconcile_capacity(&owner, room_type_id, 3, range("2025-06-01", "2025-06-05"))
            .await,
        Err(EngineError::TargetOutOfRange {
            target: 3,
            total_rooms: 2
        })
    ));
}

#[tokio::test]
async fn reconcile_reports_shortfall_when_bookings_run_dry() {
    let (engine, notify) = engine();
    let owner = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);
    let window = range("2025-06-01", "2025-06-05");

    // Occupy a day out-of-band (maintenance block): no booking explains it,
    // so the walk has nothing to cancel and must report the shortfall.
    let rt = engine.get_room_type(&room_type_id).unwrap();
    rt.write().await.schedule.rooms[0][2] = false;

    let report = engine
        .reconcile_capacity(&owner, room_type_id, 2, window)
        .await
        .unwrap();
    assert!(!report.satisfied);
    assert_eq!(report.available, 1);
    assert!(report.cancelled.is_empty());
    assert!(notify.sent().is_empty());
}

#[tokio::test]
async fn reconcile_requires_owner() {
    let (engine, _) = engine();
    let owner = actor();
    let stranger = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let err = engine
        .reconcile_capacity(&stranger, room_type_id, 1, range("2025-06-01", "2025-06-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn reconcile_notification_failure_does_not_roll_back() {
    let (engine, notify) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 1);
    let window = range("2025-06-01", "2025-06-05");

    let booking = engine
        .book_room(&guest, Ulid::new(), room_type_id, window)
        .await
        .unwrap();
    notify.set_failing(true);

    let report = engine
        .reconcile_capacity(&owner, room_type_id, 1, window)
        .await
        .unwrap();
    assert!(report.satisfied);
    assert_eq!(report.cancelled, vec![booking.id]);
    // The cancellation committed even though delivery failed.
    let rt = engine.get_room_type(&room_type_id).unwrap();
    assert!(rt.read().await.booking(booking.id).unwrap().status.is_cancelled());
}

// ── Queries ──────────────────────────────────────────────

#[tokio::test]
async fn hotel_availability_lists_all_room_types() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (hotel_id, first_rt) = hotel_with_rooms(&engine, &owner, 2);
    let second_rt = Ulid::new();
    engine
        .create_room_type(
            &owner,
            second_rt,
            hotel_id,
            "Suite".into(),
            BTreeSet::new(),
            300.0,
            1,
            d("2025-06-01"),
            365,
        )
        .unwrap();

    engine
        .book_room(&guest, Ulid::new(), first_rt, range("2025-06-01", "2025-06-03"))
        .await
        .unwrap();

    let rows = engine
        .hotel_availability(&owner, hotel_id, range("2025-06-01", "2025-06-03"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].room_type_id, first_rt);
    assert_eq!(rows[0].available, 1);
    assert_eq!(rows[1].room_type_id, second_rt);
    assert_eq!(rows[1].available, 1);
}

#[tokio::test]
async fn hotel_availability_requires_owner() {
    let (engine, _) = engine();
    let owner = actor();
    let stranger = actor();
    let (hotel_id, _) = hotel_with_rooms(&engine, &owner, 2);

    assert!(matches!(
        engine
            .hotel_availability(&stranger, hotel_id, range("2025-06-01", "2025-06-03"))
            .await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn bookings_listing_keeps_creation_order() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let a = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-01", "2025-06-03"))
        .await
        .unwrap();
    let b = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-02", "2025-06-04"))
        .await
        .unwrap();
    engine.cancel_hotel_booking(a.id).await.unwrap();

    let rows = engine.bookings_for_room_type(&owner, room_type_id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, a.id);
    assert!(rows[0].status.is_cancelled());
    assert_eq!(rows[1].id, b.id);
}

#[tokio::test]
async fn room_availability_validates_range() {
    let (engine, _) = engine();
    let owner = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let inverted = DateRange {
        check_in: d("2025-06-05"),
        check_out: d("2025-06-01"),
    };
    assert!(matches!(
        engine.room_availability(room_type_id, inverted).await,
        Err(EngineError::InvalidRange { .. })
    ));
}

// ── Search ───────────────────────────────────────────────

struct SearchWorld {
    engine: Engine,
    lisbon_cheap: Ulid,
    lisbon_pricey: Ulid,
    porto: Ulid,
}

/// Three hotels: two in Lisbon (3★ budget, 5★ luxury), one in Porto.
async fn search_world() -> SearchWorld {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();

    let lisbon_cheap = Ulid::new();
    engine
        .create_hotel(
            lisbon_cheap,
            owner.user_id,
            "Pensão Central".into(),
            "2 Rua A".into(),
            "Lisbon".into(),
            3,
        )
        .unwrap();
    let cheap_rt = Ulid::new();
    engine
        .create_room_type(
            &owner,
            cheap_rt,
            lisbon_cheap,
            "Twin".into(),
            BTreeSet::new(),
            60.0,
            1,
            d("2025-06-01"),
            365,
        )
        .unwrap();

    let lisbon_pricey = Ulid::new();
    engine
        .create_hotel(
            lisbon_pricey,
            owner.user_id,
            "Grand Tejo".into(),
            "3 Rua B".into(),
            "Lisbon".into(),
            5,
        )
        .unwrap();
    engine
        .create_room_type(
            &owner,
            Ulid::new(),
            lisbon_pricey,
            "Suite".into(),
            BTreeSet::from(["spa".into()]),
            400.0,
            2,
            d("2025-06-01"),
            365,
        )
        .unwrap();
    engine
        .create_room_type(
            &owner,
            Ulid::new(),
            lisbon_pricey,
            "Classic".into(),
            BTreeSet::new(),
            180.0,
            2,
            d("2025-06-01"),
            365,
        )
        .unwrap();

    let porto = Ulid::new();
    engine
        .create_hotel(
            porto,
            owner.user_id,
            "Douro View".into(),
            "4 Rua C".into(),
            "Porto".into(),
            4,
        )
        .unwrap();
    engine
        .create_room_type(
            &owner,
            Ulid::new(),
            porto,
            "Double".into(),
            BTreeSet::new(),
            90.0,
            1,
            d("2025-06-01"),
            365,
        )
        .unwrap();

    // The budget Lisbon twin is fully booked for early June.
    engine
        .book_room(&guest, Ulid::new(), cheap_rt, range("2025-06-01", "2025-06-08"))
        .await
        .unwrap();

    SearchWorld {
        engine,
        lisbon_cheap,
        lisbon_pricey,
        porto,
    }
}

fn filters(city: &str, check_in: &str, check_out: &str) -> SearchFilters {
    SearchFilters {
        stay: range(check_in, check_out),
        city: city.into(),
        name: None,
        star_rating: None,
        price_range: None,
    }
}

#[tokio::test]
async fn search_excludes_fully_booked_room_types() {
    let w = search_world().await;
    let results = w
        .engine
        .search(&filters("Lisbon", "2025-06-02", "2025-06-04"))
        .await
        .unwrap();
    // Only the luxury hotel has free rooms in the window.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, w.lisbon_pricey);
    assert_eq!(results[0].starting_price, 180.0);
    assert_eq!(results[0].room_types.len(), 2);
}

#[tokio::test]
async fn search_includes_freed_dates() {
    let w = search_world().await;
    let results = w
        .engine
        .search(&filters("Lisbon", "2025-06-10", "2025-06-12"))
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    // Stable order by hotel id.
    let mut ids = vec![w.lisbon_cheap, w.lisbon_pricey];
    ids.sort();
    assert_eq!(vec![results[0].id, results[1].id], ids);
}

#[tokio::test]
async fn search_filters_city_stars_and_price() {
    let w = search_world().await;

    let porto_only = w
        .engine
        .search(&filters("Porto", "2025-06-02", "2025-06-04"))
        .await
        .unwrap();
    assert_eq!(porto_only.len(), 1);
    assert_eq!(porto_only[0].id, w.porto);

    let mut five_star = filters("Lisbon", "2025-06-10", "2025-06-12");
    five_star.star_rating = Some(5);
    let results = w.engine.search(&five_star).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, w.lisbon_pricey);

    let mut budget = filters("Lisbon", "2025-06-10", "2025-06-12");
    budget.price_range = Some(PriceRange::parse("50-100").unwrap());
    let results = w.engine.search(&budget).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, w.lisbon_cheap);

    let mut named = filters("Lisbon", "2025-06-10", "2025-06-12");
    named.name = Some("Grand Tejo".into());
    let results = w.engine.search(&named).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, w.lisbon_pricey);
}

#[tokio::test]
async fn search_treats_uncovered_horizon_as_unavailable() {
    let w = search_world().await;
    // Far beyond every calendar's horizon: empty result, not an error.
    let results = w
        .engine
        .search(&filters("Lisbon", "2027-01-01", "2027-01-03"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_validates_input() {
    let w = search_world().await;

    let mut bad_dates = filters("Lisbon", "2025-06-04", "2025-06-05");
    bad_dates.stay = DateRange {
        check_in: d("2025-06-04"),
        check_out: d("2025-06-04"),
    };
    assert!(matches!(
        w.engine.search(&bad_dates).await,
        Err(EngineError::InvalidRange { .. })
    ));

    let no_city = SearchFilters {
        stay: range("2025-06-01", "2025-06-02"),
        city: String::new(),
        name: None,
        star_rating: None,
        price_range: None,
    };
    assert!(matches!(
        w.engine.search(&no_city).await,
        Err(EngineError::Validation(_))
    ));
}

// ── Trip assembly ────────────────────────────────────────

#[tokio::test]
async fn trip_requires_component() {
    let (engine, _) = engine();
    let guest = actor();
    assert!(matches!(
        engine.create_trip(&guest, Ulid::new(), None, None).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn trip_requires_existing_components() {
    let (engine, _) = engine();
    let guest = actor();
    assert!(matches!(
        engine
            .create_trip(&guest, Ulid::new(), Some(Ulid::new()), None)
            .await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn trip_hotel_leg_must_belong_to_creator() {
    let (engine, _) = engine();
    let owner = actor();
    let guest = actor();
    let interloper = actor();
    let (_, room_type_id) = hotel_with_rooms(&engine, &owner, 2);

    let booking = engine
        .book_room(&guest, Ulid::new(), room_type_id, range("2025-06-01", "2025-06-03"))
        .await
        .unwrap();

    assert!(matches!(
        engine
            .create_trip(&interloper, Ulid::new(), None, Some(booking.id))
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let trip = engine
        .create_trip(&guest, Ulid::new(), None, Some(booking.id))
        .await
        .unwrap();
    assert_eq!(trip.status, BookingStatus::Active);
    assert_eq!(trip.hotel_booking_id, Some(booking.id));
}

#[test]
fn flight_registration_validates_reference() {
    let (engine, _) = engine();
    assert!(matches!(
        engine.register_flight_booking(Ulid::new(), String::new()),
        Err(EngineError::LimitExceeded(_))
    ));
    let long = "x".repeat(MAX_REFERENCE_LEN + 1);
    assert!(matches!(
        engine.register_flight_booking(Ulid::new(), long),
        Err(EngineError::LimitExceeded(_))
    ));
    engine
        .register_flight_booking(Ulid::new(), "AFS-1".into())
        .unwrap();
}
