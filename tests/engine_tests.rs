//! Pick-up and booking-curve behaviour through the public API.

mod support;

use revpace::adapter::outbound::memory::MemorySnapshotStore;
use revpace::application::booking::BookingService;
use revpace::application::ingest::normalize;
use revpace::application::table::Table;
use revpace::domain::snapshot::SnapshotKey;
use revpace::domain::{
    booking_curve, pickup, CapacityModel, CurveOutcome, PickUp, StayRange,
};
use revpace::error::{Error, SchemaError};
use revpace::port::SnapshotStore;
use support::{date, record, rt, snapshot};

#[test]
fn pickup_is_antisymmetric() {
    let a = snapshot(
        date(2025, 1, 1),
        &[(date(2025, 8, 1), "N-4", 5), (date(2025, 8, 2), "ST2", 2)],
    );
    let b = snapshot(
        date(2025, 1, 10),
        &[(date(2025, 8, 1), "N-4", 9), (date(2025, 8, 3), "ST4", 1)],
    );

    let forward = pickup(&b, &a);
    let backward = pickup(&a, &b);
    let (forward, backward) = (forward.report().unwrap(), backward.report().unwrap());
    assert_eq!(forward.entries().len(), 3);
    for entry in forward.entries() {
        let key = SnapshotKey::new(entry.stay_date, entry.room_type.clone());
        assert_eq!(entry.delta, -backward.delta(&key));
    }
    assert_eq!(forward.grand_total(), 3);
    assert_eq!(forward.grand_total(), -backward.grand_total());
}

#[test]
fn pickup_of_a_snapshot_with_itself_is_zero() {
    let s = snapshot(
        date(2025, 1, 1),
        &[(date(2025, 8, 1), "N-4", 5), (date(2025, 8, 2), "ST2", 2)],
    );
    let outcome = pickup(&s, &s);
    let report = outcome.report().unwrap();
    assert!(report.entries().iter().all(|e| e.delta == 0));
    assert_eq!(report.changed().count(), 0);
}

#[test]
fn pickup_against_nothing_is_no_prior_data() {
    let s = snapshot(date(2025, 1, 1), &[(date(2025, 8, 1), "N-4", 5)]);
    let empty = snapshot(date(2024, 12, 31), &[]);
    assert_eq!(pickup(&s, &empty), PickUp::NoPriorData);
}

#[test]
fn curve_current_is_the_latest_snapshot_not_a_sum() {
    let history = vec![
        record(date(2025, 8, 1), "N-4", 5, date(2025, 1, 1)),
        record(date(2025, 8, 1), "N-4", 8, date(2025, 1, 10)),
    ];
    let range = StayRange::single(date(2025, 8, 1));
    let CurveOutcome::Curve(curve) = booking_curve(&history, &rt("N-4"), &range) else {
        panic!("expected a curve");
    };
    assert_eq!(curve.current_quantity(), 8);
    assert_eq!(curve.current().snapshot_date, date(2025, 1, 10));
}

#[test]
fn curve_points_are_chronological_whatever_the_input_order() {
    let history = vec![
        record(date(2025, 8, 1), "N-4", 9, date(2025, 3, 1)),
        record(date(2025, 8, 1), "N-4", 2, date(2025, 1, 1)),
        record(date(2025, 8, 1), "N-4", 6, date(2025, 2, 1)),
    ];
    let range = StayRange::single(date(2025, 8, 1));
    let outcome = booking_curve(&history, &rt("N-4"), &range);
    let points: Vec<_> = outcome
        .curve()
        .unwrap()
        .points()
        .iter()
        .map(|p| (p.snapshot_date, p.quantity))
        .collect();
    assert_eq!(
        points,
        vec![
            (date(2025, 1, 1), 2),
            (date(2025, 2, 1), 6),
            (date(2025, 3, 1), 9)
        ]
    );
}

#[test]
fn range_bounds_are_inclusive() {
    let on = date(2025, 1, 1);
    let history = vec![
        record(date(2025, 7, 31), "N-4", 100, on),
        record(date(2025, 8, 1), "N-4", 1, on),
        record(date(2025, 8, 5), "N-4", 2, on),
        record(date(2025, 8, 6), "N-4", 100, on),
    ];
    let range = StayRange::try_new(date(2025, 8, 1), date(2025, 8, 5)).unwrap();
    let outcome = booking_curve(&history, &rt("N-4"), &range);
    assert_eq!(outcome.curve().unwrap().current_quantity(), 3);

    let outside = StayRange::try_new(date(2025, 9, 1), date(2025, 9, 2)).unwrap();
    assert_eq!(
        booking_curve(&history, &rt("N-4"), &outside),
        CurveOutcome::NoDataInRange
    );
}

#[test]
fn n4_scenario_reaches_two_thirds_occupancy() {
    let history = vec![
        record(date(2025, 8, 1), "N-4", 50, date(2025, 1, 1)),
        record(date(2025, 8, 1), "N-4", 100, date(2025, 1, 10)),
    ];
    let range = StayRange::try_new(date(2025, 8, 1), date(2025, 8, 5)).unwrap();
    let capacity = CapacityModel::default();
    let n4 = rt("N-4");

    let outcome = booking_curve(&history, &n4, &range);
    let curve = outcome.curve().unwrap();
    assert_eq!(capacity.capacity(&n4), Some(30));
    assert_eq!(curve.points().len(), 2);
    assert_eq!(curve.change_between(date(2025, 1, 1), date(2025, 1, 10)), Some(50));

    let pct = curve.occupancy_pct(30).unwrap();
    assert!((pct - 66.7).abs() < 0.05, "occupancy was {pct}");
}

#[test]
fn upload_without_a_date_column_stores_nothing() {
    let store = MemorySnapshotStore::new();
    let capacity = CapacityModel::default();
    let table = Table::new(
        vec!["N-4".into(), "ST2".into()],
        vec![vec!["5".into(), "1".into()]],
    );

    let result = normalize(&table, date(2025, 1, 1), &capacity);
    assert!(matches!(result, Err(SchemaError::MissingColumn { .. })));

    let service = BookingService::new(&store, &capacity);
    let err: Error = result.map_err(Error::from).and_then(|u| service.preview(u)).unwrap_err();
    assert!(!err.is_recoverable());
    assert!(store.read_all().unwrap().is_empty());
}

#[test]
fn uploads_flow_into_curves() {
    let store = MemorySnapshotStore::new();
    let capacity = CapacityModel::default();
    let service = BookingService::new(&store, &capacity);

    for (day, qty) in [(1, "50"), (10, "100")] {
        let table = Table::new(
            vec!["fecha".into(), "N-4".into()],
            vec![vec!["01/08/2025".into(), qty.into()]],
        );
        let upload = normalize(&table, date(2025, 1, day), &capacity).unwrap();
        service.commit(&service.preview(upload).unwrap()).unwrap();
    }

    let range = StayRange::try_new(date(2025, 8, 1), date(2025, 8, 5)).unwrap();
    let outcome = service.curve(&rt("N-4"), &range).unwrap();
    assert_eq!(outcome.curve().unwrap().current_quantity(), 100);

    let latest = service.compare_latest().unwrap();
    assert_eq!(latest.report().unwrap().grand_total(), 50);
}
