//! Tests for the lot orchestrator: level fallback, release and sync.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

use crate::config::LotTopology;
use crate::level::Level;
use crate::vehicle::{Vehicle, VehicleKind, VehicleSize};

fn park(lot: &mut ParkingLot, plate: &str, kind: VehicleKind) -> Option<Placement> {
    let mut vehicle = Vehicle::new(plate, kind);
    lot.park(&mut vehicle).expect("park must not fault")
}

// -------------------------------------------------------------------------
// Park
// -------------------------------------------------------------------------

#[test]
fn test_new_lot_totals() {
    let lot = ParkingLot::default();
    assert_eq!(lot.levels().len(), 5);
    assert_eq!(lot.total_spots(), 150);
    assert_eq!(lot.available_spots(), 150);
    lot.check_invariants().unwrap();
}

#[test]
fn test_park_car_on_ground_floor() {
    let mut lot = ParkingLot::default();
    let mut car = Vehicle::new("ABC123", VehicleKind::Car);
    let placement = lot.park(&mut car).unwrap().unwrap();
    assert_eq!(placement, Placement { floor: 0, spots: vec![0] });
    assert_eq!(car.spots().len(), 1);
    assert_eq!(lot.available_spots(), 149);
    assert_eq!(lot.level(0).unwrap().available_spots(), 29);
}

#[test]
fn test_bus_gets_five_adjacent_spots() {
    let mut lot = ParkingLot::default();
    let placement = park(&mut lot, "BUS-1", VehicleKind::Bus).unwrap();
    assert_eq!(placement.spots, vec![0, 1, 2, 3, 4]);
    assert_eq!(lot.available_spots(), 145);
}

#[test]
fn test_one_bus_per_reference_level() {
    // Each 30-spot level has 7 large spots in row 0, room for one bus.
    let mut lot = ParkingLot::default();
    for floor in 0..5 {
        let placement = park(&mut lot, &format!("BUS-{floor}"), VehicleKind::Bus).unwrap();
        assert_eq!(placement.floor, floor);
    }
    assert_eq!(park(&mut lot, "BUS-5", VehicleKind::Bus), None);
    assert_eq!(lot.available_spots(), 125);
    lot.check_invariants().unwrap();
}

#[test]
fn test_multi_level_fallback_reports_floor() {
    // Level 0 is all compact, level 1 has large spots.
    let topology = LotTopology::new(2, 10, 10).unwrap();
    let levels = vec![
        Level::with_sizes(0, 10, std::iter::repeat(VehicleSize::Compact).take(10)),
        Level::with_sizes(1, 10, std::iter::repeat(VehicleSize::Large).take(10)),
    ];
    let mut lot = ParkingLot::from_levels(topology, levels);

    let placement = park(&mut lot, "BUS-1", VehicleKind::Bus).unwrap();
    assert_eq!(placement.floor, 1);
    assert_eq!(lot.level(0).unwrap().available_spots(), 10);
    assert_eq!(lot.level(1).unwrap().available_spots(), 5);
}

#[test]
fn test_level_skipped_when_counter_too_low() {
    let topology = LotTopology::new(2, 5, 10).unwrap();
    let mut lot = ParkingLot::from_levels(
        topology,
        vec![
            Level::with_sizes(0, 10, std::iter::repeat(VehicleSize::Large).take(5)),
            Level::with_sizes(1, 10, std::iter::repeat(VehicleSize::Large).take(5)),
        ],
    );
    park(&mut lot, "CAR-1", VehicleKind::Car).unwrap();
    let placement = park(&mut lot, "BUS-1", VehicleKind::Bus).unwrap();
    assert_eq!(placement.floor, 1);
}

#[test]
fn test_from_levels_renumbers_by_position() {
    let topology = LotTopology::new(2, 5, 10).unwrap();
    let mut lot = ParkingLot::from_levels(
        topology,
        vec![
            Level::with_sizes(7, 10, std::iter::repeat(VehicleSize::Compact).take(5)),
            Level::with_sizes(3, 10, std::iter::repeat(VehicleSize::Large).take(5)),
        ],
    );
    assert_eq!(lot.level(0).unwrap().floor_number(), 0);
    assert_eq!(lot.level(1).unwrap().spot(4).unwrap().floor(), 1);

    let placement = park(&mut lot, "BUS-1", VehicleKind::Bus).unwrap();
    assert_eq!(placement.floor, 1);
    assert_eq!(lot.release(placement.floor, &placement.spots, "BUS-1").unwrap(), 5);
    assert_eq!(lot.available_spots(), 10);
    lot.check_invariants().unwrap();
}

#[test]
fn test_motorcycle_parks_while_any_spot_is_free() {
    let mut lot = ParkingLot::default();
    let mut parked = 0;
    while park(&mut lot, &format!("M-{parked}"), VehicleKind::Motorcycle).is_some() {
        parked += 1;
    }
    assert_eq!(parked, 150);
    assert_eq!(lot.available_spots(), 0);
}

#[test]
fn test_cars_never_use_motorcycle_spots() {
    let mut lot = ParkingLot::default();
    let mut parked = 0;
    while let Some(placement) = park(&mut lot, &format!("C-{parked}"), VehicleKind::Car) {
        let level = lot.level(placement.floor).unwrap();
        assert_ne!(level.spot(placement.spots[0]).unwrap().size(), VehicleSize::Motorcycle);
        parked += 1;
    }
    // 7 large + 16 compact per level.
    assert_eq!(parked, 5 * 23);
    assert_eq!(lot.available_spots(), 5 * 7);
}

// -------------------------------------------------------------------------
// Release
// -------------------------------------------------------------------------

#[test]
fn test_release_restores_counts() {
    let mut lot = ParkingLot::default();
    let placement = park(&mut lot, "ABC123", VehicleKind::Car).unwrap();
    assert_eq!(lot.release(placement.floor, &placement.spots, "ABC123").unwrap(), 1);
    assert_eq!(lot.available_spots(), 150);
    assert_eq!(lot, ParkingLot::default());
}

#[test]
fn test_release_wrong_plate_is_fault() {
    let mut lot = ParkingLot::default();
    let placement = park(&mut lot, "OWNER", VehicleKind::Car).unwrap();
    let err = lot.release(placement.floor, &placement.spots, "THIEF").unwrap_err();
    assert!(format!("{err}").contains("OWNER"), "got: {err}");
    assert_eq!(lot.available_spots(), 149);
}

#[test]
fn test_release_unknown_floor_is_fault() {
    let mut lot = ParkingLot::default();
    assert!(lot.release(9, &[0], "X").is_err());
}

// -------------------------------------------------------------------------
// Sync
// -------------------------------------------------------------------------

#[test]
fn test_apply_snapshot_copies_occupancy() {
    let mut source = ParkingLot::default();
    park(&mut source, "BUS-1", VehicleKind::Bus);
    park(&mut source, "CAR-1", VehicleKind::Car);

    let mut fresh = ParkingLot::default();
    fresh.apply_snapshot(&source.status()).unwrap();
    assert_eq!(fresh, source);
    fresh.check_invariants().unwrap();
}

#[test]
fn test_apply_snapshot_can_free_spots() {
    let mut stale = ParkingLot::default();
    park(&mut stale, "GONE", VehicleKind::Car);

    stale.apply_snapshot(&ParkingLot::default().status()).unwrap();
    assert_eq!(stale.available_spots(), 150);
    assert!(stale.level(0).unwrap().spot(0).unwrap().is_available());
}

#[test]
fn test_apply_snapshot_rejects_level_count() {
    let mut lot = ParkingLot::default();
    let mut snap = lot.status();
    snap.levels.pop();
    assert!(lot.apply_snapshot(&snap).is_err());
}

#[test]
fn test_rejected_snapshot_leaves_lot_untouched() {
    let mut lot = ParkingLot::default();
    park(&mut lot, "KEEP", VehicleKind::Car);
    let before = lot.clone();

    let mut other = ParkingLot::default();
    park(&mut other, "A", VehicleKind::Car);
    let mut snap = other.status();
    // Level 0 is consistent, the lot total is not.
    snap.available_spots = 3;
    assert!(lot.apply_snapshot(&snap).is_err());
    assert_eq!(lot, before);
}

// -------------------------------------------------------------------------
// Randomized park/remove sequences
// -------------------------------------------------------------------------

#[test]
fn test_counters_hold_over_random_sequences() {
    for seed in 0..8u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut lot = ParkingLot::default();
        let mut parked: Vec<(String, Placement)> = Vec::new();

        for step in 0..400 {
            if parked.is_empty() || rng.gen_bool(0.6) {
                let kind = VehicleKind::ALL[rng.gen_range(0..3)];
                let plate = format!("S{seed}-{step}");
                let before = lot.available_spots();
                match park(&mut lot, &plate, kind) {
                    Some(placement) => {
                        assert_eq!(lot.available_spots(), before - kind.spots_needed());
                        parked.push((plate, placement));
                    }
                    None => assert_eq!(lot.available_spots(), before),
                }
            } else {
                let (plate, placement) = parked.swap_remove(rng.gen_range(0..parked.len()));
                lot.release(placement.floor, &placement.spots, &plate).unwrap();
            }
            lot.check_invariants()
                .unwrap_or_else(|e| panic!("seed {seed} step {step}: {e}"));
        }

        for (plate, placement) in parked.drain(..) {
            lot.release(placement.floor, &placement.spots, &plate).unwrap();
        }
        assert_eq!(lot, ParkingLot::default(), "seed {seed}");
    }
}
