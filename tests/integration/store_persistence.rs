//! On-disk behaviour of the availability store.

use crate::helpers::utc;
use rollcall::availability::{AvailabilityStore, SortOrder};

#[test]
fn records_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = AvailabilityStore::new(dir.path(), 5);
        store.append("alex", "Alex", true, utc(2026, 10, 26, 20, 0)).unwrap();
        store.append("alex", "Alex", false, utc(2026, 10, 30, 19, 0)).unwrap();
    }

    let reopened = AvailabilityStore::new(dir.path(), 5);
    let collection = reopened.load_user("alex").unwrap();
    assert_eq!(collection.len(), 2);
    let first = collection.get(0).unwrap();
    assert_eq!(first.user_id, "alex");
    assert!(first.is_available);
    assert_eq!(first.availability_time, utc(2026, 10, 26, 20, 0));
    assert!(!collection.get(1).unwrap().is_available);
}

#[test]
fn lowering_the_cap_keeps_newest_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = AvailabilityStore::new(dir.path(), 5);
    for day in 21..=25 {
        store.append("alex", "Alex", true, utc(2026, 10, day, 19, 0)).unwrap();
    }

    let smaller = AvailabilityStore::new(dir.path(), 2);
    let collection = smaller.load_user("alex").unwrap();
    let days: Vec<_> = collection.iter().map(|r| r.availability_time).collect();
    assert_eq!(days, vec![utc(2026, 10, 24, 19, 0), utc(2026, 10, 25, 19, 0)]);

    smaller.append("alex", "Alex", false, utc(2026, 10, 26, 19, 0)).unwrap();
    assert_eq!(smaller.load_user("alex").unwrap().len(), 2);
}

#[test]
fn listing_survives_a_corrupt_neighbour() {
    let dir = tempfile::tempdir().unwrap();
    let store = AvailabilityStore::new(dir.path(), 5);
    store.append("b", "B", true, utc(2026, 10, 26, 20, 0)).unwrap();
    store.append("a", "A", false, utc(2026, 10, 22, 19, 0)).unwrap();
    std::fs::write(dir.path().join("broken.json"), "[{\"userId\": 1}]").unwrap();

    let listing = store.list_sorted(SortOrder::Ascending).unwrap();
    let ids: Vec<_> = listing.records.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(listing.skipped.len(), 1);
    assert!(listing.skipped[0].path.ends_with("broken.json"));
}

#[test]
fn no_temp_files_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = AvailabilityStore::new(dir.path(), 5);
    store.append("alex", "Alex", true, utc(2026, 10, 26, 20, 0)).unwrap();
    store.append("alex", "Alex", true, utc(2026, 10, 27, 20, 0)).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["alex.json".to_owned()]);
}
