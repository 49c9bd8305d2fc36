//! End-to-end store scenario: accounts, a contended slot, listings, and
//! owner-scoped deletion, plus a many-threads race on one slot.

use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use slotbook_db::models::NewBooking;
use slotbook_db::{Database, StoreError};

fn temp_db(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("slotbook-flow-{}-{}.db", tag, Uuid::new_v4()))
}

fn new_user(db: &Database, username: &str) -> String {
    let id = Uuid::new_v4().to_string();
    db.create_user(&id, username, &format!("{}@example.com", username), "hash")
        .unwrap();
    id
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn slot(user_id: &str, date: &str, start: &str, title: &str) -> NewBooking {
    NewBooking {
        user_id: user_id.to_string(),
        date: date.parse().unwrap(),
        start_time: time(start),
        end_time: None,
        title: title.to_string(),
        description: None,
    }
}

#[test]
fn full_booking_lifecycle() {
    let db = Database::open(&temp_db("lifecycle")).unwrap();
    let alice = new_user(&db, "alice");
    let bob = new_user(&db, "bob");

    // Alice takes 2024-06-01 10:00.
    let date: NaiveDate = "2024-06-01".parse().unwrap();
    let ten = time("10:00");
    assert!(db.slot_available(date, ten).unwrap());
    let alices = db
        .create_booking(&slot(&alice, "2024-06-01", "10:00", "Planning"))
        .unwrap();

    // Bob asks for the same slot and is turned away.
    assert!(!db.slot_available(date, ten).unwrap());
    let err = db
        .create_booking(&slot(&bob, "2024-06-01", "10:00", "Standup"))
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation), "got {err:?}");

    // Bob books an adjacent slot instead.
    let bobs = db
        .create_booking(&slot(&bob, "2024-06-01", "11:00", "Standup"))
        .unwrap();

    // Calendar shows both, oldest slot first, with owner names.
    let all = db.list_bookings(None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, alices.id);
    assert_eq!(all[0].username.as_deref(), Some("alice"));
    assert_eq!(all[1].id, bobs.id);

    // Alice cannot remove Bob's booking; Bob can.
    assert!(!db.delete_booking(&bobs.id, &alice).unwrap());
    assert!(db.delete_booking(&bobs.id, &bob).unwrap());

    // The freed slot is immediately available again.
    assert!(db.slot_available(date, time("11:00")).unwrap());
    db.create_booking(&slot(&alice, "2024-06-01", "11:00", "Overflow"))
        .unwrap();

    let mine = db.list_bookings_by_user(&alice).unwrap();
    assert_eq!(mine.len(), 2);
}

#[test]
fn contended_slot_admits_exactly_one_winner() {
    const CONTENDERS: usize = 8;

    let db = Arc::new(Database::open(&temp_db("race")).unwrap());

    let users: Vec<String> = (0..CONTENDERS)
        .map(|i| new_user(&db, &format!("user{}", i)))
        .collect();

    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let mut handles = Vec::with_capacity(CONTENDERS);

    for user_id in users {
        let db = Arc::clone(&db);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let request = slot(&user_id, "2024-06-01", "10:00", "Contended");
            barrier.wait();
            db.create_booking(&request)
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => wins += 1,
            Err(StoreError::UniqueViolation) => conflicts += 1,
            Err(e) => panic!("unexpected store error: {e:?}"),
        }
    }

    assert_eq!(wins, 1, "exactly one contender may hold the slot");
    assert_eq!(conflicts, CONTENDERS - 1);
    assert_eq!(db.list_bookings(None).unwrap().len(), 1);
}

#[test]
fn concurrent_bookings_on_distinct_slots_all_land() {
    const WRITERS: usize = 6;

    let db = Arc::new(Database::open(&temp_db("spread")).unwrap());
    let user = new_user(&db, "scheduler");

    let barrier = Arc::new(Barrier::new(WRITERS));
    let mut handles = Vec::with_capacity(WRITERS);

    for i in 0..WRITERS {
        let db = Arc::clone(&db);
        let barrier = Arc::clone(&barrier);
        let user = user.clone();
        handles.push(thread::spawn(move || {
            let start = format!("{:02}:00", 9 + i);
            let request = slot(&user, "2024-06-01", &start, "Busy day");
            barrier.wait();
            db.create_booking(&request)
        }));
    }

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let all = db.list_bookings(None).unwrap();
    assert_eq!(all.len(), WRITERS);
    // Already sorted by slot; starts must be strictly increasing.
    for pair in all.windows(2) {
        assert!(pair[0].start_time < pair[1].start_time);
    }
}
