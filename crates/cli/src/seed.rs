//! Demo fixtures: one room, two people, one meeting tomorrow morning.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use slotlock_concurrency::InMemoryStore;
use slotlock_core::{Booking, NewBooking, Owner, RecordStore, Resource, TimeWindow};

pub struct Seeded {
    pub room: Resource,
    pub organizer: Owner,
    pub colleague: Owner,
    pub booking: Booking,
}

/// Populate `store` with the meeting of the day after `today`.
pub fn seed(store: &InMemoryStore, today: NaiveDate) -> Result<Seeded> {
    let room = Resource::new("Room A101", 30).with_description("Meeting room with projector");
    let organizer = Owner::new("Dupont", "Jean", "jean.dupont@example.com");
    let colleague = Owner::new("Martin", "Sophie", "sophie.martin@example.com");
    store.register_resource(room.clone());
    store.register_owner(organizer.clone());
    store.register_owner(colleague.clone());

    let day = today.succ_opt().context("no day after today")?;
    let window = TimeWindow::new(at(day, 10)?, at(day, 12)?)?;
    let booking = store.insert(NewBooking {
        resource: room.id,
        owner: organizer.id,
        window,
        subject: "Team meeting".to_string(),
    })?;
    tracing::info!(id = %booking.id, window = %booking.window, "seeded booking");

    Ok(Seeded {
        room,
        organizer,
        colleague,
        booking,
    })
}

/// Seed relative to the local calendar date.
pub fn seed_for_tomorrow(store: &InMemoryStore) -> Result<Seeded> {
    seed(store, Local::now().date_naive())
}

fn at(day: NaiveDate, hour: u32) -> Result<NaiveDateTime> {
    day.and_hms_opt(hour, 0, 0)
        .with_context(|| format!("invalid hour {}", hour))
}
