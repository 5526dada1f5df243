// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use piliseed_app::{FarmerInput, HistorySession, LocationRef, SensorId, SessionId, User, UserId};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Every route shape the client knows, one concrete path each.
pub const GRAMMAR_ROUTES: [&str; 16] = [
    "/",
    "/chat",
    "/settings",
    "/sensor/s-9/history",
    "/greenhouse/xyz",
    "/greenhouse/xyz/crops",
    "/greenhouse/xyz/crops/2",
    "/history",
    "/history/abc123",
    "/history/abc123/context",
    "/history/abc123/chat",
    "/history/abc123/filter",
    "/history/abc123/crops/0",
    "/history/abc123/filters",
    "/history/filter/f-7",
    "/history/filter/f-7/crop/3",
];

const FIRST_NAMES: [&str; 10] = [
    "Maria", "Jose", "Ana", "Juan", "Liza", "Ramon", "Celia", "Paolo", "Rosa", "Dante",
];
const LAST_NAMES: [&str; 10] = [
    "Santos", "Reyes", "Cruz", "Bautista", "Ocampo", "Garcia", "Mendoza", "Torres", "Flores",
    "Villanueva",
];

const TOWNS: [(&str, &str); 8] = [
    ("Cabanatuan", "Cabanatuan City, Nueva Ecija"),
    ("La Trinidad", "La Trinidad, Benguet"),
    ("Tarlac", "Tarlac City, Tarlac"),
    ("Malaybalay", "Malaybalay City, Bukidnon"),
    ("Lipa", "Lipa City, Batangas"),
    ("Koronadal", "Koronadal City, South Cotabato"),
    ("Ilagan", "Ilagan City, Isabela"),
    ("Tagum", "Tagum City, Davao del Norte"),
];

const CROP_CATEGORIES: [&str; 5] = ["Vegetables", "Fruits", "Grains", "Herbs", "Legumes"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator for users and recommendation sessions.
#[derive(Debug, Clone)]
pub struct FarmFaker {
    rng: DeterministicRng,
    counter: u32,
}

impl FarmFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            counter: 0,
        }
    }

    pub fn user(&mut self) -> User {
        self.counter += 1;
        User {
            user_id: UserId::new(format!("u-{:04}", self.counter)),
            first_name: self.pick(&FIRST_NAMES).to_owned(),
            last_name: self.pick(&LAST_NAMES).to_owned(),
        }
    }

    /// Sessions alternate between the bare-string and object location forms.
    pub fn history_session(&mut self) -> HistorySession {
        self.counter += 1;
        let (name, full) = TOWNS[self.rng.int_n(TOWNS.len())];
        let location = if self.rng.bool() {
            LocationRef::Text(name.to_owned())
        } else {
            LocationRef::Structured {
                name: name.to_owned(),
                full: full.to_owned(),
            }
        };
        let total_crops = 3 + self.int_n(8) as u32;
        let planted_count = self.int_n(total_crops as usize + 1) as u32;
        let hours_back = i64::from(self.counter) * 7;
        let timestamp = (reference_now() - Duration::hours(hours_back))
            .format(&Rfc3339)
            .unwrap_or_else(|_| fixture_datetime().to_owned());

        HistorySession {
            id: SessionId::new(format!("sess-{:04}", self.counter)),
            timestamp,
            sensor_id: Some(SensorId::new(format!("sensor-{}", 1 + self.int_n(4)))),
            sensor_name: format!("Greenhouse {}", 1 + self.int_n(4)),
            location: Some(location),
            total_crops,
            planted_count,
            farmer_input: Some(FarmerInput {
                crop_category: self.pick(&CROP_CATEGORIES).to_owned(),
                budget_php: (5 + self.int_n(96)) as f64 * 1_000.0,
                waiting_tolerance_days: 30 + self.int_n(120) as u32,
                land_size_ha: (1 + self.int_n(40)) as f64 / 4.0,
                manpower: 1 + self.int_n(10) as u32,
            }),
        }
    }

    pub fn history(&mut self, count: usize) -> Vec<HistorySession> {
        (0..count).map(|_| self.history_session()).collect()
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("piliseed.db");
    Ok((dir, db_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn sample_user() -> User {
    User {
        user_id: UserId::new("u-42"),
        first_name: "Maria".to_owned(),
        last_name: "Santos".to_owned(),
    }
}

/// Body of `GET /recommendations/history/all` for the given sessions.
pub fn history_body(sessions: &[HistorySession]) -> Result<String> {
    serde_json::to_string(&serde_json::json!({ "history": sessions }))
        .context("encode history fixture")
}

/// Body of `POST /users/register` for the given user.
pub fn register_body(user: &User) -> Result<String> {
    serde_json::to_string(user).context("encode user fixture")
}

fn reference_now() -> OffsetDateTime {
    OffsetDateTime::parse(fixture_datetime(), &Rfc3339).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
