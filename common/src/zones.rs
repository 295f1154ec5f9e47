//! Fixed-offset city table served by the world clock.
//!
//! Offsets are plain minute counts from UTC. Daylight saving is not
//! modelled; each city keeps one offset all year.

use chrono::{DateTime, Duration, Utc};

/// Format used for every rendered time, e.g. `14:32:01`.
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    /// Short code used in request paths (`/za`, `/xml/za`).
    pub code: &'static str,
    /// Human readable title shown on the city page.
    pub title: &'static str,
    pub offset_minutes: i32,
}

const ZONES: &[Zone] = &[
    Zone { code: "za", title: "South Africa", offset_minutes: 2 * 60 },
    Zone { code: "ny", title: "New York", offset_minutes: -5 * 60 },
    Zone { code: "paris", title: "Paris", offset_minutes: 60 },
    Zone { code: "adel", title: "Adelaide", offset_minutes: 9 * 60 + 30 },
    Zone { code: "sao", title: "São Paulo", offset_minutes: -60 },
    Zone { code: "beij", title: "北京 (Beijing)", offset_minutes: 8 * 60 },
    Zone { code: "ndel", title: "नई दिल्ली (New Delhi)", offset_minutes: 5 * 60 + 30 },
    Zone { code: "dub", title: "دبي (Dubai)", offset_minutes: 4 * 60 },
    Zone { code: "mosc", title: "Москва (Moscow)", offset_minutes: 3 * 60 },
    Zone { code: "tok", title: "東京 (Tokyo)", offset_minutes: 9 * 60 },
    // Coordinated Mars Time, pinned as a fixed offset.
    Zone { code: "mars", title: "Mars (MTC)", offset_minutes: -2 * 60 + 1 },
];

impl Zone {
    pub fn all() -> &'static [Zone] {
        ZONES
    }

    pub fn lookup(code: &str) -> Option<&'static Zone> {
        ZONES.iter().find(|z| z.code == code)
    }

    /// Wall-clock time in this zone at the given UTC instant.
    pub fn time_at(&self, now: DateTime<Utc>) -> String {
        (now + Duration::minutes(i64::from(self.offset_minutes)))
            .format(TIME_FORMAT)
            .to_string()
    }

    pub fn now(&self) -> String {
        self.time_at(Utc::now())
    }
}
