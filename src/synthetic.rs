use chrono::{Days, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};

use crate::format_number;
use crate::platform::Platform;
use crate::record::{RawRecord, DATE_FIELD, ENTITY_FIELD, NAME_FIELD};

const FIRST_NAMES: [&str; 12] = [
    "Ava", "Noah", "Mia", "Liam", "Zoe", "Ethan", "Ivy", "Lucas", "Nora", "Owen", "Ruby", "Kai",
];
const LAST_NAMES: [&str; 8] = [
    "Santos", "Reyes", "Cruz", "Lim", "Tan", "Garcia", "Navarro", "Bautista",
];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub students: usize,
    pub days: u32,
    pub start: NaiveDate,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            students: 12,
            days: 30,
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            seed: 7,
        }
    }
}

struct Account {
    username: Option<String>,
    followers: f64,
    daily_gain: f64,
}

/// Generates a raw snapshot log shaped like the tracking sheet.
///
/// The output is deterministic for a seed and deliberately dirty: mixed
/// number formats, blank and `N/A` cells, skipped days, repeated same-day
/// rows and ISO timestamps with a zone marker.
pub fn generate_synthetic_log(config: &SyntheticConfig, platforms: &[Platform]) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut roster: Vec<(String, String, Vec<Account>)> = (0..config.students)
        .map(|idx| {
            let name = format!(
                "{} {}",
                FIRST_NAMES[idx % FIRST_NAMES.len()],
                LAST_NAMES[(idx / FIRST_NAMES.len() + idx) % LAST_NAMES.len()]
            );
            let handle = name.to_lowercase().replace(' ', "_");
            let accounts = platforms
                .iter()
                .map(|platform| Account {
                    username: if rng.gen::<f64>() < 0.75 {
                        Some(format!("{}.{}", handle, platform.code.to_lowercase()))
                    } else {
                        None
                    },
                    followers: rng.gen_range(50.0..25_000.0_f64).round(),
                    daily_gain: rng.gen_range(-5.0..120.0_f64),
                })
                .collect();
            (format!("S{:03}", idx + 1), name, accounts)
        })
        .collect();

    let mut rows = Vec::new();
    for day_idx in 0..config.days {
        let Some(day) = config.start.checked_add_days(Days::new(u64::from(day_idx))) else {
            break;
        };

        for (entity_id, name, accounts) in roster.iter_mut() {
            // Irregular sampling: some days a student is simply not scraped.
            if day_idx > 0 && rng.gen::<f64>() < 0.1 {
                continue;
            }

            for account in accounts.iter_mut() {
                account.followers = (account.followers + account.daily_gain * rng.gen_range(0.0..2.0)).max(0.0).round();
            }

            let row = build_row(&mut rng, entity_id, name, day, platforms, accounts);
            rows.push(row.clone());

            if rng.gen::<f64>() < 0.05 {
                let mut repeat = row;
                for (platform, account) in platforms.iter().zip(accounts.iter()) {
                    repeat.insert(
                        platform.field("Followers"),
                        json!(account.followers + rng.gen_range(1.0..25.0_f64).round()),
                    );
                }
                rows.push(repeat);
            }
        }
    }

    tracing::debug!(rows = rows.len(), seed = config.seed, "synthetic log generated");
    rows
}

fn build_row(
    rng: &mut StdRng,
    entity_id: &str,
    name: &str,
    day: NaiveDate,
    platforms: &[Platform],
    accounts: &[Account],
) -> RawRecord {
    let mut row = RawRecord::new();
    row.insert(ENTITY_FIELD.to_string(), json!(entity_id));
    row.insert(NAME_FIELD.to_string(), json!(name));
    let date = if rng.gen::<f64>() < 0.3 {
        format!("{}T09:30:00Z", day)
    } else {
        day.to_string()
    };
    row.insert(DATE_FIELD.to_string(), json!(date));

    for (platform, account) in platforms.iter().zip(accounts.iter()) {
        row.insert(
            platform.field("Username"),
            json!(account.username.clone().unwrap_or_default()),
        );
        if account.username.is_none() {
            continue;
        }

        row.insert(platform.field("Followers"), messy_count(rng, account.followers));
        let likes = (account.followers * rng.gen_range(0.005..0.12)).round();
        row.insert(platform.field("LaPostLikes"), messy_count(rng, likes));
        let comments = (likes * rng.gen_range(0.01..0.2)).round();
        row.insert(platform.field("LaPostComments"), messy_count(rng, comments));
        row.insert(platform.field("LaPostDate"), json!(format!("{}T18:05:00Z", day)));
        row.insert(
            platform.field("LaPostCaption"),
            json!(format!("Day {} of the bootcamp challenge with {}", day.format("%j"), name)),
        );
        row.insert(
            platform.field("LaPostURL"),
            json!(format!("https://example.com/{}/{}", platform.code.to_lowercase(), day)),
        );
    }

    row
}

fn messy_count(rng: &mut StdRng, value: f64) -> Value {
    let roll = rng.gen::<f64>();
    if roll < 0.03 {
        json!("N/A")
    } else if roll < 0.06 {
        json!("")
    } else if roll < 0.3 {
        json!(format_number(value))
    } else if roll < 0.45 && value >= 10_000.0 {
        json!(format!("{:.1}K", value / 1_000.0))
    } else if roll < 0.7 {
        json!(value)
    } else {
        json!(value.to_string())
    }
}
