use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf::{Record, Shelf};

pub const PERFORMANCE_KEY: &str = "wordPerformance";

/// How a single word has fared so far. Only exists once the word was attempted at least once.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordStat {
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[tsify(type = "string | null")]
    pub last_incorrect_at: Option<DateTime<Utc>>,
}

impl WordStat {
    pub fn attempts(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }

    /// Share of attempts that were wrong. Zero when there were no attempts.
    pub fn error_rate(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            attempts => f64::from(self.incorrect_count) / f64::from(attempts),
        }
    }
}

type Stats = BTreeMap<String, BTreeMap<String, WordStat>>;

#[derive(Clone, Debug, Default, PartialEq)]
struct StoredStats(Stats);

#[derive(Serialize, Deserialize)]
#[serde(tag = "version")]
enum VersionedStats {
    V1 { lists: Stats },
}

impl Record for StoredStats {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(VersionedStats::V1 {
            lists: self.0.clone(),
        })
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<VersionedStats>(json.clone()).map(|versioned| match versioned {
            VersionedStats::V1 { lists } => StoredStats(lists),
        })
    }
}

/// Per-word statistics, keyed by list id then word id, written through to the shelf on every change.
pub struct PerformanceStore {
    stats: Stats,
    shelf: Shelf,
}

impl PerformanceStore {
    pub fn load(shelf: Shelf) -> Self {
        let StoredStats(stats) = shelf.load(PERFORMANCE_KEY);
        log::info!("Loaded performance stats for {} lists", stats.len());
        Self { stats, shelf }
    }

    pub fn record(&mut self, list_id: &str, word_id: &str, correct: bool, now: DateTime<Utc>) {
        let stat = self
            .stats
            .entry(list_id.to_string())
            .or_default()
            .entry(word_id.to_string())
            .or_default();
        if correct {
            stat.correct_count += 1;
        } else {
            stat.incorrect_count += 1;
            stat.last_incorrect_at = Some(now);
        }
        log::debug!(
            "Recorded {} answer for word {word_id} of list {list_id}",
            if correct { "correct" } else { "incorrect" }
        );
        self.persist();
    }

    pub fn cascade_delete_list(&mut self, list_id: &str) {
        if self.stats.remove(list_id).is_some() {
            log::info!("Dropped performance stats of list {list_id}");
            self.persist();
        }
    }

    pub fn stats_for(&self, list_id: &str, word_id: &str) -> Option<&WordStat> {
        self.stats.get(list_id)?.get(word_id)
    }

    pub fn stats_for_list(&self, list_id: &str) -> Option<&BTreeMap<String, WordStat>> {
        self.stats.get(list_id)
    }

    pub fn shelf_mut(&mut self) -> &mut Shelf {
        &mut self.shelf
    }

    fn persist(&mut self) {
        let record = StoredStats(self.stats.clone());
        if let Err(e) = self.shelf.save(PERFORMANCE_KEY, &record, None) {
            log::error!("Could not persist performance stats: {e}");
        }
    }
}
