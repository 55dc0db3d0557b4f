//! CollectJob - 1 回分の収集実行（オーケストレータ）
//!
//! dates → fetch → (失敗なら ledger に触れず終了) → date 付与 → load → merge
//! → prune → sort → save → report
//!
//! 副作用を持つのはここだけ。実行をまたいだ状態は持たない。

use serde::Serialize;
use tracing::{error, info};

use crate::domain::record::display_id;
use crate::domain::{DedupPolicy, MergeOutcome, RunError, Schedule};
use crate::ports::{Clock, LedgerStore, PayloadSource};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub today: chrono::NaiveDate,
    pub effective_date: String,
    pub record_id: String,
    /// `false` when the dedup policy found the record already present.
    pub inserted: bool,
    /// Records dropped for falling outside the window.
    pub pruned: usize,
    /// Records in the ledger after the run.
    pub total: usize,
}

pub struct CollectJob {
    source: Box<dyn PayloadSource>,
    store: Box<dyn LedgerStore>,
    clock: Box<dyn Clock>,
    dedup: Box<dyn DedupPolicy>,
    schedule: Schedule,
}

impl CollectJob {
    pub fn new(
        source: Box<dyn PayloadSource>,
        store: Box<dyn LedgerStore>,
        clock: Box<dyn Clock>,
        dedup: Box<dyn DedupPolicy>,
        schedule: Schedule,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            dedup,
            schedule,
        }
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        let dates = self
            .schedule
            .resolve(self.clock.now())
            .ok_or(RunError::DateOutOfRange)?;
        info!(today = %dates.today, effective_date = %dates.effective_date, "starting wallpaper collection");

        let payload = match self.source.fetch().await {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "no wallpaper payload, ledger left untouched");
                return Err(err.into());
            }
        };

        let record = payload.with_date(dates.effective_date);
        let record_id = record.id().map(display_id).unwrap_or_default();
        info!(id = %record_id, effective_date = %dates.effective_date, "payload fetched");

        let mut ledger = self.store.load()?;
        let inserted = match ledger.merge(record, self.dedup.as_ref()) {
            MergeOutcome::Inserted => {
                info!(id = %record_id, "wallpaper added");
                true
            }
            MergeOutcome::AlreadyPresent => {
                info!(id = %record_id, policy = self.dedup.name(), "wallpaper already recorded, skipped");
                false
            }
        };

        let pruned = ledger.prune(&dates.window)?;
        ledger.sort();
        self.store.save(&ledger)?;
        info!(records = ledger.len(), pruned, "ledger saved");

        Ok(RunReport {
            today: dates.today,
            effective_date: dates.effective_date.to_string(),
            record_id,
            inserted,
            pruned,
            total: ledger.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::app::JobBuilder;
    use crate::domain::{DataIntegrityError, DateCode, DedupKey, Ledger, Record};
    use crate::impls::{InMemoryLedgerStore, JsonFileLedgerStore, StaticPayloadSource};
    use crate::ports::FixedClock;

    fn schedule() -> Schedule {
        Schedule {
            utc_offset: FixedOffset::east_opt(8 * 3600).unwrap(),
            lookahead_days: 7,
            retention_days: 7,
        }
    }

    /// Noon in UTC+8 on the given civil date.
    fn clock_on(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(y, m, d, 4, 0, 0).unwrap())
    }

    fn rec(v: serde_json::Value) -> Record {
        Record::try_from(v).unwrap()
    }

    fn dates_of(ledger: &Ledger) -> Vec<String> {
        ledger
            .records()
            .iter()
            .filter_map(|r| r.date_str().map(str::to_string))
            .collect()
    }

    /// Shared handle so the test can inspect the store after the job owns it.
    #[derive(Clone)]
    struct SharedStore(Arc<InMemoryLedgerStore>);

    impl LedgerStore for SharedStore {
        fn load(&self) -> Result<Ledger, crate::domain::PersistenceError> {
            self.0.load()
        }

        fn save(&self, ledger: &Ledger) -> Result<(), crate::domain::PersistenceError> {
            self.0.save(ledger)
        }
    }

    fn job(
        payload: StaticPayloadSource,
        store: impl LedgerStore + 'static,
        clock: FixedClock,
        dedup: DedupKey,
    ) -> CollectJob {
        JobBuilder::new(schedule())
            .dedup(dedup)
            .source(payload)
            .store(store)
            .clock(clock)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn bootstrap_creates_ledger_with_effective_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        let payload = rec(json!({"id": "abc", "title": "Dawn"}));

        let report = job(
            StaticPayloadSource::returning(payload),
            JsonFileLedgerStore::new(&path),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(report.effective_date, "20240108");
        assert!(report.inserted);
        assert_eq!(report.total, 1);
        let saved = JsonFileLedgerStore::new(&path).load().unwrap();
        assert_eq!(
            saved.records(),
            &[rec(json!({"id": "abc", "title": "Dawn", "date": "20240108"}))]
        );
    }

    #[tokio::test]
    async fn same_day_reroll_is_suppressed_under_date_key() {
        let store = SharedStore(Arc::new(InMemoryLedgerStore::with_ledger(
            Ledger::from_records(vec![rec(json!({"id": "x", "date": "20240108"}))]),
        )));

        let report = job(
            StaticPayloadSource::returning(rec(json!({"id": "y"}))),
            store.clone(),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap();

        assert!(!report.inserted);
        assert_eq!(
            store.0.snapshot().unwrap().records(),
            &[rec(json!({"id": "x", "date": "20240108"}))]
        );
    }

    #[tokio::test]
    async fn same_day_reroll_is_kept_under_id_date_key() {
        let store = SharedStore(Arc::new(InMemoryLedgerStore::with_ledger(
            Ledger::from_records(vec![rec(json!({"id": "x", "date": "20240108"}))]),
        )));

        let report = job(
            StaticPayloadSource::returning(rec(json!({"id": "y"}))),
            store.clone(),
            clock_on(2024, 1, 1),
            DedupKey::IdDate,
        )
        .run()
        .await
        .unwrap();

        assert!(report.inserted);
        assert_eq!(report.total, 2);
        assert_eq!(dates_of(&store.0.snapshot().unwrap()), vec!["20240108", "20240108"]);
    }

    #[tokio::test]
    async fn repeated_runs_are_idempotent_under_both_keys() {
        for key in [DedupKey::Date, DedupKey::IdDate] {
            let store = SharedStore(Arc::new(InMemoryLedgerStore::new()));
            let job = job(
                StaticPayloadSource::returning(rec(json!({"id": "abc"}))),
                store.clone(),
                clock_on(2024, 1, 1),
                key,
            );

            let first = job.run().await.unwrap();
            let after_first = store.0.snapshot();
            let second = job.run().await.unwrap();

            assert!(first.inserted);
            assert!(!second.inserted);
            assert_eq!(store.0.snapshot(), after_first);
            assert_eq!(second.total, 1);
        }
    }

    #[tokio::test]
    async fn run_prunes_to_window_and_sorts() {
        let all_days: Vec<_> = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .iter_days()
            .take_while(|d| *d <= NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .collect();
        // newest first so the sort has work to do
        let records = all_days
            .iter()
            .rev()
            .map(|d| rec(json!({"id": format!("w{d}"), "date": DateCode::new(*d).to_string()})))
            .collect();
        let store = SharedStore(Arc::new(InMemoryLedgerStore::with_ledger(
            Ledger::from_records(records),
        )));

        let report = job(
            StaticPayloadSource::returning(rec(json!({"id": "new"}))),
            store.clone(),
            clock_on(2024, 1, 15),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap();

        let expected: Vec<String> = (8..=22).map(|d| format!("202401{d:02}")).collect();
        assert_eq!(dates_of(&store.0.snapshot().unwrap()), expected);
        assert_eq!(report.total, 15);
        assert_eq!(report.pruned, all_days.len() - 15);
        assert!(!report.inserted);
    }

    #[tokio::test]
    async fn entries_twenty_days_out_are_pruned() {
        let store = SharedStore(Arc::new(InMemoryLedgerStore::with_ledger(
            Ledger::from_records(vec![
                rec(json!({"id": "past", "date": "20231226"})),
                rec(json!({"id": "future", "date": "20240204"})),
            ]),
        )));

        job(
            StaticPayloadSource::returning(rec(json!({"id": "abc"}))),
            store.clone(),
            clock_on(2024, 1, 15),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap();

        let saved = store.0.snapshot().unwrap();
        assert_eq!(dates_of(&saved), vec!["20240122"]);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        let before = "[\n  {\n    \"id\": \"x\",\n    \"date\": \"20240108\"\n  }\n]\n";
        fs::write(&path, before).unwrap();

        let err = job(
            StaticPayloadSource::failing("offline"),
            JsonFileLedgerStore::new(&path),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap_err();

        assert!(err.is_fetch_failure());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn fetch_failure_on_first_run_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");

        let err = job(
            StaticPayloadSource::failing("offline"),
            JsonFileLedgerStore::new(&path),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap_err();

        assert!(err.is_fetch_failure());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn corrupt_stored_date_is_fatal_and_not_saved() {
        let original = Ledger::from_records(vec![
            rec(json!({"id": "x", "date": "20240110"})),
            rec(json!({"id": "y", "date": "soon"})),
        ]);
        let store = SharedStore(Arc::new(InMemoryLedgerStore::with_ledger(original.clone())));

        let err = job(
            StaticPayloadSource::returning(rec(json!({"id": "abc"}))),
            store.clone(),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::DataIntegrity(DataIntegrityError::InvalidDate { index: 1, .. })
        ));
        assert_eq!(store.0.save_count(), 0);
        assert_eq!(store.0.snapshot(), Some(original));
    }

    #[tokio::test]
    async fn corrupt_file_is_fatal_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        fs::write(&path, "{ not json").unwrap();

        let err = job(
            StaticPayloadSource::returning(rec(json!({"id": "abc"}))),
            JsonFileLedgerStore::new(&path),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::Persistence(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let err = job(
            StaticPayloadSource::returning(rec(json!({"id": "abc"}))),
            InMemoryLedgerStore::new().failing_saves(),
            clock_on(2024, 1, 1),
            DedupKey::Date,
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::Persistence(_)));
        assert!(!err.is_fetch_failure());
    }

    #[tokio::test]
    async fn persisted_ledger_stays_sorted_across_runs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");

        for day in [3, 1, 2, 5, 4] {
            job(
                StaticPayloadSource::returning(rec(json!({"id": format!("d{day}")}))),
                JsonFileLedgerStore::new(&path),
                clock_on(2024, 1, day),
                DedupKey::Date,
            )
            .run()
            .await
            .unwrap();
        }

        // the run on the 5th filed 20240112; the later run on the 4th prunes it
        let dates = dates_of(&JsonFileLedgerStore::new(&path).load().unwrap());
        assert_eq!(dates, vec!["20240108", "20240109", "20240110", "20240111"]);
    }
}
