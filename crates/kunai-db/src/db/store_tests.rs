use std::cell::Cell;

use rusqlite::Connection;

use super::query::predicate::{Predicate, SearchRequest};
use super::schema::FieldSchema;
use super::store::{IndexStore, ReindexSource};
use crate::error::DbError;
use crate::model::{IndexRecord, IndexValue};

/// Reindex source backed by a fixed record list.
struct Fixed {
    records: Vec<IndexRecord>,
    calls: Cell<usize>,
}

impl Fixed {
    fn new(records: Vec<IndexRecord>) -> Self {
        Self {
            records,
            calls: Cell::new(0),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl ReindexSource for Fixed {
    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.records.is_empty())
    }

    fn records(&self, schema: &FieldSchema) -> anyhow::Result<Vec<IndexRecord>> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(schema.len(), 5);
        Ok(self.records.clone())
    }
}

struct Failing;

impl ReindexSource for Failing {
    fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn records(&self, _schema: &FieldSchema) -> anyhow::Result<Vec<IndexRecord>> {
        anyhow::bail!("object store unavailable")
    }
}

/// Reindex source whose first `records` call fails.
struct FailsOnce {
    inner: Fixed,
    failed: Cell<bool>,
}

impl FailsOnce {
    fn new(records: Vec<IndexRecord>) -> Self {
        Self {
            inner: Fixed::new(records),
            failed: Cell::new(false),
        }
    }
}

impl ReindexSource for FailsOnce {
    fn is_empty(&self) -> anyhow::Result<bool> {
        self.inner.is_empty()
    }

    fn records(&self, schema: &FieldSchema) -> anyhow::Result<Vec<IndexRecord>> {
        if !self.failed.replace(true) {
            anyhow::bail!("object store briefly unavailable");
        }
        self.inner.records(schema)
    }
}

fn schema() -> FieldSchema {
    FieldSchema::parse("dtstart, dtend, uid, summary, organizer").unwrap()
}

fn record(href: &str, start: i64, end: i64, uid: &str, summary: Option<&str>) -> IndexRecord {
    IndexRecord::new(
        href,
        false,
        vec![
            IndexValue::Instant(start),
            IndexValue::Instant(end),
            IndexValue::from(uid),
            IndexValue::from(summary.map(str::to_owned)),
            IndexValue::Null,
        ],
    )
}

fn recurring(href: &str, start: i64, end: i64) -> IndexRecord {
    IndexRecord {
        recurrent: true,
        ..record(href, start, end, href, None)
    }
}

fn open_store(dir: &tempfile::TempDir) -> IndexStore {
    let mut store = IndexStore::new(dir.path(), schema());
    store.open(&Fixed::empty()).unwrap();
    store
}

fn window(store: &mut IndexStore, start: i64, end: i64) -> Vec<String> {
    let request = SearchRequest::new().range_start(start).range_end(end);
    store.search(&Predicate::translate(&request)).unwrap()
}

// 2013-09-01T16:00:00Z .. 17:00:00Z
const E1_START: i64 = 1_378_051_200;
const E1_END: i64 = 1_378_054_800;
const DAY: i64 = 86_400;
// 2013-09-01T00:00:00Z
const SEPT_1: i64 = 1_377_993_600;

#[test_log::test]
fn operations_on_closed_store_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = IndexStore::new(dir.path(), schema());

    assert!(!store.is_open());
    assert!(matches!(store.list_all(), Err(DbError::NotOpen)));
    assert!(matches!(
        store.upsert(&record("a.ics", 0, 1, "a", None)),
        Err(DbError::NotOpen)
    ));
    assert!(matches!(store.delete(None), Err(DbError::NotOpen)));
    assert!(!store.path().exists());
}

#[test_log::test]
fn open_creates_database_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = IndexStore::new(dir.path().join("calendar"), schema());

    store.open(&Fixed::empty()).unwrap();
    store.open(&Fixed::empty()).unwrap();

    assert!(store.is_open());
    assert!(store.path().ends_with(".Kunai.index.db"));
    assert!(store.path().exists());
    assert!(store.list_all().unwrap().is_empty());
}

#[test_log::test]
fn new_database_is_filled_from_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = Fixed::new(vec![record("a.ics", 0, 1, "a", None)]);
    let mut store = IndexStore::new(dir.path(), schema());

    store.open(&source).unwrap();

    assert_eq!(source.calls.get(), 1);
    assert_eq!(store.list_all().unwrap(), source.records);
}

#[test_log::test]
fn valid_database_is_not_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.upsert(&record("kept.ics", 0, 1, "kept", None)).unwrap();
    store.close().unwrap();

    let source = Fixed::new(vec![record("other.ics", 0, 1, "other", None)]);
    store.open(&source).unwrap();

    assert_eq!(source.calls.get(), 0);
    assert_eq!(store.list_all().unwrap()[0].href, "kept.ics");
}

#[test_log::test]
fn upsert_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);

    store
        .upsert(&record("event1.ics", E1_START, E1_END, "event1", Some("Event")))
        .unwrap();
    let updated = record(
        "event1.ics",
        E1_START + 365 * DAY,
        E1_END + 365 * DAY + 2 * 3600,
        "event1",
        Some("Event"),
    );
    store.upsert(&updated).unwrap();

    assert_eq!(store.list_all().unwrap(), [updated]);
}

#[test_log::test]
fn delete_one_and_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .bulk_load(&[
            record("a.ics", 0, 1, "a", None),
            record("b.ics", 0, 1, "b", None),
            record("c.ics", 0, 1, "c", None),
        ])
        .unwrap();

    store.delete(Some("b.ics")).unwrap();
    let hrefs: Vec<String> = store.list_all().unwrap().into_iter().map(|r| r.href).collect();
    assert_eq!(hrefs, ["a.ics", "c.ics"]);

    store.delete(None).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}

#[test_log::test]
fn bulk_load_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let misshapen = IndexRecord::new("bad.ics", false, vec![IndexValue::Null]);

    let err = store
        .bulk_load(&[record("a.ics", 0, 1, "a", None), misshapen])
        .unwrap_err();

    assert!(matches!(err, DbError::RecordShape { .. }));
    assert!(store.list_all().unwrap().is_empty());
}

#[test_log::test]
fn corrupted_version_triggers_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .upsert(&record("stale.ics", 0, 1, "stale", None))
        .unwrap();
    store.close().unwrap();

    Connection::open(store.path())
        .unwrap()
        .execute_batch("UPDATE index_version SET version = '0'")
        .unwrap();

    let fresh = vec![
        record("event1.ics", E1_START, E1_END, "event1", Some("Event")),
        recurring("weekly.ics", 0, 1),
    ];
    let source = Fixed::new(fresh.clone());
    store.open(&source).unwrap();

    assert_eq!(source.calls.get(), 1);
    assert_eq!(store.list_all().unwrap(), fresh);
}

#[test_log::test]
fn corrupted_field_metadata_triggers_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.close().unwrap();

    Connection::open(store.path())
        .unwrap()
        .execute_batch("DELETE FROM index_fields WHERE field = 'summary'")
        .unwrap();

    let source = Fixed::new(vec![record("a.ics", 0, 1, "a", Some("A"))]);
    store.open(&source).unwrap();

    assert_eq!(source.calls.get(), 1);
    assert_eq!(store.list_all().unwrap(), source.records);
}

#[test_log::test]
fn dropped_record_table_triggers_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.close().unwrap();

    Connection::open(store.path())
        .unwrap()
        .execute_batch("DROP TABLE index_records")
        .unwrap();

    store.open(&Fixed::empty()).unwrap();

    assert!(store.list_all().unwrap().is_empty());
}

#[test_log::test]
fn schema_change_rebuilds_with_new_columns() {
    let dir = tempfile::tempdir().unwrap();
    let mut narrow = IndexStore::new(dir.path(), FieldSchema::default());
    narrow.open(&Fixed::empty()).unwrap();
    narrow
        .upsert(&IndexRecord::new(
            "a.ics",
            false,
            vec![IndexValue::Null, IndexValue::Null, IndexValue::from("a")],
        ))
        .unwrap();
    narrow.close().unwrap();

    let source = Fixed::new(vec![record("a.ics", 0, 1, "a", Some("Summary"))]);
    let mut wide = IndexStore::new(dir.path(), schema());
    wide.open(&source).unwrap();

    assert_eq!(source.calls.get(), 1);
    assert_eq!(wide.list_all().unwrap(), source.records);
}

#[test_log::test]
fn failed_rebuild_leaves_store_closed() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = IndexStore::new(dir.path(), schema());

    let err = store.open(&Failing).unwrap_err();

    assert!(matches!(err, DbError::ReindexError(_)));
    assert!(!store.is_open());
    assert!(matches!(store.list_all(), Err(DbError::NotOpen)));
}

#[test_log::test]
fn reopen_after_failed_rebuild_reindexes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = IndexStore::new(dir.path(), schema());
    let source = FailsOnce::new(vec![record("a.ics", 0, 1, "a", Some("Lunch"))]);

    assert!(matches!(store.open(&source), Err(DbError::ReindexError(_))));
    assert!(!store.is_open());

    store.open(&source).unwrap();

    assert_eq!(store.list_all().unwrap(), source.inner.records);
}

#[test_log::test]
fn failed_rebuild_keeps_existing_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.upsert(&record("a.ics", 0, 1, "a", None)).unwrap();

    assert!(matches!(store.rebuild(&Failing), Err(DbError::ReindexError(_))));

    assert_eq!(store.list_all().unwrap(), [record("a.ics", 0, 1, "a", None)]);
}

#[test_log::test]
fn reads_release_their_locks() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store.upsert(&record("a.ics", 0, 1, "a", None)).unwrap();

    assert_eq!(store.list_all().unwrap().len(), 1);
    assert_eq!(window(&mut store, 0, 1), ["a.ics"]);

    let other = Connection::open(store.path()).unwrap();
    other
        .busy_timeout(std::time::Duration::ZERO)
        .unwrap();
    other
        .execute("DELETE FROM index_records WHERE href = 'a.ics'", [])
        .unwrap();

    assert!(store.list_all().unwrap().is_empty());
}

#[test_log::test]
fn single_event_time_range() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .upsert(&record("event1.ics", E1_START, E1_END, "event1", Some("Event")))
        .unwrap();

    assert_eq!(window(&mut store, SEPT_1, SEPT_1 + DAY - 1), ["event1.ics"]);
    assert!(window(&mut store, SEPT_1 + DAY, SEPT_1 + 2 * DAY - 1).is_empty());
}

#[test_log::test]
fn time_range_overlap_and_recurrence() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .bulk_load(&[record("span.ics", 1000, 2000, "span", None), recurring("rec.ics", 0, 1)])
        .unwrap();

    for (start, end) in [(500, 1500), (1500, 2500), (1200, 1800), (0, 3000), (2000, 3000), (0, 1000)] {
        assert_eq!(
            window(&mut store, start, end),
            ["rec.ics", "span.ics"],
            "window {start}..{end}"
        );
    }
    for (start, end) in [(0, 999), (2001, 3000)] {
        assert_eq!(window(&mut store, start, end), ["rec.ics"], "window {start}..{end}");
    }
}

#[test_log::test]
fn negation_includes_null_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .bulk_load(&[
            record("a.ics", 0, 1, "a", Some("Lunch")),
            record("b.ics", 0, 1, "b", Some("Team lunch")),
            record("c.ics", 0, 1, "c", None),
            record("d.ics", 0, 1, "d", Some("Standup")),
        ])
        .unwrap();

    let request = SearchRequest::new().not_contains("summary", "lunch");
    let hrefs = store.search(&Predicate::translate(&request)).unwrap();

    assert_eq!(hrefs, ["c.ics", "d.ics"]);
}

#[test_log::test]
fn combined_text_conditions() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    let records: Vec<IndexRecord> = (1..=5)
        .map(|i| {
            record(
                &format!("event{i}.ics"),
                E1_START,
                E1_END,
                &format!("event{i}"),
                Some(format!("Event{i}").as_str()),
            )
        })
        .collect();
    store.bulk_load(&records).unwrap();

    let request = SearchRequest::new()
        .contains("uid", "event")
        .not_contains("summary", "Event4");
    let hrefs = store.search(&Predicate::translate(&request)).unwrap();

    assert_eq!(hrefs, ["event1.ics", "event2.ics", "event3.ics", "event5.ics"]);
}

#[test_log::test]
fn empty_request_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(&dir);
    store
        .bulk_load(&[record("b.ics", 0, 1, "b", None), record("a.ics", 0, 1, "a", None)])
        .unwrap();

    let hrefs = store
        .search(&Predicate::translate(&SearchRequest::new()))
        .unwrap();

    assert_eq!(hrefs, ["a.ics", "b.ics"]);
}

#[test_log::test]
fn from_config_uses_file_name_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let config = kunai_core::config::IndexConfig {
        fields: "dtstart, dtend, uid, summary, organizer".to_owned(),
        file_name: "custom.db".to_owned(),
        trace_sql: true,
    };

    let mut store = IndexStore::from_config(dir.path(), &config).unwrap();
    store.open(&Fixed::empty()).unwrap();

    assert_eq!(store.path(), dir.path().join("custom.db"));
    assert_eq!(store.schema(), &schema());
}
