//! Records `tracing` events from a market run into column tables.
//!
//! Each event target (`supply`, `purchase`, `price`, ...) becomes a table and
//! each field becomes a typed column. Columns are created the first time a
//! field shows up; rows that lack a field are padded with the column's
//! zero value so every column in a table has the same length.
//!
//! ```ignore
//! let recorder = instrument::ScopedRecorder::new();
//! sim.run(&mut NullSink);
//! let tables = recorder.finish();
//! let prices = tables.table("price").unwrap().i64s("price").unwrap();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Id, Metadata, Subscriber};

// === COLUMNS ===

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::U64(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::F64(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            Column::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Column::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Column::F64(v) => v.extend(std::iter::repeat_n(0.0, missing)),
            Column::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            Column::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

// === TABLES ===

/// All events recorded under one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    pub columns: HashMap<String, Column>,
    pub rows: usize,
}

impl EventTable {
    fn pad_columns(&mut self) {
        let rows = self.rows;
        for col in self.columns.values_mut() {
            col.pad_to(rows);
        }
    }

    pub fn u64s(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            Column::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn i64s(&self, name: &str) -> Option<&[i64]> {
        match self.columns.get(name)? {
            Column::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn f64s(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            Column::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn strs(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name)? {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Tables keyed by event target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    pub tables: HashMap<String, EventTable>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Row count for a target, 0 if nothing was recorded under it.
    pub fn rows(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, |t| t.rows)
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

// === SUBSCRIBER ===

struct RowVisitor<'a> {
    table: &'a mut EventTable,
}

impl RowVisitor<'_> {
    fn column(&mut self, field: &Field, empty: impl FnOnce(usize) -> Column) -> &mut Column {
        let rows = self.table.rows;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| empty(rows))
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let Column::U64(v) = self.column(field, |n| Column::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let Column::I64(v) = self.column(field, |n| Column::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Column::F64(v) = self.column(field, |n| Column::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let Column::Bool(v) = self.column(field, |n| Column::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let Column::Str(v) = self.column(field, |n| Column::Str(vec![String::new(); n])) {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Subscriber that appends every info-level event to the thread-local
/// [`Recorder`]. Spans are ignored.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();

            event.record(&mut RowVisitor { table: &mut *table });
            table.rows += 1;
            table.pad_columns();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Take everything recorded on this thread, leaving it empty.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Records events on the current thread for as long as it is alive.
///
/// Creating one clears anything already recorded on this thread; the
/// subscriber is uninstalled on drop.
pub struct ScopedRecorder {
    _guard: DefaultGuard,
}

impl ScopedRecorder {
    pub fn new() -> Self {
        clear();
        Self {
            _guard: tracing::subscriber::set_default(TableSubscriber),
        }
    }

    /// Stop recording and return the tables.
    pub fn finish(self) -> Recorder {
        let recorder = drain();
        drop(self);
        recorder
    }
}

impl Default for ScopedRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_padded() {
        let recorder = ScopedRecorder::new();
        tracing::info!(target: "supply", tick = 0u64, quantity = 12u64);
        tracing::info!(target: "supply", tick = 1u64, note = "late", share = 0.25f64);
        tracing::info!(target: "supply", tick = 2u64, quantity = 5u64);
        let recorded = recorder.finish();

        let table = recorded.table("supply").expect("supply table");
        assert_eq!(table.rows, 3);
        assert_eq!(table.u64s("tick").unwrap(), &[0, 1, 2]);
        assert_eq!(table.u64s("quantity").unwrap(), &[12, 0, 5]);
        assert_eq!(
            table.strs("note").unwrap(),
            &[String::new(), "late".to_string(), String::new()]
        );
        assert_eq!(table.f64s("share").unwrap(), &[0.0, 0.25, 0.0]);
    }

    #[test]
    fn test_targets_split_into_tables() {
        let recorder = ScopedRecorder::new();
        tracing::info!(target: "price", tick = 0u64, price = 41i64);
        tracing::info!(target: "purchase", tick = 0u64, consumer_id = 3u32);
        tracing::info!(target: "price", tick = 1u64, price = 42i64);
        let recorded = recorder.finish();

        assert_eq!(recorded.rows("price"), 2);
        assert_eq!(recorded.rows("purchase"), 1);
        assert_eq!(recorded.rows("supply"), 0);
        assert_eq!(
            recorded.table("price").unwrap().i64s("price").unwrap(),
            &[41, 42]
        );
        // u32 fields arrive as u64
        assert_eq!(
            recorded.table("purchase").unwrap().u64s("consumer_id").unwrap(),
            &[3]
        );
    }

    #[test]
    fn test_debug_events_ignored() {
        let recorder = ScopedRecorder::new();
        tracing::debug!(target: "price", tick = 0u64);
        let recorded = recorder.finish();
        assert!(recorded.tables.is_empty());
    }

    #[test]
    fn test_nothing_recorded_after_finish() {
        let recorder = ScopedRecorder::new();
        tracing::info!(target: "price", tick = 0u64);
        let recorded = recorder.finish();
        tracing::info!(target: "price", tick = 1u64);

        assert_eq!(recorded.rows("price"), 1);
        assert!(drain().tables.is_empty());
    }
}
