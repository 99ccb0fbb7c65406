//! In-memory record store.
//!
//! This is a fallback when PostgreSQL is not available.
//! Rows are kept as JSON documents per table; declared unique column sets
//! are enforced like a database unique index would.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as Json;
use tokio::sync::{Mutex, RwLock};

use blog_core::RepoError;
use blog_core::ports::{Direction, Filter, Page, Record, Sort, Store, TxFuture, Value};

/// Rows of one table keyed by their serialized primary key.
type Table = BTreeMap<String, Json>;

#[derive(Debug, Clone, Default)]
struct Tables(HashMap<&'static str, Table>);

impl Tables {
    fn table(&self, name: &str) -> Option<&Table> {
        self.0.get(name)
    }

    fn table_mut(&mut self, name: &'static str) -> &mut Table {
        self.0.entry(name).or_default()
    }
}

/// Shared in-process database. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

/// Transaction over an [`InMemoryDatabase`].
///
/// Works on a private copy of the tables; commit writes back only the rows
/// that changed, rollback discards the copy.
pub struct InMemoryTx {
    base: Tables,
    work: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A typed store over this database.
    pub fn store<T: Record>(&self) -> InMemoryStore<T> {
        InMemoryStore {
            db: self.clone(),
            _record: PhantomData,
        }
    }

    async fn begin(&self) -> InMemoryTx {
        let base = self.tables.read().await.clone();
        InMemoryTx {
            work: Mutex::new(base.clone()),
            base,
        }
    }

    async fn commit(&self, tx: InMemoryTx) {
        let work = tx.work.into_inner();
        let mut live = self.tables.write().await;

        for (&name, before) in &tx.base.0 {
            let after = work.table(name);
            for key in before.keys() {
                if after.is_none_or(|t| !t.contains_key(key)) {
                    live.table_mut(name).remove(key);
                }
            }
        }
        for (name, after) in work.0 {
            let before = tx.base.table(name);
            for (key, row) in after {
                if before.and_then(|t| t.get(&key)) != Some(&row) {
                    live.table_mut(name).insert(key, row);
                }
            }
        }
    }

    async fn read<R>(&self, tx: Option<&InMemoryTx>, f: impl FnOnce(&Tables) -> R) -> R {
        match tx {
            Some(tx) => f(&*tx.work.lock().await),
            None => f(&*self.tables.read().await),
        }
    }

    async fn write<R>(&self, tx: Option<&InMemoryTx>, f: impl FnOnce(&mut Tables) -> R) -> R {
        match tx {
            Some(tx) => f(&mut *tx.work.lock().await),
            None => f(&mut *self.tables.write().await),
        }
    }
}

/// Store for one record type over an [`InMemoryDatabase`].
pub struct InMemoryStore<T> {
    db: InMemoryDatabase,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }
}

fn query_err(e: impl Display) -> RepoError {
    RepoError::Query(e.to_string())
}

fn key_of<K: Serialize>(key: &K) -> Result<String, RepoError> {
    serde_json::to_string(key).map_err(query_err)
}

fn encode<T: Record>(record: &T) -> Result<(String, Json), RepoError> {
    let key = key_of(&record.key())?;
    let row = serde_json::to_value(record).map_err(query_err)?;
    Ok((key, row))
}

fn decode<T: Record>(row: &Json) -> Result<T, RepoError> {
    serde_json::from_value(row.clone()).map_err(query_err)
}

fn not_found<T: Record>() -> RepoError {
    RepoError::NotFound { table: T::TABLE }
}

fn check_unique<T: Record>(table: &Table, key: &str, row: &Json) -> Result<(), RepoError> {
    for columns in T::UNIQUE {
        let clash = table.iter().any(|(other_key, other)| {
            other_key != key
                && columns.iter().all(|c| {
                    let value = row.get(*c);
                    value.is_some_and(|v| !v.is_null()) && value == other.get(*c)
                })
        });
        if clash {
            return Err(RepoError::Constraint(format!(
                "duplicate value for unique ({}) on {}",
                columns.join(", "),
                T::TABLE
            )));
        }
    }
    Ok(())
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Text(s) => Json::String(s.clone()),
        Value::Timestamp(t) => Json::String(t.to_rfc3339()),
        Value::Json(j) => j.clone(),
    }
}

fn as_timestamp(field: &Json) -> Option<DateTime<Utc>> {
    field
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn is_null(field: Option<&Json>) -> bool {
    field.is_none_or(Json::is_null)
}

fn matches_value(field: Option<&Json>, value: &Value) -> bool {
    match value {
        Value::Null => is_null(field),
        Value::Bool(b) => field.and_then(Json::as_bool) == Some(*b),
        Value::Int(i) => field.and_then(Json::as_i64) == Some(*i),
        Value::Text(s) => field.and_then(Json::as_str) == Some(s.as_str()),
        Value::Timestamp(t) => field.and_then(as_timestamp) == Some(*t),
        Value::Json(j) => field == Some(j),
    }
}

/// Rejects filters this backend cannot evaluate, whether or not any row exists.
fn check_supported(filter: &Filter) -> Result<(), RepoError> {
    match filter {
        Filter::Raw { sql, .. } => Err(RepoError::Query(format!(
            "raw SQL filters are not supported in memory: {sql}"
        ))),
        Filter::And(filters) => filters.iter().try_for_each(check_supported),
        _ => Ok(()),
    }
}

/// Callers run [`check_supported`] first; a raw filter never matches here.
fn matches(row: &Json, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq(column, value) => matches_value(row.get(column), value),
        Filter::In(column, values) => values.iter().any(|v| matches_value(row.get(column), v)),
        Filter::IsNull(column) => is_null(row.get(column)),
        Filter::IsNotNull(column) => !is_null(row.get(column)),
        Filter::And(filters) => filters.iter().all(|f| matches(row, f)),
        Filter::Raw { .. } => false,
    }
}

/// Ascending order with nulls last, like PostgreSQL.
fn compare_fields(a: Option<&Json>, b: Option<&Json>) -> Ordering {
    match (is_null(a), is_null(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };
    match (a, b) {
        (Json::String(x), Json::String(y)) => match (as_timestamp(a), as_timestamp(b)) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            _ => x.cmp(y),
        },
        (Json::Number(x), Json::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_rows(a: &Json, b: &Json, sort: &Sort) -> Ordering {
    for term in sort.terms() {
        let ord = compare_fields(a.get(&term.column), b.get(&term.column));
        let ord = match term.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn select<T: Record>(
    tables: &Tables,
    filter: &Filter,
    sort: &Sort,
    page: Option<Page>,
) -> Result<Vec<T>, RepoError> {
    check_supported(filter)?;
    let Some(table) = tables.table(T::TABLE) else {
        return Ok(Vec::new());
    };

    let mut rows: Vec<&Json> = table.values().filter(|row| matches(row, filter)).collect();
    rows.sort_by(|a, b| compare_rows(a, b, sort));

    let (offset, limit) = match page {
        Some(p) => (p.offset as usize, p.limit as usize),
        None => (0, usize::MAX),
    };
    rows.into_iter()
        .skip(offset)
        .take(limit)
        .map(decode::<T>)
        .collect()
}

fn replace<T: Record>(tables: &mut Tables, record: &T) -> Result<(), RepoError> {
    let (key, row) = encode(record)?;
    let table = tables.table_mut(T::TABLE);
    if !table.contains_key(&key) {
        return Err(not_found::<T>());
    }
    check_unique::<T>(table, &key, &row)?;
    table.insert(key, row);
    Ok(())
}

#[async_trait]
impl<T: Record> Store<T> for InMemoryStore<T> {
    type Tx = InMemoryTx;

    async fn create(&self, tx: Option<&InMemoryTx>, record: &T) -> Result<(), RepoError> {
        let (key, row) = encode(record)?;
        self.db
            .write(tx, |tables| {
                let table = tables.table_mut(T::TABLE);
                if table.contains_key(&key) {
                    return Err(RepoError::Constraint(format!(
                        "duplicate primary key {key} on {}",
                        T::TABLE
                    )));
                }
                check_unique::<T>(table, &key, &row)?;
                table.insert(key, row);
                Ok(())
            })
            .await
    }

    async fn update(&self, tx: Option<&InMemoryTx>, record: &T) -> Result<(), RepoError> {
        self.db.write(tx, |tables| replace(tables, record)).await
    }

    async fn partial_update(
        &self,
        tx: Option<&InMemoryTx>,
        pk: &T::Key,
        fields: &[(String, Value)],
    ) -> Result<(), RepoError> {
        if fields.is_empty() {
            return Ok(());
        }
        let key = key_of(pk)?;
        self.db
            .write(tx, |tables| {
                let table = tables.table_mut(T::TABLE);
                let mut row = table.get(&key).cloned().ok_or_else(not_found::<T>)?;
                let Some(columns) = row.as_object_mut() else {
                    return Err(RepoError::Query(format!("malformed row in {}", T::TABLE)));
                };
                for (column, value) in fields {
                    let Some(slot) = columns.get_mut(column) else {
                        return Err(RepoError::Query(format!(
                            "unknown column {column} on {}",
                            T::TABLE
                        )));
                    };
                    *slot = to_json(value);
                }
                // The patched row must still be a valid record.
                decode::<T>(&row)?;
                check_unique::<T>(table, &key, &row)?;
                table.insert(key, row);
                Ok(())
            })
            .await
    }

    async fn delete_by_pk(&self, tx: Option<&InMemoryTx>, pk: &T::Key) -> Result<(), RepoError> {
        let key = key_of(pk)?;
        self.db
            .write(tx, |tables| {
                tables
                    .table_mut(T::TABLE)
                    .remove(&key)
                    .map(|_| ())
                    .ok_or_else(not_found::<T>)
            })
            .await
    }

    async fn find_by_pk(&self, tx: Option<&InMemoryTx>, pk: &T::Key) -> Result<T, RepoError> {
        let key = key_of(pk)?;
        self.db
            .read(tx, |tables| {
                tables
                    .table(T::TABLE)
                    .and_then(|t| t.get(&key))
                    .ok_or_else(not_found::<T>)
                    .and_then(decode::<T>)
            })
            .await
    }

    async fn create_many(&self, tx: Option<&InMemoryTx>, records: &[T]) -> Result<(), RepoError> {
        if records.is_empty() {
            return Ok(());
        }
        let rows = records.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        self.db
            .write(tx, |tables| {
                // Validate against a scratch copy so a failing batch inserts nothing.
                let mut staged = tables.table(T::TABLE).cloned().unwrap_or_default();
                for (key, row) in rows {
                    if staged.contains_key(&key) {
                        return Err(RepoError::Constraint(format!(
                            "duplicate primary key {key} on {}",
                            T::TABLE
                        )));
                    }
                    check_unique::<T>(&staged, &key, &row)?;
                    staged.insert(key, row);
                }
                *tables.table_mut(T::TABLE) = staged;
                Ok(())
            })
            .await
    }

    async fn update_many(&self, tx: Option<&InMemoryTx>, records: &[T]) -> Result<(), RepoError> {
        for record in records {
            self.db.write(tx, |tables| replace(tables, record)).await?;
        }
        Ok(())
    }

    async fn delete_many_by_pks(
        &self,
        tx: Option<&InMemoryTx>,
        pks: &[T::Key],
    ) -> Result<(), RepoError> {
        if pks.is_empty() {
            return Ok(());
        }
        let keys = pks.iter().map(key_of).collect::<Result<Vec<_>, _>>()?;
        self.db
            .write(tx, |tables| {
                let table = tables.table_mut(T::TABLE);
                for key in &keys {
                    table.remove(key);
                }
            })
            .await;
        Ok(())
    }

    async fn find_one(
        &self,
        tx: Option<&InMemoryTx>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<T, RepoError> {
        self.db
            .read(tx, |tables| select::<T>(tables, filter, sort, Some(Page::new(1, 0))))
            .await?
            .into_iter()
            .next()
            .ok_or_else(not_found::<T>)
    }

    async fn find_all(
        &self,
        tx: Option<&InMemoryTx>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError> {
        self.db
            .read(tx, |tables| select::<T>(tables, filter, sort, None))
            .await
    }

    async fn find_paginated(
        &self,
        tx: Option<&InMemoryTx>,
        page: Page,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError> {
        self.db
            .read(tx, |tables| select::<T>(tables, filter, sort, Some(page)))
            .await
    }

    async fn count(&self, tx: Option<&InMemoryTx>, filter: &Filter) -> Result<u64, RepoError> {
        self.db
            .read(tx, |tables| {
                check_supported(filter)?;
                let Some(table) = tables.table(T::TABLE) else {
                    return Ok(0);
                };
                Ok(table.values().filter(|row| matches(row, filter)).count() as u64)
            })
            .await
    }

    async fn with_transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        Self: Sized,
        F: for<'t> FnOnce(&'t InMemoryTx) -> TxFuture<'t, R, E> + Send,
        R: Send,
        E: From<RepoError> + Display + Send,
    {
        let tx = self.db.begin().await;
        let result = f(&tx).await;
        match result {
            Ok(value) => {
                self.db.commit(tx).await;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(table = T::TABLE, error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }
}
