//! Record store port - one persistence contract shared by every entity kind.

use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RepoError;

/// An entity that can live in a [`Store`].
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type.
    type Key: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Backing table name.
    const TABLE: &'static str;

    /// Column sets that must be unique across the table.
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    fn key(&self) -> Self::Key;
}

/// A scalar bound to a filter placeholder or written by a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Row predicate handed opaquely to the store.
///
/// `Raw` carries a SQL fragment with `$n` placeholders; it is passed through
/// unchecked and only SQL backends can evaluate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
    IsNotNull(String),
    And(Vec<Filter>),
    Raw { sql: String, args: Vec<Value> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn is_in<V, I>(column: impl Into<String>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    pub fn raw(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            args,
        }
    }

    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (Self::And(mut fs), Self::And(more)) => {
                fs.extend(more);
                Self::And(fs)
            }
            (Self::And(mut fs), f) => {
                fs.push(f);
                Self::And(fs)
            }
            (f, Self::And(mut fs)) => {
                fs.insert(0, f);
                Self::And(fs)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse `ASC`/`DESC`, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if keyword.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTerm {
    pub column: String,
    pub direction: Direction,
}

/// Ordering clause. Column names are not validated by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort(Vec<SortTerm>);

impl Sort {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(column: impl Into<String>, direction: Direction) -> Self {
        Self(vec![SortTerm {
            column: column.into(),
            direction,
        }])
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::by(column, Direction::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::by(column, Direction::Desc)
    }

    pub fn then(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.0.push(SortTerm {
            column: column.into(),
            direction,
        });
        self
    }

    /// Parse a caller-supplied clause such as `"published_at DESC, id"`.
    ///
    /// A term without a recognised direction keyword sorts ascending.
    pub fn raw(clause: &str) -> Self {
        let terms = clause
            .split(',')
            .filter_map(|term| {
                let mut words = term.split_whitespace();
                let column = words.next()?.to_string();
                let direction = words
                    .next()
                    .and_then(Direction::from_keyword)
                    .unwrap_or_default();
                Some(SortTerm { column, direction })
            })
            .collect();
        Self(terms)
    }

    pub fn terms(&self) -> &[SortTerm] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Limit/offset window. No upper bound is enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Window for a 1-based page number.
    pub fn from_page(page: u64, per_page: u64) -> Self {
        Self {
            limit: per_page,
            offset: page.saturating_sub(1) * per_page,
        }
    }
}

/// Future returned by the closure given to [`Store::with_transaction`].
pub type TxFuture<'t, R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send + 't>>;

/// Generic store trait defining the persistence contract for one record type.
///
/// Every operation takes an optional transaction handle; `None` runs on the
/// shared connection.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Transaction handle of this backend.
    type Tx: Send + Sync;

    /// Insert a new record.
    async fn create(&self, tx: Option<&Self::Tx>, record: &T) -> Result<(), RepoError>;

    /// Replace every column of the record with the same key.
    async fn update(&self, tx: Option<&Self::Tx>, record: &T) -> Result<(), RepoError>;

    /// Overwrite only the given columns. An empty field list is a no-op.
    async fn partial_update(
        &self,
        tx: Option<&Self::Tx>,
        pk: &T::Key,
        fields: &[(String, Value)],
    ) -> Result<(), RepoError>;

    async fn delete_by_pk(&self, tx: Option<&Self::Tx>, pk: &T::Key) -> Result<(), RepoError>;

    /// Fails with [`RepoError::NotFound`] when no row has this key.
    async fn find_by_pk(&self, tx: Option<&Self::Tx>, pk: &T::Key) -> Result<T, RepoError>;

    async fn create_many(&self, tx: Option<&Self::Tx>, records: &[T]) -> Result<(), RepoError>;

    /// Updates one row at a time. Rows before a failing one stay applied.
    async fn update_many(&self, tx: Option<&Self::Tx>, records: &[T]) -> Result<(), RepoError>;

    async fn delete_many_by_pks(
        &self,
        tx: Option<&Self::Tx>,
        pks: &[T::Key],
    ) -> Result<(), RepoError>;

    /// First matching row, or [`RepoError::NotFound`].
    async fn find_one(
        &self,
        tx: Option<&Self::Tx>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<T, RepoError>;

    async fn find_all(
        &self,
        tx: Option<&Self::Tx>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError>;

    async fn find_paginated(
        &self,
        tx: Option<&Self::Tx>,
        page: Page,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError>;

    async fn count(&self, tx: Option<&Self::Tx>, filter: &Filter) -> Result<u64, RepoError>;

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// The original error is returned after a rollback. When the rollback also
    /// fails both are reported through [`RepoError::Rollback`]. Not reentrant.
    async fn with_transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        Self: Sized,
        F: for<'t> FnOnce(&'t Self::Tx) -> TxFuture<'t, R, E> + Send,
        R: Send,
        E: From<RepoError> + Display + Send;
}
