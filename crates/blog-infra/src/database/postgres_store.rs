use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, IntoValueTuple, SimpleExpr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, DbConn,
    DbErr, EntityTrait, IntoActiveModel, Iterable, Order, PaginatorTrait, PrimaryKeyToColumn,
    PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr, TransactionTrait,
};

use blog_core::RepoError;
use blog_core::ports::{Direction, Filter, Page, Record, Sort, Store, TxFuture, Value};

use super::filter::{condition, sea_value};

/// Generic PostgreSQL store over one SeaORM entity.
///
/// Stores of one backend share a single connection handle.
pub struct PostgresStore<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresStore<E>
where
    E: EntityTrait,
{
    pub fn new(db: Arc<DbConn>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// Runs `$body` against the transaction when one is given, else the pool.
macro_rules! with_conn {
    ($self:ident, $tx:ident, |$conn:ident| $body:expr) => {
        match $tx {
            Some($conn) => $body,
            None => {
                let $conn: &DbConn = &$self.db;
                $body
            }
        }
    };
}

fn map_db_err(e: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
        return RepoError::Constraint(msg);
    }
    match e {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        e => {
            let err_str = e.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint(err_str)
            } else {
                RepoError::Query(err_str)
            }
        }
    }
}

/// `pk_col_1 = v1 AND pk_col_2 = v2 ...` for a (possibly composite) key.
fn key_condition<E: EntityTrait>(pk: <E::PrimaryKey as PrimaryKeyTrait>::ValueType) -> Condition {
    E::PrimaryKey::iter()
        .zip(pk.into_value_tuple())
        .fold(Condition::all(), |cond, (key, value)| {
            cond.add(key.into_column().eq(value))
        })
}

fn sorted<E: EntityTrait>(select: Select<E>, sort: &Sort) -> Select<E> {
    sort.terms().iter().fold(select, |select, term| {
        let order = match term.direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        };
        select.order_by(Expr::cust(term.column.clone()), order)
    })
}

fn filtered<E: EntityTrait>(filter: &Filter, sort: &Sort) -> Select<E> {
    sorted(E::find().filter(condition(filter)), sort)
}

fn assignment(value: &Value) -> SimpleExpr {
    match value {
        Value::Null => Expr::cust("NULL"),
        value => Expr::value(sea_value(value)),
    }
}

#[async_trait]
impl<E, T> Store<T> for PostgresStore<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = T::Key>,
    T: Record + From<E::Model> + Into<E::ActiveModel>,
{
    type Tx = DatabaseTransaction;

    async fn create(&self, tx: Option<&DatabaseTransaction>, record: &T) -> Result<(), RepoError> {
        let model: E::ActiveModel = record.clone().into();
        with_conn!(self, tx, |conn| E::insert(model)
            .exec_without_returning(conn)
            .await)
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn update(&self, tx: Option<&DatabaseTransaction>, record: &T) -> Result<(), RepoError> {
        let model: E::ActiveModel = record.clone().into();
        match with_conn!(self, tx, |conn| E::update(model).exec(conn).await) {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(RepoError::NotFound { table: T::TABLE }),
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn partial_update(
        &self,
        tx: Option<&DatabaseTransaction>,
        pk: &T::Key,
        fields: &[(String, Value)],
    ) -> Result<(), RepoError> {
        if fields.is_empty() {
            return Ok(());
        }
        let update = fields
            .iter()
            .fold(E::update_many(), |update, (column, value)| {
                update.col_expr(Alias::new(column.as_str()), assignment(value))
            })
            .filter(key_condition::<E>(pk.clone()));

        let result = with_conn!(self, tx, |conn| update.exec(conn).await).map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound { table: T::TABLE });
        }
        Ok(())
    }

    async fn delete_by_pk(
        &self,
        tx: Option<&DatabaseTransaction>,
        pk: &T::Key,
    ) -> Result<(), RepoError> {
        let result = with_conn!(self, tx, |conn| E::delete_by_id(pk.clone())
            .exec(conn)
            .await)
        .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound { table: T::TABLE });
        }

        Ok(())
    }

    async fn find_by_pk(
        &self,
        tx: Option<&DatabaseTransaction>,
        pk: &T::Key,
    ) -> Result<T, RepoError> {
        let model = with_conn!(self, tx, |conn| E::find_by_id(pk.clone()).one(conn).await)
            .map_err(map_db_err)?;
        model
            .map(Into::into)
            .ok_or(RepoError::NotFound { table: T::TABLE })
    }

    async fn create_many(
        &self,
        tx: Option<&DatabaseTransaction>,
        records: &[T],
    ) -> Result<(), RepoError> {
        if records.is_empty() {
            return Ok(());
        }
        let models: Vec<E::ActiveModel> = records.iter().cloned().map(Into::into).collect();
        with_conn!(self, tx, |conn| E::insert_many(models)
            .exec_without_returning(conn)
            .await)
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn update_many(
        &self,
        tx: Option<&DatabaseTransaction>,
        records: &[T],
    ) -> Result<(), RepoError> {
        for record in records {
            <Self as Store<T>>::update(self, tx, record).await?;
        }
        Ok(())
    }

    async fn delete_many_by_pks(
        &self,
        tx: Option<&DatabaseTransaction>,
        pks: &[T::Key],
    ) -> Result<(), RepoError> {
        if pks.is_empty() {
            return Ok(());
        }
        let any_key = pks.iter().fold(Condition::any(), |cond, pk| {
            cond.add(key_condition::<E>(pk.clone()))
        });
        with_conn!(self, tx, |conn| E::delete_many()
            .filter(any_key)
            .exec(conn)
            .await)
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn find_one(
        &self,
        tx: Option<&DatabaseTransaction>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<T, RepoError> {
        let select = filtered::<E>(filter, sort);
        let model = with_conn!(self, tx, |conn| select.one(conn).await).map_err(map_db_err)?;
        model
            .map(Into::into)
            .ok_or(RepoError::NotFound { table: T::TABLE })
    }

    async fn find_all(
        &self,
        tx: Option<&DatabaseTransaction>,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError> {
        let select = filtered::<E>(filter, sort);
        let models = with_conn!(self, tx, |conn| select.all(conn).await).map_err(map_db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_paginated(
        &self,
        tx: Option<&DatabaseTransaction>,
        page: Page,
        filter: &Filter,
        sort: &Sort,
    ) -> Result<Vec<T>, RepoError> {
        let select = filtered::<E>(filter, sort)
            .limit(page.limit)
            .offset(page.offset);
        let models = with_conn!(self, tx, |conn| select.all(conn).await).map_err(map_db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(
        &self,
        tx: Option<&DatabaseTransaction>,
        filter: &Filter,
    ) -> Result<u64, RepoError> {
        let select = E::find().filter(condition(filter));
        with_conn!(self, tx, |conn| select.count(conn).await).map_err(map_db_err)
    }

    async fn with_transaction<R, X, F>(&self, f: F) -> Result<R, X>
    where
        Self: Sized,
        F: for<'t> FnOnce(&'t DatabaseTransaction) -> TxFuture<'t, R, X> + Send,
        R: Send,
        X: From<RepoError> + Display + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| X::from(map_db_err(e)))?;

        let result = f(&txn).await;
        match result {
            Ok(value) => {
                txn.commit().await.map_err(|e| X::from(map_db_err(e)))?;
                Ok(value)
            }
            Err(original) => match txn.rollback().await {
                Ok(()) => Err(original),
                Err(rollback) => {
                    tracing::error!(error = %original, rollback_error = %rollback, "Rollback failed");
                    Err(X::from(RepoError::Rollback {
                        original: original.to_string(),
                        rollback: rollback.to_string(),
                    }))
                }
            },
        }
    }
}
