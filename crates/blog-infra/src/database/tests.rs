use std::sync::Arc;

use blog_core::RepoError;
use blog_core::domain::{Follow, Post};
use blog_core::ports::{Filter, Sort, Store};
use sea_orm::{DatabaseBackend, DbConn, MockDatabase, MockExecResult, Transaction};

use crate::database::PostgresStore;
use crate::database::entity::{follow, post};

/// Recovers the mock connection once every store holding it is dropped.
fn transaction_log(db: Arc<DbConn>) -> Vec<Transaction> {
    Arc::into_inner(db)
        .expect("stores still hold the connection")
        .into_transaction_log()
}

fn post_model(id: &str, slug: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id: id.to_owned(),
        author_id: "u1".to_owned(),
        title: "Test Post".to_owned(),
        slug: slug.to_owned(),
        raw_markdown: "Content".to_owned(),
        summary: "Summary".to_owned(),
        tags: serde_json::json!(["rust", "web"]),
        published_at: None,
        created_at: now.into(),
        updated_at: now.into(),
        raw_markdown_audio_url: None,
        summary_audio_url: None,
    }
}

#[tokio::test]
async fn test_find_post_by_pk() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model("p1", "hello")]])
        .into_connection()
        .into();

    let store = PostgresStore::<post::Entity>::new(db);

    let post = Store::<Post>::find_by_pk(&store, None, &"p1".to_string())
        .await
        .unwrap();

    assert_eq!(post.title, "Test Post");
    assert_eq!(post.its_tags(), vec!["rust".to_string(), "web".to_string()]);
    assert!(post.published_at.is_none());
}

#[tokio::test]
async fn test_find_by_pk_missing_is_not_found() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection()
        .into();

    let store = PostgresStore::<post::Entity>::new(db);
    let result = Store::<Post>::find_by_pk(&store, None, &"missing".to_string()).await;

    assert!(matches!(result, Err(RepoError::NotFound { table: "posts" })));
}

#[tokio::test]
async fn test_find_one_by_slug_builds_filtered_query() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model("p1", "hello")]])
        .into_connection()
        .into();

    let store = PostgresStore::<post::Entity>::new(Arc::clone(&db));
    let post = Store::<Post>::find_one(&store, None, &Filter::eq("slug", "hello"), &Sort::none())
        .await
        .unwrap();
    assert_eq!(post.id, "p1");

    drop(store);
    let log = transaction_log(db);
    assert_eq!(log.len(), 1);
    let sql = log[0].statements()[0].sql.clone();
    assert!(sql.contains(r#"WHERE "slug" = $1"#), "{sql}");
    assert!(sql.contains("LIMIT $2"), "{sql}");
}

#[tokio::test]
async fn test_delete_with_no_rows_is_not_found() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection()
        .into();

    let store = PostgresStore::<post::Entity>::new(db);
    let result = Store::<Post>::delete_by_pk(&store, None, &"p1".to_string()).await;

    assert!(matches!(result, Err(RepoError::NotFound { .. })));
}

#[tokio::test]
async fn test_partial_update_with_no_fields_skips_the_database() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .into_connection()
        .into();
    let store = PostgresStore::<post::Entity>::new(Arc::clone(&db));

    Store::<Post>::partial_update(&store, None, &"p1".to_string(), &[])
        .await
        .unwrap();

    drop(store);
    assert!(transaction_log(db).is_empty());
}

#[tokio::test]
async fn test_delete_follow_by_composite_key() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
        .into();

    let store = PostgresStore::<follow::Entity>::new(Arc::clone(&db));
    let key = ("u1".to_string(), "u2".to_string());
    Store::<Follow>::delete_by_pk(&store, None, &key)
        .await
        .unwrap();

    drop(store);
    let log = transaction_log(db);
    assert_eq!(
        log[0],
        Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"DELETE FROM "follows" WHERE "follows"."follower_id" = $1 AND "follows"."followee_id" = $2"#,
            ["u1".into(), "u2".into()],
        )
    );
}

#[tokio::test]
async fn test_transaction_rolls_back_on_error() {
    let db: Arc<DbConn> = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
        .into();

    let store = PostgresStore::<post::Entity>::new(Arc::clone(&db));
    let post: Post = post_model("p1", "hello").into();

    let writer = PostgresStore::<post::Entity>::new(Arc::clone(&db));
    let result = Store::<Post>::with_transaction(&store, move |tx| {
        Box::pin(async move {
            Store::<Post>::create(&writer, Some(tx), &post).await?;
            Err::<(), _>(RepoError::Query("later step failed".to_string()))
        })
    })
    .await;

    assert!(matches!(result, Err(RepoError::Query(_))));

    drop(store);
    let log = transaction_log(db);
    assert_eq!(log.len(), 1);
    let statements: Vec<_> = log[0].statements().iter().map(|s| s.sql.clone()).collect();
    assert_eq!(statements.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(statements.last().map(String::as_str), Some("ROLLBACK"));
}
