//! Round trips against a live Postgres.
//!
//! Run with `PRICETRACK_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::{DateTime, TimeZone, Utc};
use pricetrack_data::{
    CloneTableRequest, ColumnTag, EntityStamps, PgConnector, SchemaAdmin, SqlValue,
    StorageConnector, Statement, TimestampRepository,
};

const SCHEMA: &str = include_str!("../migrations/001_timestamps_wmaz.sql");

fn connector() -> PgConnector {
    let url = std::env::var("PRICETRACK_TEST_DATABASE_URL")
        .expect("PRICETRACK_TEST_DATABASE_URL must be set");
    PgConnector::from_url(&url).unwrap()
}

fn at(s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, s).unwrap()
}

async fn reset(connector: &PgConnector, ids: &[&str]) {
    connector.execute_script(&[Statement::raw(SCHEMA)]).await.unwrap();
    for id in ids {
        connector
            .execute_no_return(
                "DELETE FROM \"Timestamps_WmAz\" WHERE asin = $1",
                &[SqlValue::from(*id)],
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "requires PRICETRACK_TEST_DATABASE_URL"]
async fn test_upsert_only_touches_tagged_column() {
    let connector = connector();
    reset(&connector, &["it-rt-1"]).await;
    let repo = TimestampRepository::new(connector.clone());

    let first = EntityStamps::Stamped(vec![("it-rt-1".to_string(), Some(at(10)))]);
    repo.record_events(first, ColumnTag::WmData).await.unwrap();
    let second = EntityStamps::Stamped(vec![("it-rt-1".to_string(), Some(at(20)))]);
    repo.record_events(second, ColumnTag::AzFees).await.unwrap();
    let third = EntityStamps::Stamped(vec![("it-rt-1".to_string(), Some(at(30)))]);
    repo.record_events(third, ColumnTag::WmData).await.unwrap();

    let rows = connector
        .execute_return(
            "SELECT wm_data, az_fees, match_to_az FROM \"Timestamps_WmAz\" WHERE asin = $1",
            &[SqlValue::from("it-rt-1")],
        )
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![
            SqlValue::Timestamp(at(30)),
            SqlValue::Timestamp(at(20)),
            SqlValue::Null,
        ]]
    );
}

#[tokio::test]
#[ignore = "requires PRICETRACK_TEST_DATABASE_URL"]
async fn test_failed_batch_rolls_back() {
    let connector = connector();
    reset(&connector, &["it-rb-1"]).await;

    let rows = vec![
        vec![SqlValue::from("it-rb-1"), SqlValue::Timestamp(at(1)), SqlValue::Timestamp(at(1))],
        vec![SqlValue::Null, SqlValue::Timestamp(at(2)), SqlValue::Timestamp(at(2))],
    ];
    let err = connector
        .execute_batch(&ColumnTag::WmData.upsert_sql(), &rows)
        .await
        .unwrap_err();
    assert!(err.is_integrity(), "unexpected error: {err}");

    let remaining = connector
        .execute_return(
            "SELECT asin FROM \"Timestamps_WmAz\" WHERE asin = $1",
            &[SqlValue::from("it-rb-1")],
        )
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
#[ignore = "requires PRICETRACK_TEST_DATABASE_URL"]
async fn test_clone_table_copies_key() {
    let connector = connector();
    reset(&connector, &["it-cl-1"]).await;
    connector
        .execute_no_return("DROP TABLE IF EXISTS \"Timestamps_WmAz_it\"", &[])
        .await
        .unwrap();

    let admin = SchemaAdmin::new(connector.clone());
    let request = CloneTableRequest::new("Timestamps_WmAz")
        .with_columns(["asin", "wm_data"])
        .with_new_name("Timestamps_WmAz_it");
    admin.clone_table(&request).await.unwrap();

    let columns = connector
        .execute_return(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_name = 'Timestamps_WmAz_it' ORDER BY ordinal_position",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(
        columns,
        vec![vec![SqlValue::from("asin")], vec![SqlValue::from("wm_data")]]
    );

    connector
        .execute_no_return("DROP TABLE \"Timestamps_WmAz_it\"", &[])
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PRICETRACK_TEST_DATABASE_URL"]
async fn test_clone_ignores_same_named_table_in_other_schema() {
    let connector = connector();
    reset(&connector, &["it-cl-2"]).await;
    connector
        .execute_script(&[
            Statement::raw("DROP TABLE IF EXISTS \"Timestamps_WmAz_shadow_it\""),
            Statement::raw("DROP SCHEMA IF EXISTS pricetrack_it_shadow CASCADE"),
            Statement::raw("CREATE SCHEMA pricetrack_it_shadow"),
            Statement::raw(
                "CREATE TABLE pricetrack_it_shadow.\"Timestamps_WmAz\" \
                 (asin text PRIMARY KEY, extra_col text)",
            ),
        ])
        .await
        .unwrap();

    let admin = SchemaAdmin::new(connector.clone());
    let request =
        CloneTableRequest::new("Timestamps_WmAz").with_new_name("Timestamps_WmAz_shadow_it");
    let result = admin.clone_table(&request).await;

    connector
        .execute_no_return("DROP SCHEMA pricetrack_it_shadow CASCADE", &[])
        .await
        .unwrap();
    result.unwrap();

    let columns = connector
        .execute_return(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_name = 'Timestamps_WmAz_shadow_it' ORDER BY ordinal_position",
            &[],
        )
        .await
        .unwrap();
    let names: Vec<SqlValue> = columns.into_iter().flatten().collect();
    assert!(names.contains(&SqlValue::from("asin")));
    assert!(!names.contains(&SqlValue::from("extra_col")));
    assert_eq!(
        names.iter().filter(|n| **n == SqlValue::from("asin")).count(),
        1
    );

    connector
        .execute_no_return("DROP TABLE \"Timestamps_WmAz_shadow_it\"", &[])
        .await
        .unwrap();
}
