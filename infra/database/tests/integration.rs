use mdesk_database::*;

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    // Health should be OK for mem://
    db.health().await.expect("health check");
    db.use_ns("test_ns").use_db("test_db").await.expect("session switch");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn init_records_bookkeeping_migration() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "bookkeeping")
        .init()
        .await
        .expect("connect to mem://");

    let mut response =
        db.query("SELECT VALUE key FROM migration").await.expect("migration table query");
    let keys = response.take::<Vec<String>>(0).expect("migration keys");
    assert_eq!(keys, vec!["core".to_owned()]);
}
