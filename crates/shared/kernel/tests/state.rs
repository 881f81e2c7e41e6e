use mdesk_database::Database;
use mdesk_domain::config::AppConfig;
use mdesk_domain::registry::{FeatureSlice, InitializedSlice};
use mdesk_kernel::server::{AppState, AppStateError};

#[derive(Debug, Clone)]
struct DummySlice {
    label: &'static str,
}

impl FeatureSlice for DummySlice {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

async fn mem_database() -> Database {
    Database::builder()
        .url("mem://")
        .session("test_ns", "state")
        .init()
        .await
        .expect("connect to mem://")
}

#[test]
fn builder_requires_core_extensions() {
    let err = AppState::builder().config(AppConfig::default()).build().unwrap_err();
    assert!(matches!(err, AppStateError::Validation { .. }));
}

#[tokio::test]
async fn state_round_trips_registered_slices() {
    let state = AppState::builder()
        .config(AppConfig::default())
        .db(mem_database().await)
        .register_slice(InitializedSlice::new(DummySlice { label: "first" }))
        .build()
        .expect("state builds");

    let slice = state.get_slice::<DummySlice>().expect("registered slice");
    assert_eq!(slice.label, "first");
    assert_eq!(state.slice_ids().count(), 1);
}

#[tokio::test]
async fn missing_slice_is_reported() {
    let state = AppState::builder()
        .config(AppConfig::default())
        .db(mem_database().await)
        .build()
        .expect("state builds");

    let err = state.try_get_slice::<DummySlice>().unwrap_err();
    assert!(matches!(err, AppStateError::MissingSlice { .. }));
}
