use axum::Router;
use mdesk::features::theme::Theme;
use mdesk::kernel::prelude::{AppState, AppStateError};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Assembles the application router: system endpoints plus the static
/// asset mount provided by the theme slice.
pub(crate) fn init(state: AppState) -> Result<Router, AppStateError> {
    let assets = state.try_get_slice::<Theme>()?.asset_dir.clone();

    Ok(Router::new()
        .merge(mdesk::server::router::system_router())
        .nest_service("/assets", ServeDir::new(assets))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
