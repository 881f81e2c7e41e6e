use mdesk_auth::{Auth, AuthError, init};
use mdesk_domain::config::AuthConfig;

#[test]
fn init_creates_slice() {
    let slice = init(&AuthConfig::default()).expect("init should succeed");
    assert_eq!(slice.id, std::any::TypeId::of::<Auth>());
}

#[test]
fn default_login_view_is_login() {
    let slice = init(&AuthConfig::default()).expect("init should succeed");
    let auth = slice.downcast_ref::<Auth>().expect("auth state");
    assert_eq!(auth.login_view, "login");
}

#[test]
fn init_rejects_an_empty_login_view() {
    let config = AuthConfig { login_view: String::new() };
    assert!(matches!(init(&config), Err(AuthError::Config { .. })));
}
