use ebank_portal::credential_store::{REMEMBER_ME_KEY, TOKEN_COOKIE, TOKEN_KEY, USER_KEY};
use ebank_portal::{CredentialStore, KeyValueStorage, MemoryStorage, UserProfile};
use std::sync::Arc;

fn setup() -> (CredentialStore, Arc<MemoryStorage>, Arc<MemoryStorage>) {
    let durable = Arc::new(MemoryStorage::new());
    let cookies = Arc::new(MemoryStorage::new());
    let store = CredentialStore::new(durable.clone(), cookies.clone());
    (store, durable, cookies)
}

fn profile() -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "id": 42,
        "email": "ada@ebank.test",
        "name": "Ada",
        "locale": "de-DE"
    }))
    .unwrap()
}

#[test]
fn empty_store_is_unauthenticated() {
    let (store, _, _) = setup();
    assert!(!store.is_authenticated());
    assert!(store.token().is_none());
    assert!(store.profile().is_none());
    assert!(!store.remember_me());
}

#[test]
fn save_writes_token_cookie_and_profile() {
    let (store, durable, cookies) = setup();
    store.save("tok-1", Some(&profile()), true);

    assert_eq!(store.token().as_deref(), Some("tok-1"));
    assert_eq!(cookies.get(TOKEN_COOKIE).as_deref(), Some("tok-1"));
    assert_eq!(store.profile(), Some(profile()));
    assert!(store.remember_me());
    assert!(durable.contains(USER_KEY));
}

#[test]
fn save_without_remember_me_clears_flag() {
    let (store, durable, _) = setup();
    store.save("a", None, true);
    store.save("b", None, false);
    assert!(!store.remember_me());
    assert!(!durable.contains(REMEMBER_ME_KEY));
    assert_eq!(store.token().as_deref(), Some("b"));
}

#[test]
fn placeholder_tokens_do_not_count() {
    let (store, durable, _) = setup();
    for junk in ["", "   ", "undefined", "null"] {
        durable.set(TOKEN_KEY, junk);
        assert!(!store.is_authenticated(), "{junk:?} should not authenticate");
    }
    durable.set(TOKEN_KEY, "  real  ");
    assert_eq!(store.token().as_deref(), Some("real"));
}

#[test]
fn corrupt_profile_reads_as_absent() {
    let (store, durable, _) = setup();
    durable.set(USER_KEY, "{not json");
    assert!(store.profile().is_none());
}

#[test]
fn profile_keeps_unknown_fields() {
    let (store, _, _) = setup();
    store.set_profile(&profile());
    let cached = store.profile().unwrap();
    assert_eq!(cached.extra.get("locale"), Some(&serde_json::json!("de-DE")));
}

#[test]
fn clear_removes_everything() {
    let (store, durable, cookies) = setup();
    durable.set("theme", "dark");
    store.save("tok", Some(&profile()), true);
    store.clear();

    assert!(!store.is_authenticated());
    assert!(!durable.contains(TOKEN_KEY));
    assert!(!durable.contains(USER_KEY));
    assert!(!durable.contains(REMEMBER_ME_KEY));
    assert!(cookies.is_empty());
    // Unrelated entries survive.
    assert_eq!(durable.get("theme").as_deref(), Some("dark"));
}

#[test]
fn clones_share_storage() {
    let (store, _, _) = setup();
    let other_tab = store.clone();
    store.save("shared", None, false);
    assert_eq!(other_tab.token().as_deref(), Some("shared"));
    other_tab.clear();
    assert!(!store.is_authenticated());
}
