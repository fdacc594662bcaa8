use ebank_portal::{Account, AccountList, UserProfile};

fn account(status: &str) -> Account {
    serde_json::from_value(serde_json::json!({ "id": 1, "status": status })).unwrap()
}

#[test]
fn active_vocabulary() {
    for status in ["active", "ACTIVE", "Activated", "open", "approved", "  Open  "] {
        assert!(account(status).is_active(), "{status:?} should be active");
    }
    for status in ["", "pending", "closed", "frozen", "inactive", "opening"] {
        assert!(!account(status).is_active(), "{status:?} should not be active");
    }
}

#[test]
fn missing_status_is_inactive() {
    let account: Account = serde_json::from_value(serde_json::json!({ "id": 5 })).unwrap();
    assert_eq!(account.status, None);
    assert!(!account.is_active());
}

#[test]
fn null_or_non_string_status_is_inactive() {
    for status in [serde_json::json!(null), serde_json::json!(1), serde_json::json!({"code": "A"})] {
        let account: Account =
            serde_json::from_value(serde_json::json!({ "id": 2, "status": status })).unwrap();
        assert_eq!(account.status, None);
        assert!(!account.is_active());
    }
}

#[test]
fn odd_status_row_does_not_break_the_listing() {
    let list: AccountList =
        serde_json::from_str(r#"[{"status":"active"},{"status":null},{"status":7}]"#).unwrap();
    let accounts = list.into_accounts();
    assert_eq!(accounts.len(), 3);
    assert!(accounts[0].is_active());
    assert!(!accounts[1].is_active());
    assert!(!accounts[2].is_active());
}

#[test]
fn account_keeps_extra_fields() {
    let account: Account = serde_json::from_value(serde_json::json!({
        "id": "acc-1",
        "status": "active",
        "iban": "DE89370400440532013000"
    }))
    .unwrap();
    assert_eq!(account.extra.get("iban"), Some(&serde_json::json!("DE89370400440532013000")));
}

#[test]
fn account_list_bare_array() {
    let list: AccountList = serde_json::from_str(r#"[{"status":"open"},{"status":"closed"}]"#).unwrap();
    assert_eq!(list.into_accounts().len(), 2);
}

#[test]
fn account_list_rows_wrapper() {
    let list: AccountList =
        serde_json::from_str(r#"{"rows":[{"status":"open"}],"count":1}"#).unwrap();
    let accounts = list.into_accounts();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].is_active());
}

#[test]
fn account_list_rejects_other_shapes() {
    assert!(serde_json::from_str::<AccountList>(r#"{"accounts":[]}"#).is_err());
}

#[test]
fn profile_round_trips_unknown_fields() {
    let json = serde_json::json!({
        "id": 42,
        "email": "ada@ebank.test",
        "name": "Ada",
        "roles": ["customer"]
    });
    let profile: UserProfile = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(profile.email.as_deref(), Some("ada@ebank.test"));
    assert_eq!(serde_json::to_value(&profile).unwrap(), json);
}

#[test]
fn profile_with_only_unknown_fields() {
    let profile: UserProfile = serde_json::from_value(serde_json::json!({ "sub": "u-1" })).unwrap();
    assert!(profile.id.is_none());
    assert!(profile.email.is_none());
    assert_eq!(profile.extra.len(), 1);
}
