// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use piliseed_app::{USER_CACHE_KEY, UserCache, UserContext};
use piliseed_db::{Store, validate_db_path};
use piliseed_testkit::{sample_user, temp_db_path};

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("").is_err());
    assert!(validate_db_path(":memory:").is_ok());
    assert!(validate_db_path("/tmp/piliseed.db").is_ok());
}

#[test]
fn bootstrap_is_idempotent() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.put_cache("greeting", "hello")?;
    store.bootstrap()?;
    assert_eq!(store.cache_keys()?, vec!["greeting".to_owned()]);
    Ok(())
}

#[test]
fn bootstrap_rejects_foreign_database() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE projects (id INTEGER PRIMARY KEY);")?;
    let err = store.bootstrap().expect_err("foreign schema rejected");
    assert!(err.to_string().contains("client_cache"));
    Ok(())
}

#[test]
fn bootstrap_rejects_cache_table_missing_columns() -> Result<()> {
    let store = Store::open_memory()?;
    store
        .raw_connection()
        .execute_batch("CREATE TABLE client_cache (key TEXT PRIMARY KEY, value TEXT);")?;
    let err = store.bootstrap().expect_err("missing column rejected");
    assert!(err.to_string().contains("updated_at"));
    Ok(())
}

#[test]
fn put_overwrites_and_remove_reports_presence() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.put_cache("k", "one")?;
    store.put_cache("k", "two")?;
    let entry = store.get_cache("k")?.expect("entry present");
    assert_eq!(entry.value, "two");
    assert!(entry.updated_at.year() >= 2026);

    assert!(store.remove_cache("k")?);
    assert!(!store.remove_cache("k")?);
    assert_eq!(store.get_cache("k")?, None);
    Ok(())
}

#[test]
fn empty_cache_key_is_rejected() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    assert!(store.put_cache("  ", "value").is_err());
    Ok(())
}

#[test]
fn signed_in_user_survives_reopen() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    {
        let store = Store::open(&path)?;
        store.bootstrap()?;
        let mut context = UserContext::init(store)?;
        context.login(sample_user())?;
    }

    let store = Store::open(&path)?;
    store.bootstrap()?;
    let context = UserContext::init(store)?;
    assert_eq!(context.user(), Some(&sample_user()));
    Ok(())
}

#[test]
fn corrupt_user_record_is_cleared_on_start() -> Result<()> {
    let (_dir, path) = temp_db_path()?;
    let mut store = Store::open(&path)?;
    store.bootstrap()?;
    store.store_raw(USER_CACHE_KEY, "[1, 2, 3]")?;

    let context = UserContext::init(store)?;
    assert!(!context.is_logged_in());
    assert_eq!(context.cache().load_raw(USER_CACHE_KEY)?, None);
    Ok(())
}

#[test]
fn logout_removes_persisted_user() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    let mut context = UserContext::init(store)?;
    context.login(sample_user())?;
    context.logout()?;
    assert!(context.cache().cache_keys()?.is_empty());
    Ok(())
}
