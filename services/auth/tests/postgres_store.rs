//! Credential store behaviour against a live PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a scratch database and `--ignored`.

use std::sync::Arc;

use auth::{
    database,
    error::{DuplicateField, StoreError},
    models::NewAccount,
    repositories::{CredentialStore, PgCredentialStore},
};
use chrono::Utc;
use common::database::{DatabaseConfig, init_pool};
use uuid::Uuid;

async fn store() -> PgCredentialStore {
    let pool = init_pool(&DatabaseConfig::from_env().unwrap()).await.unwrap();
    database::migrate(&pool).await.unwrap();
    PgCredentialStore::new(pool)
}

fn unique_name() -> String {
    format!("u{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_concurrent_duplicate_inserts_one_wins() {
    let store = Arc::new(store().await);
    let name = unique_name();

    let mut attempts = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let new_account = NewAccount {
            username: if i % 2 == 0 {
                name.clone()
            } else {
                name.to_uppercase()
            },
            email: format!("{}-{}@x.com", name, i),
            password_hash: "hash".to_string(),
        };
        attempts.push(tokio::spawn(async move { store.insert(&new_account).await }));
    }

    let mut wins = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => wins += 1,
            Err(StoreError::Duplicate {
                field: DuplicateField::Username,
            }) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_lookup_touch_and_count() {
    let store = store().await;
    let name = unique_name();

    let account = store
        .insert(&NewAccount {
            username: name.clone(),
            email: format!("{}@x.com", name),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();
    assert!(account.is_active);
    assert!(account.last_login.is_none());

    let found = store
        .find_active_by_username(&name.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, account.id);

    store.touch_last_login(account.id, Utc::now()).await.unwrap();
    let found = store.find_by_id(account.id).await.unwrap().unwrap();
    assert!(found.last_login.is_some());

    assert!(store.count_all().await.unwrap() >= 1);
    assert!(store.health_check().await);

    let err = store
        .insert(&NewAccount {
            username: unique_name(),
            email: format!("{}@X.COM", name.to_uppercase()),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Duplicate {
            field: DuplicateField::Email
        }
    ));
}
