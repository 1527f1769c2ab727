//! Storage integration tests
//!
//! Exercise the S3-compatible document store against a live endpoint.
//!
//! **Requirements**:
//! - MinIO or S3 must be running and accessible
//! - `S3_ENDPOINT`, `S3_BUCKET`, `S3_ACCESS_KEY`, and `S3_SECRET_KEY` must be set
//! - Tests are skipped if `S3_ENDPOINT` is not configured
//!
//! ```bash
//! cargo test --test storage_tests
//! ```

use bookshelf_server::storage::{config::StorageConfig, document_key, DocumentStore, Storage};
use uuid::Uuid;

/// Creates a Storage instance if an endpoint is configured
async fn setup_storage() -> Option<Storage> {
    if std::env::var("S3_ENDPOINT").is_err() {
        return None;
    }

    let config = match StorageConfig::from_env() {
        Ok(cfg) => cfg,
        Err(_) => return None,
    };

    match Storage::new(config).await {
        Ok(storage) => Some(storage),
        Err(e) => {
            eprintln!("Failed to create storage client: {}", e);
            None
        }
    }
}

#[tokio::test]
async fn test_store_and_remove_document() {
    let Some(storage) = setup_storage().await else {
        println!("Skipping test: S3_ENDPOINT not configured");
        return;
    };

    let key = document_key(Uuid::new_v4(), Some("Dune (1965).pdf"));
    let data = b"%PDF-1.7 integration".to_vec();

    let stored = storage
        .store_document(&key, data.clone(), Some("application/pdf".to_string()))
        .await
        .expect("Upload should succeed");

    assert_eq!(stored.key, key);
    assert_eq!(stored.size, data.len() as i64);
    assert_eq!(stored.checksum.len(), 64);
    assert!(stored.url.ends_with(&key));

    storage
        .remove_document(&key)
        .await
        .expect("Delete should succeed");
}

#[tokio::test]
async fn test_remove_missing_document_succeeds() {
    let Some(storage) = setup_storage().await else {
        println!("Skipping test: S3_ENDPOINT not configured");
        return;
    };

    // DeleteObject is idempotent
    let key = document_key(Uuid::new_v4(), None);
    storage
        .remove_document(&key)
        .await
        .expect("Delete of a missing key should succeed");
}
