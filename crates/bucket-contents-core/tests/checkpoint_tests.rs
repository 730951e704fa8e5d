//! Integration tests for the checkpoint subsystem:
//! - checkpoint key derivation and listing order,
//! - the one-checkpoint guarantee on notebook saves,
//! - restore, rename, and delete life cycles,
//! - the alternate checkpoint container.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use bucket_contents_core::config::ManagerConfig;
use bucket_contents_core::manager::ContentsManager;
use bucket_contents_core::model::{ContentModel, Format};
use bucket_contents_core::storage::memory::MemoryStore;
use bucket_contents_core::storage::ObjectStore;
use serde_json::json;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn manager_with_bucket() -> ContentsManager<MemoryStore> {
    let store = MemoryStore::new();
    store.create_container("bucket").await.expect("container");
    ContentsManager::new(store)
}

fn notebook_doc(source: &str) -> serde_json::Value {
    json!({
        "cells": [{"cell_type": "code", "source": source, "outputs": [], "metadata": {}}],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5,
    })
}

#[tokio::test]
async fn create_and_list_orders_newest_first() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/f.txt")
        .await?;

    let first = manager.create_checkpoint("bucket/f.txt").await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = manager.create_checkpoint("bucket/f.txt").await?;

    let listed = manager.list_checkpoints("bucket/f.txt").await?;
    let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    Ok(())
}

#[tokio::test]
async fn checkpoint_objects_live_under_the_checkpoint_dir() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/dir/f.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/dir/f.txt").await?;

    let key = format!("dir/.ipynb_checkpoints/f-{}.txt", checkpoint.id);
    assert!(manager.store().exists("bucket", &key).await?);
    Ok(())
}

#[tokio::test]
async fn extensionless_files_checkpoint_cleanly() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("all:", Format::Text), "bucket/Makefile")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/Makefile").await?;

    let key = format!(".ipynb_checkpoints/Makefile-{}", checkpoint.id);
    assert!(manager.store().exists("bucket", &key).await?);

    let listed = manager.list_checkpoints("bucket/Makefile").await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, checkpoint.id);
    Ok(())
}

#[tokio::test]
async fn notebook_save_guarantees_a_checkpoint() -> TestResult {
    let manager = manager_with_bucket().await;
    let model = ContentModel::notebook_for_save(notebook_doc("print(1)"));
    manager.save(&model, "bucket/nb.ipynb").await?;

    let listed = manager.list_checkpoints("bucket/nb.ipynb").await?;
    assert_eq!(listed.len(), 1);

    // Later saves do not pile up further checkpoints.
    manager.save(&model, "bucket/nb.ipynb").await?;
    let listed = manager.list_checkpoints("bucket/nb.ipynb").await?;
    assert_eq!(listed.len(), 1);
    Ok(())
}

#[tokio::test]
async fn listing_does_not_mix_up_siblings() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("a", Format::Text), "bucket/nb.txt")
        .await?;
    manager
        .save(&ContentModel::file_for_save("b", Format::Text), "bucket/nb2.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/nb.txt").await?;
    manager.create_checkpoint("bucket/nb2.txt").await?;

    let listed = manager.list_checkpoints("bucket/nb.txt").await?;
    let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![checkpoint.id.as_str()]);
    Ok(())
}

#[tokio::test]
async fn restore_file_checkpoint() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/f.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/f.txt").await?;
    manager
        .save(&ContentModel::file_for_save("v2", Format::Text), "bucket/f.txt")
        .await?;

    manager.restore_checkpoint(&checkpoint.id, "bucket/f.txt").await?;
    let model = manager
        .get("bucket/f.txt", true, None, Some(Format::Text))
        .await?;
    let ContentModel::File(file) = model else {
        panic!("expected file model");
    };
    assert_eq!(file.content.as_deref(), Some("v1"));
    Ok(())
}

#[tokio::test]
async fn restore_notebook_checkpoint() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(
            &ContentModel::notebook_for_save(notebook_doc("print(1)")),
            "bucket/nb.ipynb",
        )
        .await?;
    let checkpoint = manager
        .list_checkpoints("bucket/nb.ipynb")
        .await?
        .pop()
        .expect("save created a checkpoint");
    manager
        .save(
            &ContentModel::notebook_for_save(notebook_doc("print(2)")),
            "bucket/nb.ipynb",
        )
        .await?;

    manager
        .restore_checkpoint(&checkpoint.id, "bucket/nb.ipynb")
        .await?;
    let model = manager.get("bucket/nb.ipynb", true, None, None).await?;
    let ContentModel::Notebook(nb) = model else {
        panic!("expected notebook model");
    };
    let doc = nb.content.expect("content requested");
    assert_eq!(doc["cells"][0]["source"], "print(1)");
    Ok(())
}

#[tokio::test]
async fn delete_checkpoint_then_missing_is_not_found() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/f.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/f.txt").await?;

    manager.delete_checkpoint(&checkpoint.id, "bucket/f.txt").await?;
    assert!(manager.list_checkpoints("bucket/f.txt").await?.is_empty());

    let err = manager
        .delete_checkpoint(&checkpoint.id, "bucket/f.txt")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 404);
    Ok(())
}

#[tokio::test]
async fn get_missing_checkpoint_is_not_found() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/f.txt")
        .await?;
    let err = manager
        .get_file_checkpoint("no-such-id", "bucket/f.txt")
        .await
        .unwrap_err();
    assert_eq!(err.status(), 404);
    Ok(())
}

#[tokio::test]
async fn rename_all_checkpoints_follows_the_file() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/old.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/old.txt").await?;

    manager.rename("bucket/old.txt", "bucket/new.txt").await?;
    // Checkpoints do not cascade; they stay until bridged explicitly.
    assert_eq!(manager.list_checkpoints("bucket/old.txt").await?.len(), 1);

    manager
        .rename_all_checkpoints("bucket/old.txt", "bucket/new.txt")
        .await?;
    assert!(manager.list_checkpoints("bucket/old.txt").await?.is_empty());
    let listed = manager.list_checkpoints("bucket/new.txt").await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, checkpoint.id);

    let restored = manager
        .get_file_checkpoint(&checkpoint.id, "bucket/new.txt")
        .await?;
    let ContentModel::File(file) = restored else {
        panic!("expected file model");
    };
    assert_eq!(file.content.as_deref(), Some("v1"));
    Ok(())
}

#[tokio::test]
async fn checkpoints_are_hidden_from_listings() -> TestResult {
    let manager = manager_with_bucket().await;
    manager
        .save(
            &ContentModel::notebook_for_save(notebook_doc("print(1)")),
            "bucket/nb.ipynb",
        )
        .await?;

    let model = manager.get("bucket", true, None, None).await?;
    let ContentModel::Directory(dir) = model else {
        panic!("expected directory model");
    };
    let names: Vec<_> = dir
        .content
        .expect("content requested")
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["nb.ipynb"]);
    Ok(())
}

#[tokio::test]
async fn alternate_checkpoint_container() -> TestResult {
    let store = MemoryStore::new();
    store.create_container("bucket").await?;
    store.create_container("checkpoints").await?;
    let config = ManagerConfig {
        checkpoint_container: Some("checkpoints".to_string()),
        ..ManagerConfig::default()
    };
    let manager = ContentsManager::with_config(store, config);

    manager
        .save(&ContentModel::file_for_save("v1", Format::Text), "bucket/dir/f.txt")
        .await?;
    let checkpoint = manager.create_checkpoint("bucket/dir/f.txt").await?;

    let key = format!("dir/.ipynb_checkpoints/f-{}.txt", checkpoint.id);
    assert!(manager.store().exists("checkpoints", &key).await?);
    assert!(!manager.store().exists("bucket", &key).await?);

    manager
        .save(&ContentModel::file_for_save("v2", Format::Text), "bucket/dir/f.txt")
        .await?;
    manager
        .restore_checkpoint(&checkpoint.id, "bucket/dir/f.txt")
        .await?;
    let model = manager
        .get("bucket/dir/f.txt", true, None, Some(Format::Text))
        .await?;
    let ContentModel::File(file) = model else {
        panic!("expected file model");
    };
    assert_eq!(file.content.as_deref(), Some("v1"));
    Ok(())
}
