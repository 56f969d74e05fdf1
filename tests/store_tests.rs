/// Talk store tests
///
/// Request-level flows: lazy identifiers, renames, per-talk locking
/// Run with: cargo test --test store_tests

mod common;

use std::sync::Arc;

use talkstore::identifiers::ScriptedTokenSource;
use talkstore::prelude::*;

use common::*;

#[tokio::test]
async fn test_create_talk_assigns_identifiers() {
    let mut store = store().await;
    let event = insert_event(store.client_mut(), "PHPNW").await;

    let talk = store
        .create_talk(
            NewTalk::new(event, "Écrire du Rust", starts_at())
                .description("Ownership for the rest of us")
                .duration_minutes(45),
        )
        .await
        .unwrap();

    assert_eq!(talk.slug.as_deref(), Some("ecrire-du-rust"));
    assert_eq!(talk.stub.as_ref().map(String::len), Some(5));
    assert_eq!(talk.starts_at, starts_at());
    assert_eq!(talk.duration_minutes, 45);
    assert_eq!(talk.description, "Ownership for the rest of us");
}

#[tokio::test]
async fn test_get_talk_derives_missing_identifiers_once() {
    let mut store = store().await;
    let event = insert_event(store.client_mut(), "PHPNW").await;
    let id = insert_bare_talk(store.client_mut(), event, "Lazy Loading").await;

    let first = store.get_talk(id).await.unwrap().unwrap();
    assert!(!first.needs_identifiers());
    assert_eq!(first.slug.as_deref(), Some("lazy-loading"));

    let second = store.get_talk(id).await.unwrap().unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_exhausted_stub_is_retried_on_read() {
    let tokens = Arc::new(ScriptedTokenSource::new(vec!["aaaaa"; 6]));
    let mut store = store().await.with_token_source(tokens);
    let event = insert_event(store.client_mut(), "PHPNW").await;

    let winner = store
        .create_talk(NewTalk::new(event, "Winner", starts_at()))
        .await
        .unwrap();
    assert_eq!(winner.stub.as_deref(), Some("aaaaa"));

    let unlucky = store
        .create_talk(NewTalk::new(event, "Unlucky", starts_at()))
        .await
        .unwrap();
    assert!(unlucky.stub.is_none(), "create succeeds without a stub");
    assert_eq!(unlucky.slug.as_deref(), Some("unlucky"));

    let reread = store.get_talk(unlucky.id).await.unwrap().unwrap();
    let stub = reread.stub.expect("stub derived on read");
    assert_ne!(stub, "aaaaa");
}

#[tokio::test]
async fn test_rename_rederives_slug_and_keeps_stub() {
    let mut store = store().await;
    let event = insert_event(store.client_mut(), "PHPNW").await;
    let talk = store
        .create_talk(NewTalk::new(event, "Old Title", starts_at()))
        .await
        .unwrap();

    let renamed = store.rename_talk(talk.id, "New Title").await.unwrap().unwrap();
    assert_eq!(renamed.title, "New Title");
    assert_eq!(renamed.slug.as_deref(), Some("new-title"));
    assert_eq!(renamed.stub, talk.stub);

    assert!(store.rename_talk(9999, "Nobody").await.unwrap().is_none());
    assert!(store.get_talk(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_speaker_operations() {
    let mut store = store().await;
    let event = insert_event(store.client_mut(), "PHPNW").await;
    let ada = insert_user(store.client_mut(), "ada", "Ada Lovelace").await;
    let talk = store
        .create_talk(NewTalk::new(event, "Engines", starts_at()))
        .await
        .unwrap();

    store.set_speakers(talk.id, &["Charles Babbage"]).await.unwrap();
    let attached = store.attach_user(talk.id, ada).await.unwrap().unwrap();

    let report = store
        .set_speakers(talk.id, &["Ada Lovelace", "Charles Babbage"])
        .await
        .unwrap();
    assert!(report.is_noop());

    assert!(store.unassign_speaker(talk.id, attached).await.unwrap());
    let speakers = store.list_speakers(talk.id).await.unwrap();
    assert_eq!(display_names(&speakers), vec!["Ada Lovelace", "Charles Babbage"]);
    assert!(speakers.iter().all(|s| !s.is_claimed()));

    assert!(store.claim_speaker(talk.id, attached, ada).await.unwrap());
}

#[tokio::test]
async fn test_store_track_and_link_operations() {
    let mut store = store().await;
    let event = insert_event(store.client_mut(), "PHPNW").await;
    let track = insert_track(store.client_mut(), event, "Main Hall").await;
    let talk = store
        .create_talk(NewTalk::new(event, "Linked Up", starts_at()))
        .await
        .unwrap();

    let association = store.link_track(talk.id, track).await.unwrap();
    assert_eq!(store.link_track(talk.id, track).await.unwrap(), association);
    assert_eq!(store.list_tracks(talk.id).await.unwrap().len(), 1);
    assert!(store.unlink_track(talk.id, track).await.unwrap());

    let link = store.add_link(talk.id, "joindin_link", "https://joind.in/1").await.unwrap();
    assert!(store.update_link(talk.id, link, "joindin_link", "https://joind.in/2").await.unwrap());
    assert_eq!(store.list_links(talk.id).await.unwrap()[0].url, "https://joind.in/2");
    assert!(store.remove_link(talk.id, link).await.unwrap());
    assert_eq!(store.link_types().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let client = client().await;
    let result = TalkStore::new(client, StoreConfig::new().stub_length(0));
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[tokio::test]
async fn test_locking_is_opt_in() {
    assert!(store().await.locks().is_none());
    assert!(store_with(StoreConfig::new().per_talk_locking(true)).await.locks().is_some());
}

#[tokio::test]
async fn test_shared_file_with_shared_locks() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("talks.db").display());
    let connection = ConnectionConfig::new(&url);
    let config = StoreConfig::new().per_talk_locking(true);

    let mut first = TalkStore::open(&connection, config.clone()).await.unwrap();
    let locks = first.locks().unwrap();
    let mut second = TalkStore::open(&connection, config).await.unwrap().with_locks(locks);

    let event = insert_event(first.client_mut(), "PHPNW").await;
    let talk = first
        .create_talk(NewTalk::new(event, "Shared", starts_at()))
        .await
        .unwrap();

    let seen = second.get_talk(talk.id).await.unwrap().unwrap();
    assert_eq!(seen.stub, talk.stub);
    assert_eq!(seen.slug, talk.slug);

    let left = tokio::spawn(async move {
        let names = vec!["Ada".to_string(), "Grace".to_string()];
        first.set_speakers(talk.id, &names).await.unwrap();
        first
    });
    let right = tokio::spawn(async move {
        let names = vec!["Barbara".to_string()];
        second.set_speakers(talk.id, &names).await.unwrap();
        second
    });

    let mut first = left.await.unwrap();
    let second = right.await.unwrap();

    let names = display_names(&first.list_speakers(talk.id).await.unwrap());
    assert!(
        names == vec!["Ada", "Grace"] || names == vec!["Barbara"],
        "interleaved reconcile left {:?}",
        names
    );

    second.close().await.unwrap();
    first.close().await.unwrap();
}
