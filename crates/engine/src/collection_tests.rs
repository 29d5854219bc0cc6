// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{eventually, Fixture, WAIT};
use dock_adapters::{FakeModules, FakeVcs};
use dock_core::message::{
    ProjectProcessRequest, ProjectRemoveRequest, ProjectUrlRequest, ProjectUrlResponse,
    VcsCloneRequest,
};
use dock_core::test_support::next_matching;
use dock_storage::ProjectRecord;

const URL: &str = "https://github.com/sinnerschrader/patternplate.git";

fn open(fx: &Fixture) -> ProjectCollection<FakeVcs, FakeModules> {
    let store = Store::open(fx.dir.path().join("store.json")).unwrap();
    ProjectCollection::from_store(store, fx.deps())
}

fn stored(fx: &Fixture) -> Vec<ProjectRecord> {
    Store::open(fx.dir.path().join("store.json")).unwrap().projects().to_vec()
}

#[tokio::test]
async fn added_projects_are_persisted() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let project = collection.add_by_url(URL, true).unwrap();

    let records = stored(&fx);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, project.id());
    assert_eq!(records[0].url.as_deref(), Some(URL));
    assert!(records[0].auto_start);
}

#[tokio::test]
async fn duplicate_urls_are_rejected() {
    let fx = Fixture::new();
    let collection = open(&fx);
    collection.add_by_url(URL, false).unwrap();

    let err = collection.add_by_url(&format!("  {URL} "), false).err().unwrap();
    assert!(matches!(err, EngineError::DuplicateUrl(_)));
    assert_eq!(collection.len(), 1);
    assert!(matches!(collection.add_by_url("", false), Err(EngineError::InvalidInput(_))));
}

#[tokio::test]
async fn restores_projects_from_the_store() {
    let fx = Fixture::new();
    let id = {
        let collection = open(&fx);
        collection.add_by_url(URL, false).unwrap().id()
    };

    let collection = open(&fx);
    let project = collection.get(id.as_str()).unwrap();
    assert_eq!(project.url().as_deref(), Some(URL));
    assert_eq!(project.name().as_deref(), Some("patternplate"));
}

#[tokio::test]
async fn opened_directories_read_their_remote() {
    let fx = Fixture::new();
    fx.vcs.set_remote_url(Some("git@github.com:acme/library.git"));
    let checkout = fx.dir.path().join("library");
    std::fs::create_dir_all(&checkout).unwrap();
    let collection = open(&fx);

    let project = collection.add_from_path(&checkout).unwrap();
    assert!(!project.managed());
    assert!(eventually(|| project.name().as_deref() == Some("acme/library")).await);
    assert!(eventually(|| {
        stored(&fx).first().and_then(|r| r.name.clone()).as_deref() == Some("acme/library")
    })
    .await);
}

#[tokio::test]
async fn opening_a_missing_directory_fails() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let err = collection.add_from_path(&fx.dir.path().join("nope")).err().unwrap();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert!(collection.is_empty());
}

#[tokio::test]
async fn lookup_by_id_prefix() {
    let fx = Fixture::new();
    let mut records = Vec::new();
    for id in ["alpha-1", "alpha-12", "beta"] {
        let mut record = ProjectRecord::new(ProjectId::new(id));
        record.url = Some(format!("https://example.com/{id}.git"));
        records.push(record);
    }
    let mut store = Store::open(fx.dir.path().join("store.json")).unwrap();
    store.set_projects(records);
    let collection = ProjectCollection::from_store(store, fx.deps());

    assert_eq!(collection.get("alpha-1").unwrap().id(), "alpha-1");
    assert_eq!(collection.get("b").unwrap().id(), "beta");
    assert!(matches!(
        collection.get("alpha"),
        Err(EngineError::AmbiguousProject { count: 2, .. })
    ));
    assert!(matches!(collection.get("zeta"), Err(EngineError::ProjectNotFound(p)) if p == "zeta"));
}

#[tokio::test]
async fn project_traffic_is_merged_onto_the_collection() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let project = collection.add_by_url(URL, false).unwrap();
    let mut up = collection.channel().up.subscribe();
    let mut down = collection.channel().down.subscribe();

    let request = Message::fresh(ProjectUrlRequest {});
    project.request(request.clone());
    let forwarded = next_matching::<ProjectUrlRequest>(&mut down, WAIT).await.unwrap();
    assert_eq!(forwarded.tid, request.tid);
    assert!(next_matching::<ProjectUrlResponse>(&mut up, WAIT).await.is_some());

    project.request(Message::fresh(ProjectProcessRequest {}));
    assert!(next_matching::<VcsCloneRequest>(&mut down, WAIT).await.is_some());
}

#[tokio::test]
async fn broadcast_reaches_every_project() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let a = collection.add_by_url("https://example.com/a.git", false).unwrap();
    let b = collection.add_by_url("https://example.com/b.git", false).unwrap();
    let mut a_down = a.channel().down.subscribe();
    let mut b_down = b.channel().down.subscribe();

    collection.broadcast(&Message::fresh(ProjectUrlRequest {}));
    assert!(next_matching::<ProjectUrlRequest>(&mut a_down, WAIT).await.is_some());
    assert!(next_matching::<ProjectUrlRequest>(&mut b_down, WAIT).await.is_some());
}

#[tokio::test]
async fn removed_projects_leave_the_collection_and_the_store() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let project = collection.add_by_url(URL, false).unwrap();
    collection.add_by_url("https://example.com/other.git", false).unwrap();
    std::fs::create_dir_all(project.path().unwrap()).unwrap();

    project.request(Message::fresh(ProjectRemoveRequest {}));
    assert!(eventually(|| collection.len() == 1).await);
    assert!(collection.get(project.id().as_str()).is_err());
    assert!(eventually(|| stored(&fx).len() == 1).await);
}

#[tokio::test]
async fn discarded_projects_are_dropped() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let project = collection.add_empty().unwrap();
    assert_eq!(stored(&fx).len(), 1);

    project.channel().up.next(Message::fresh(ProjectDiscardNotification { id: project.id() }));
    assert!(eventually(|| collection.is_empty()).await);
    assert!(eventually(|| stored(&fx).is_empty()).await);
}

#[tokio::test]
async fn save_request_adds_unknown_urls() {
    let fx = Fixture::new();
    let collection = open(&fx);
    let mut up = collection.channel().up.subscribe();

    let request =
        Message::fresh(ProjectSaveRequest { name: "Patternplate".into(), url: URL.into() });
    collection.channel().down.next(request.clone());
    let response = next_matching::<ProjectSaveResponse>(&mut up, WAIT).await.unwrap();
    assert_eq!(response.tid, request.tid);
    assert!(response.narrow::<ProjectSaveResponse>().unwrap().success);
    assert!(eventually(|| collection.len() == 1).await);
    assert!(eventually(|| {
        collection.items().first().and_then(|p| p.name()).as_deref() == Some("Patternplate")
    })
    .await);

    collection.channel().down.next(Message::fresh(ProjectSaveRequest {
        name: String::new(),
        url: URL.into(),
    }));
    let response = next_matching::<ProjectSaveResponse>(&mut up, WAIT).await.unwrap();
    assert!(!response.narrow::<ProjectSaveResponse>().unwrap().success);
    assert_eq!(collection.len(), 1);
}

#[tokio::test]
async fn input_survives_a_reopen() {
    let fx = Fixture::new();
    open(&fx).set_input(URL).unwrap();
    assert_eq!(open(&fx).input(), URL);
}
