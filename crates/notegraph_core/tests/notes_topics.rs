use notegraph_core::db::open_db_in_memory;
use notegraph_core::{
    ContentBlock, InvalidReference, Missing, NoteDraft, NoteRepository, NoteService,
    Prerequisite, ServiceError, SqliteStore, TopicService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn create_note_creates_missing_topics_and_resolves_prerequisites() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let topics = TopicService::new(&store);

    let sets = notes
        .create_note(NoteDraft::new("Sets").in_topics(["Foundations"]))
        .unwrap();
    let functions = notes
        .create_note(
            NoteDraft::new("  Functions ")
                .in_topics(["Algebra", "foundations"])
                .with_prerequisites([sets.id, sets.id])
                .with_blocks(vec![
                    ContentBlock::text("maps"),
                    ContentBlock::image("img/f.png"),
                ]),
        )
        .unwrap();

    let listed = topics.list_topics().unwrap();
    let names: Vec<&str> = listed.iter().map(|topic| topic.name.as_str()).collect();
    assert_eq!(names, vec!["Algebra", "Foundations"]);

    assert_eq!(functions.title, "Functions");
    assert_eq!(functions.owner, "alice");
    assert_eq!(functions.blocks.len(), 2);
    assert_eq!(functions.topics, vec![listed[0].id, listed[1].id]);
    assert_eq!(functions.prerequisites.len(), 1);
    match &functions.prerequisites[0] {
        Prerequisite::Resolved(stub) => {
            assert_eq!(stub.id, sets.id);
            assert_eq!(stub.title, "Sets");
            assert_eq!(stub.topics, vec![listed[1].id]);
        }
        other => panic!("expected resolved prerequisite, got {other:?}"),
    }
}

#[test]
fn create_topic_returns_existing_topic_for_taken_name() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let topics = TopicService::new(&store);

    let first = topics.create_topic("Linear  Algebra").unwrap();
    let again = topics.create_topic("  linear algebra ").unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(again.name, "Linear Algebra");
    assert_eq!(topics.list_topics().unwrap().len(), 1);

    let err = topics.create_topic("   ").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidName(_)));
}

#[test]
fn blank_title_falls_back_to_untitled() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);

    let note = notes.create_note(NoteDraft::new(" ")).unwrap();
    assert_eq!(note.title, "Untitled note");

    let renamed = notes
        .update_note(note.id, "Vectors", vec![ContentBlock::text("arrows")])
        .unwrap();
    assert_eq!(renamed.title, "Vectors");
    assert_eq!(renamed.blocks, vec![ContentBlock::text("arrows")]);
}

#[test]
fn set_prerequisites_rejects_self_reference_before_persisting() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let base = notes.create_note(NoteDraft::new("Base")).unwrap();
    let note = notes
        .create_note(NoteDraft::new("Note").with_prerequisites([base.id]))
        .unwrap();

    let err = notes
        .set_prerequisites(note.id, &[base.id, note.id])
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidReference(InvalidReference::SelfReference(id)) if id == note.id
    ));
    assert_eq!(notes.get_note(note.id).unwrap().prerequisite_ids(), vec![base.id]);
}

#[test]
fn set_prerequisites_rejects_unknown_note_and_keeps_previous_list() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let base = notes.create_note(NoteDraft::new("Base")).unwrap();
    let note = notes
        .create_note(NoteDraft::new("Note").with_prerequisites([base.id]))
        .unwrap();
    let ghost = Uuid::new_v4();

    let err = notes.set_prerequisites(note.id, &[ghost]).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Missing::Note(id)) if id == ghost));
    assert_eq!(notes.get_note(note.id).unwrap().prerequisite_ids(), vec![base.id]);
}

#[test]
fn set_prerequisites_deduplicates_and_keeps_order() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let a = notes.create_note(NoteDraft::new("A")).unwrap();
    let b = notes.create_note(NoteDraft::new("B")).unwrap();
    let c = notes.create_note(NoteDraft::new("C")).unwrap();

    let updated = notes.set_prerequisites(c.id, &[b.id, a.id, b.id]).unwrap();
    assert_eq!(updated.prerequisite_ids(), vec![b.id, a.id]);
}

#[test]
fn store_rejects_self_reference_even_without_service_checks() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let note = NoteService::new(&store)
        .create_note(NoteDraft::new("Loop"))
        .unwrap();

    assert!(store.update_note_prerequisites(note.id, &[note.id]).is_err());
}

#[test]
fn list_notes_by_topic_and_missing_topic() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let topics = TopicService::new(&store);

    let a = notes
        .create_note(NoteDraft::new("A").in_topics(["Algebra"]))
        .unwrap();
    notes
        .create_note(NoteDraft::new("B").in_topics(["Geometry"]))
        .unwrap();
    let algebra = topics.create_topic("Algebra").unwrap();

    let listed = notes.list_notes(Some(algebra.id)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, a.id);
    assert_eq!(notes.list_notes(None).unwrap().len(), 2);

    let missing = Uuid::new_v4();
    let err = notes.list_notes(Some(missing)).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Missing::Topic(id)) if id == missing));
}

#[test]
fn set_note_topics_replaces_memberships() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let topics = TopicService::new(&store);

    let note = notes
        .create_note(NoteDraft::new("Proofs").in_topics(["Logic"]))
        .unwrap();
    let updated = notes
        .set_note_topics(note.id, &["Geometry".to_string(), "Algebra".to_string()])
        .unwrap();

    let algebra = topics.create_topic("Algebra").unwrap();
    let geometry = topics.create_topic("Geometry").unwrap();
    assert_eq!(updated.topics, vec![algebra.id, geometry.id]);
}

#[test]
fn deleting_topic_keeps_member_notes() {
    let conn = setup();
    let store = SqliteStore::try_new(&conn, "alice").unwrap();
    let notes = NoteService::new(&store);
    let topics = TopicService::new(&store);

    let note = notes
        .create_note(NoteDraft::new("Proofs").in_topics(["Logic"]))
        .unwrap();
    topics.delete_topic(note.topics[0]).unwrap();

    let survivor = notes.get_note(note.id).unwrap();
    assert!(survivor.topics.is_empty());
    assert!(matches!(
        topics.delete_topic(note.topics[0]).unwrap_err(),
        ServiceError::NotFound(Missing::Topic(_))
    ));
}

#[test]
fn owners_do_not_see_each_other() {
    let conn = setup();
    let alice = SqliteStore::try_new(&conn, "alice").unwrap();
    let bob = SqliteStore::try_new(&conn, "bob").unwrap();

    let alice_note = NoteService::new(&alice)
        .create_note(NoteDraft::new("Private").in_topics(["Algebra"]))
        .unwrap();
    let bob_topic = TopicService::new(&bob).create_topic("Algebra").unwrap();

    assert_ne!(bob_topic.id, alice_note.topics[0]);
    assert!(NoteService::new(&bob).list_notes(None).unwrap().is_empty());
    assert!(matches!(
        NoteService::new(&bob).get_note(alice_note.id).unwrap_err(),
        ServiceError::NotFound(Missing::Note(_))
    ));

    let bob_note = NoteService::new(&bob)
        .create_note(NoteDraft::new("Mine"))
        .unwrap();
    let err = NoteService::new(&bob)
        .set_prerequisites(bob_note.id, &[alice_note.id])
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Missing::Note(_))));
}
