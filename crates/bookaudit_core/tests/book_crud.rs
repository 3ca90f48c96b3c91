use bookaudit_core::{
    authorize, open_db_in_memory, register_user, AuditSession, Author, AuthorId,
    AuthorRepository, Book, BookPatch, BookRepository, BookService, Filter, Operation, RepoError,
    OBJECT_BOOKS,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    register_user(&conn, "bill").unwrap();
    conn
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_author(session: &AuditSession<'_>, name: &str) -> AuthorId {
    session
        .create_author(&Author::new(name, date(1882, 1, 25)))
        .unwrap()
}

fn book_events(session: &AuditSession<'_>) -> Vec<(Operation, Option<i64>)> {
    session
        .query_events(&[Filter::object_type(OBJECT_BOOKS)])
        .unwrap()
        .into_iter()
        .map(|event| (event.operation, event.object_id))
        .collect()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let author_id = seed_author(&session, "Virginia Woolf");

    let book_id = session
        .create_book(&Book::new(author_id, "Orlando", date(1928, 10, 11)))
        .unwrap();
    let loaded = session.get_book(author_id, book_id).unwrap();

    assert_eq!(loaded.id, book_id);
    assert_eq!(loaded.author_id, author_id);
    assert_eq!(loaded.title, "Orlando");
    assert_eq!(loaded.published, date(1928, 10, 11));
    assert_eq!(
        book_events(&session),
        vec![
            (Operation::Create, Some(book_id)),
            (Operation::Read, Some(book_id))
        ]
    );
}

#[test]
fn book_is_only_reachable_through_its_author() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let woolf = seed_author(&session, "Virginia Woolf");
    let austen = seed_author(&session, "Jane Austen");
    let book_id = session
        .create_book(&Book::new(woolf, "Orlando", date(1928, 10, 11)))
        .unwrap();

    assert!(session.get_book(austen, book_id).unwrap_err().is_not_found());
    assert!(session.delete_book(austen, book_id).unwrap_err().is_not_found());

    let mut moved = session.get_book(woolf, book_id).unwrap();
    moved.author_id = austen;
    assert!(session.update_book(&moved).unwrap_err().is_not_found());

    assert_eq!(session.get_book(woolf, book_id).unwrap().title, "Orlando");
}

#[test]
fn create_under_missing_author_is_a_storage_error() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();

    let err = session
        .create_book(&Book::new(99, "Orphan", date(2000, 1, 1)))
        .unwrap_err();

    assert!(matches!(err, RepoError::Storage { .. }));
    assert!(book_events(&session).is_empty());
}

#[test]
fn update_overwrites_title_and_publication_date() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let author_id = seed_author(&session, "Virginia Woolf");
    let book_id = session
        .create_book(&Book::new(author_id, "The Waves", date(1931, 10, 8)))
        .unwrap();

    let mut changed = session.get_book(author_id, book_id).unwrap();
    changed.title = "The Waves (revised)".to_string();
    changed.published = date(1931, 10, 9);
    session.update_book(&changed).unwrap();

    assert_eq!(session.get_book(author_id, book_id).unwrap(), changed);
}

#[test]
fn list_returns_books_of_every_author() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    assert!(session.list_books().unwrap().is_empty());

    let woolf = seed_author(&session, "Virginia Woolf");
    let austen = seed_author(&session, "Jane Austen");
    session
        .create_book(&Book::new(woolf, "Orlando", date(1928, 10, 11)))
        .unwrap();
    session
        .create_book(&Book::new(austen, "Emma", date(1815, 12, 23)))
        .unwrap();

    let titles: Vec<String> = session
        .list_books()
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(titles, vec!["Orlando", "Emma"]);
}

#[test]
fn deleting_an_author_removes_their_books() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let author_id = seed_author(&session, "Virginia Woolf");
    let book_id = session
        .create_book(&Book::new(author_id, "Orlando", date(1928, 10, 11)))
        .unwrap();

    session.delete_author(author_id).unwrap();

    assert!(session.get_book(author_id, book_id).unwrap_err().is_not_found());
    assert!(session.list_books().unwrap().is_empty());
}

#[test]
fn invalid_book_is_rejected_before_storage() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let author_id = seed_author(&session, "Virginia Woolf");

    let err = session
        .create_book(&Book::new(author_id, "", date(1928, 10, 11)))
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(book_events(&session).is_empty());
}

#[test]
fn service_patch_is_not_implemented_and_touches_nothing() {
    let conn = setup();
    let session = authorize(&conn, "bill").unwrap();
    let author_id = seed_author(&session, "Virginia Woolf");
    let service = BookService::new(&session);
    let book_id = service
        .create_book(&Book::new(author_id, "Orlando", date(1928, 10, 11)))
        .unwrap();

    let err = service
        .patch_book(
            author_id,
            book_id,
            &BookPatch {
                title: Some("Orlando: A Biography".to_string()),
                published: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, RepoError::NotImplemented("book update")));
    assert!(!err.is_not_found());
    assert_eq!(book_events(&session), vec![(Operation::Create, Some(book_id))]);
    assert_eq!(service.get_book(author_id, book_id).unwrap().title, "Orlando");
}
