mod common;

use std::thread;

use crate::common::{add_user, fresh_db, temp_db_path};
use ecocycle_core::db::queries::chat;
use ecocycle_core::db::{migrate, open_db};

#[test]
fn one_thread_per_pair() {
    let mut con = fresh_db();
    let a = add_user(&con, "A", "0992000001");
    let b = add_user(&con, "B", "0992000002");

    let (t1, created) = chat::open_thread(&mut con, a, b).unwrap();
    assert!(created);

    let (t2, created) = chat::open_thread(&mut con, b, a).unwrap();
    assert!(!created);
    assert_eq!(t1, t2);
}

#[test]
fn messages_are_labelled_and_marked_opened() {
    let mut con = fresh_db();
    let a = add_user(&con, "A", "0992000003");
    let b = add_user(&con, "B", "0992000004");
    let stranger = add_user(&con, "C", "0992000005");
    let (thread, _) = chat::open_thread(&mut con, a, b).unwrap();

    assert!(chat::is_participant(&con, thread, a).unwrap());
    assert!(!chat::is_participant(&con, thread, stranger).unwrap());

    chat::post_message(&mut con, thread, a, "Do you still have the copper?").unwrap();
    chat::post_message(&mut con, thread, b, "Yes, 40kg").unwrap();

    let seen_by_b = chat::thread_messages(&con, thread, b).unwrap();
    assert_eq!(seen_by_b.len(), 2);
    assert_eq!(seen_by_b[0].sender, "bot");
    assert_eq!(seen_by_b[1].sender, "user");

    assert_eq!(chat::mark_opened(&con, thread, b).unwrap(), 1);

    let threads = chat::list_threads(&con, a, None).unwrap();
    assert_eq!(threads.len(), 1);
    assert!(threads[0].last_message_time.is_some());
    assert_eq!(threads[0].other_user_id, b);
    assert_eq!(threads[0].last_message.as_deref(), Some("Yes, 40kg"));
    assert_eq!(threads[0].opened.as_deref(), Some("no"));

    let last: String = con
        .query_row(
            "SELECT last_message FROM chat_threads WHERE thread_id = ?1",
            [thread],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(last, "Yes, 40kg");
}

#[test]
fn recent_threads_are_limited() {
    let mut con = fresh_db();
    let me = add_user(&con, "Me", "0992000010");
    for i in 0..7 {
        let other = add_user(&con, &format!("U{i}"), &format!("09920001{i:02}"));
        chat::open_thread(&mut con, me, other).unwrap();
    }

    assert_eq!(chat::list_threads(&con, me, Some(5)).unwrap().len(), 5);
    assert_eq!(chat::list_threads(&con, me, None).unwrap().len(), 7);
}

#[test]
fn new_thread_has_no_last_message() {
    let mut con = fresh_db();
    let a = add_user(&con, "A", "0992000020");
    let b = add_user(&con, "B", "0992000021");
    chat::open_thread(&mut con, a, b).unwrap();

    let threads = chat::list_threads(&con, b, None).unwrap();
    assert_eq!(threads[0].other_user_id, a);
    assert_eq!(threads[0].last_message, None);
    assert_eq!(threads[0].last_message_time, None);
    assert_eq!(threads[0].opened, None);
}

#[test]
fn concurrent_opens_share_one_thread() {
    let path = temp_db_path();
    let mut con = open_db(&path).unwrap();
    migrate::run(&mut con).unwrap();
    let a = add_user(&con, "A", "0992000030");
    let b = add_user(&con, "B", "0992000031");

    let handles: Vec<_> = [(a, b), (b, a), (a, b), (b, a)]
        .into_iter()
        .map(|(from, to)| {
            let path = path.clone();
            thread::spawn(move || {
                let mut con = open_db(&path).unwrap();
                chat::open_thread(&mut con, from, to).unwrap()
            })
        })
        .collect();

    let results: Vec<(i64, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
    assert!(results.iter().all(|(id, _)| *id == results[0].0));

    let n: i64 = con
        .query_row("SELECT COUNT(*) FROM chat_threads", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
}
