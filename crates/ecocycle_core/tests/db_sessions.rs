mod common;

use crate::common::{add_user, fresh_db, fresh_pool};
use ecocycle_core::auth::SessionToken;
use ecocycle_core::db::queries::{sessions, users};

#[test]
fn session_lifecycle() {
    let con = fresh_db();
    let uid = add_user(&con, "Tamanda", "0993000001");
    let token = SessionToken::generate();

    sessions::create_session(&con, &token.digest(), uid).unwrap();
    assert_eq!(sessions::session_user(&con, &token.digest()).unwrap(), Some(uid));

    // The raw token is never a key.
    assert_eq!(sessions::session_user(&con, token.as_str()).unwrap(), None);

    assert_eq!(sessions::delete_session(&con, &token.digest()).unwrap(), 1);
    assert_eq!(sessions::session_user(&con, &token.digest()).unwrap(), None);
}

#[test]
fn duplicate_phone_is_rejected_by_schema() {
    let con = fresh_db();
    add_user(&con, "First", "0993000002");
    assert!(
        users::insert_user(
            &con,
            "Second",
            "0993000002",
            "x",
            ecocycle_core::model::UserType::Company
        )
        .is_err()
    );
}

#[test]
fn profile_photo_upsert() {
    let con = fresh_db();
    let uid = add_user(&con, "Pic", "0993000003");

    users::upsert_user_photo(&con, uid, Some("/uploads/a.png")).unwrap();
    users::upsert_user_photo(&con, uid, Some("/uploads/b.png")).unwrap();

    let user = users::find_user_by_id(&con, uid).unwrap().unwrap();
    assert_eq!(user.photo_url.as_deref(), Some("/uploads/b.png"));
    assert_eq!(user.user_type, "individual");
}

#[tokio::test]
async fn pool_runs_queries_off_the_runtime() {
    let pool = fresh_pool();

    let uid = pool
        .run(|con| {
            users::insert_user(
                con,
                "Pooled",
                "0993000004",
                "x",
                ecocycle_core::model::UserType::Individual,
            )
        })
        .await
        .unwrap();

    let found = pool
        .run(move |con| users::find_user_by_id(con, uid))
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.user_name).as_deref(), Some("Pooled"));
    assert_eq!(pool.available(), pool.options().max_size);
}
