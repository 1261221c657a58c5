use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::db::now_utc;
use crate::model::{ChatMessage, ChatThreadSummary};

pub fn find_thread_between(con: &Connection, a: i64, b: i64) -> Result<Option<i64>> {
    let id = con
        .query_row(
            r#"
            SELECT thread_id
            FROM chat_threads
            WHERE (user1_id = ?1 AND user2_id = ?2)
               OR (user1_id = ?2 AND user2_id = ?1)
            ORDER BY thread_id
            LIMIT 1
            "#,
            params![a, b],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// One thread per user pair. Returns `(thread_id, created_new)`.
///
/// The lookup and insert share an immediate transaction, so two callers
/// opening the same pair at once end up with one thread.
pub fn open_thread(con: &mut Connection, user_id: i64, recipient_id: i64) -> Result<(i64, bool)> {
    let tx = con
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to start chat thread transaction")?;

    if let Some(id) = find_thread_between(&tx, user_id, recipient_id)? {
        return Ok((id, false));
    }

    tx.execute(
        "INSERT INTO chat_threads (user1_id, user2_id, last_updated) VALUES (?1, ?2, ?3)",
        params![user_id, recipient_id, now_utc()],
    )
    .context("Failed to create chat thread")?;
    let id = tx.last_insert_rowid();

    tx.commit().context("Failed to commit chat thread")?;
    Ok((id, true))
}

pub fn is_participant(con: &Connection, thread_id: i64, user_id: i64) -> Result<bool> {
    let n: i64 = con.query_row(
        r#"
        SELECT COUNT(*)
        FROM chat_threads
        WHERE thread_id = ?1 AND (user1_id = ?2 OR user2_id = ?2)
        "#,
        params![thread_id, user_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

fn summary_from_row(r: &Row<'_>) -> rusqlite::Result<ChatThreadSummary> {
    Ok(ChatThreadSummary {
        thread_id: r.get("thread_id")?,
        other_user_id: r.get("other_user_id")?,
        other_user_name: r.get("other_user_name")?,
        photo_url: r.get("photo_url")?,
        last_message: r.get("last_message")?,
        last_message_time: r.get("last_message_time")?,
        opened: r.get("opened")?,
    })
}

/// Threads the user takes part in, most recently active first.
pub fn list_threads(
    con: &Connection,
    user_id: i64,
    limit: Option<usize>,
) -> Result<Vec<ChatThreadSummary>> {
    let mut stmt = con.prepare(
        r#"
        SELECT
          t.thread_id AS thread_id,
          u.id        AS other_user_id,
          u.user_name AS other_user_name,
          up.photo_url,
          t.last_message AS last_message,
          CASE WHEN t.last_message IS NULL THEN NULL ELSE t.last_updated END
                         AS last_message_time,
          (SELECT m.opened
             FROM messages m
            WHERE m.thread_id = t.thread_id
            ORDER BY m.message_id DESC
            LIMIT 1)     AS opened
        FROM chat_threads t
        JOIN users u
          ON u.id = CASE WHEN t.user1_id = ?1 THEN t.user2_id ELSE t.user1_id END
        LEFT JOIN user_photo up ON up.user_id = u.id
        WHERE t.user1_id = ?1 OR t.user2_id = ?1
        ORDER BY t.last_updated DESC, t.thread_id DESC
        LIMIT ?2
        "#,
    )?;

    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let rows = stmt
        .query_map(params![user_id, limit], summary_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Store a message and denormalize it onto the thread.
pub fn post_message(
    con: &mut Connection,
    thread_id: i64,
    sender_id: i64,
    text: &str,
) -> Result<ChatMessage> {
    let sent_at = now_utc();
    let tx = con
        .transaction()
        .context("Failed to start message transaction")?;

    tx.execute(
        r#"
        INSERT INTO messages (thread_id, sender_id, message_text, sent_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![thread_id, sender_id, text, sent_at],
    )
    .context("Failed to insert message")?;
    let id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE chat_threads SET last_message = ?1, last_updated = ?2 WHERE thread_id = ?3",
        params![text, sent_at, thread_id],
    )
    .context("Failed to update chat thread")?;

    tx.commit().context("Failed to commit message")?;

    Ok(ChatMessage {
        id,
        sender_id,
        text: text.to_string(),
        sent_at,
        sender: "user".to_string(),
    })
}

/// Messages oldest first, labelled from the viewer's perspective.
pub fn thread_messages(con: &Connection, thread_id: i64, viewer_id: i64) -> Result<Vec<ChatMessage>> {
    let mut stmt = con.prepare(
        r#"
        SELECT
          message_id,
          sender_id,
          message_text,
          sent_at,
          CASE WHEN sender_id = ?1 THEN 'user' ELSE 'bot' END AS sender
        FROM messages
        WHERE thread_id = ?2
        ORDER BY sent_at ASC, message_id ASC
        "#,
    )?;

    let rows = stmt
        .query_map(params![viewer_id, thread_id], |r| {
            Ok(ChatMessage {
                id: r.get(0)?,
                sender_id: r.get(1)?,
                text: r.get(2)?,
                sent_at: r.get(3)?,
                sender: r.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Mark everything the counterpart sent in this thread as opened.
pub fn mark_opened(con: &Connection, thread_id: i64, viewer_id: i64) -> Result<usize> {
    let n = con.execute(
        "UPDATE messages SET opened = 'yes' WHERE thread_id = ?1 AND sender_id <> ?2",
        params![thread_id, viewer_id],
    )?;
    Ok(n)
}
