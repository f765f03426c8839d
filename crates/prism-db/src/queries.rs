use crate::Database;
use crate::convo::MessageStore;
use crate::models::{CommentRow, MessageRow, PostRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

const POST_SELECT: &str = "SELECT p.id, p.created_by, u.username, u.profile_picture,
        p.caption, p.image_url, p.video_url, p.location, p.tags,
        p.likes, p.saves, p.created_at
     FROM posts p
     LEFT JOIN users u ON p.created_by = u.id";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, profile_picture, bio, created_at
                 FROM users ORDER BY username",
            )?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Profile picture is only replaced when a new reference is supplied.
    pub fn update_user_profile(
        &self,
        id: &str,
        username: &str,
        bio: &str,
        profile_picture: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET username = ?2, bio = ?3,
                        profile_picture = COALESCE(?4, profile_picture)
                 WHERE id = ?1",
                rusqlite::params![id, username, bio, profile_picture],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Follows --

    pub fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                    [follower_id, following_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Toggle the follow edge; returns true when the caller now follows.
    pub fn toggle_follow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                [follower_id, following_id],
            )?;
            let following = if removed == 0 {
                tx.execute(
                    "INSERT INTO follows (follower_id, following_id) VALUES (?1, ?2)",
                    [follower_id, following_id],
                )?;
                true
            } else {
                false
            };
            tx.commit()?;
            Ok(following)
        })
    }

    pub fn get_following_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| query_id_column(
            conn,
            "SELECT following_id FROM follows WHERE follower_id = ?1",
            user_id,
        ))
    }

    pub fn get_follower_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| query_id_column(
            conn,
            "SELECT follower_id FROM follows WHERE following_id = ?1",
            user_id,
        ))
    }

    // -- Posts --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_post(
        &self,
        id: &str,
        created_by: &str,
        caption: Option<&str>,
        image_url: Option<&str>,
        video_url: Option<&str>,
        location: Option<&str>,
        tags: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, created_by, caption, image_url, video_url, location, tags, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![id, created_by, caption, image_url, video_url, location, tags, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!("{POST_SELECT} WHERE p.id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_post).optional()?;
            Ok(row)
        })
    }

    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| query_posts(conn, &format!("{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC"), &[]))
    }

    pub fn list_posts_by_user(&self, user_id: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            query_posts(
                conn,
                &format!("{POST_SELECT} WHERE p.created_by = ?1 ORDER BY p.created_at DESC, p.id DESC"),
                &[user_id],
            )
        })
    }

    /// Posts authored by users the caller follows, newest first.
    pub fn list_feed_posts(&self, user_id: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            query_posts(
                conn,
                &format!(
                    "{POST_SELECT}
                     WHERE p.created_by IN
                         (SELECT following_id FROM follows WHERE follower_id = ?1)
                     ORDER BY p.created_at DESC, p.id DESC"
                ),
                &[user_id],
            )
        })
    }

    pub fn list_saved_posts(&self, user_id: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            query_posts(
                conn,
                &format!(
                    "{POST_SELECT}
                     JOIN saves s ON s.post_id = p.id
                     WHERE s.user_id = ?1
                     ORDER BY p.created_at DESC, p.id DESC"
                ),
                &[user_id],
            )
        })
    }

    /// Only the provided fields change; absent fields keep their value.
    pub fn update_post(
        &self,
        id: &str,
        caption: Option<&str>,
        location: Option<&str>,
        tags: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET caption = COALESCE(?2, caption),
                        location = COALESCE(?3, location),
                        tags = COALESCE(?4, tags)
                 WHERE id = ?1",
                rusqlite::params![id, caption, location, tags],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a post and cascade its likes, saves, and comments in one
    /// transaction, so a crash mid-delete can never orphan child records.
    pub fn delete_post_cascade(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM likes WHERE post_id = ?1", [id])?;
            tx.execute("DELETE FROM saves WHERE post_id = ?1", [id])?;
            tx.execute("DELETE FROM comments WHERE post_id = ?1", [id])?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
    }

    /// Toggle a like: removes if present, inserts if not, keeping the
    /// denormalized counter in step inside the same transaction.
    /// Returns true when the post is now liked by the user.
    pub fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<bool> {
        self.toggle_mark(post_id, user_id, "likes", "likes")
    }

    /// Same toggle shape as likes, against the saves table and counter.
    pub fn toggle_save(&self, post_id: &str, user_id: &str) -> Result<bool> {
        self.toggle_mark(post_id, user_id, "saves", "saves")
    }

    fn toggle_mark(
        &self,
        post_id: &str,
        user_id: &str,
        table: &str,
        counter: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute(
                &format!("DELETE FROM {table} WHERE post_id = ?1 AND user_id = ?2"),
                [post_id, user_id],
            )?;
            let added = if removed == 0 {
                tx.execute(
                    &format!("INSERT INTO {table} (post_id, user_id) VALUES (?1, ?2)"),
                    [post_id, user_id],
                )?;
                tx.execute(
                    &format!("UPDATE posts SET {counter} = {counter} + 1 WHERE id = ?1"),
                    [post_id],
                )?;
                true
            } else {
                tx.execute(
                    &format!("UPDATE posts SET {counter} = {counter} - 1 WHERE id = ?1"),
                    [post_id],
                )?;
                false
            };
            tx.commit()?;
            Ok(added)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        post_id: &str,
        user_id: &str,
        text: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, post_id, user_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, post_id, user_id, text, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.post_id, c.user_id, c.text, u.username, u.profile_picture, c.created_at
                 FROM comments c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.id = ?1",
            )?;
            let row = stmt.query_row([id], map_comment).optional()?;
            Ok(row)
        })
    }

    pub fn list_comments(&self, post_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.post_id, c.user_id, c.text, u.username, u.profile_picture, c.created_at
                 FROM comments c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.post_id = ?1
                 ORDER BY c.created_at DESC, c.id DESC",
            )?;
            let rows = stmt
                .query_map([post_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_comment(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Messages --

    /// Drop every message in a conversation. Used by request decline.
    pub fn delete_conversation(&self, conversation_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM messages WHERE conversation_id = ?1",
                [conversation_id],
            )?;
            Ok(deleted)
        })
    }
}

impl MessageStore for Database {
    fn find_messages_by_user(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, receiver_id, body, is_read, created_at
                 FROM messages
                 WHERE sender_id = ?1 OR receiver_id = ?1",
            )?;
            let rows = stmt
                .query_map([user_id], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn find_messages_by_conversation(&self, conversation_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, receiver_id, body, is_read, created_at
                 FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([conversation_id], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn insert_message(&self, row: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, receiver_id, body, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    row.id,
                    row.conversation_id,
                    row.sender_id,
                    row.receiver_id,
                    row.body,
                    row.is_read,
                    row.created_at
                ],
            )?;
            Ok(())
        })
    }

    fn update_read_flag(&self, conversation_id: &str, receiver_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET is_read = 1
                 WHERE conversation_id = ?1 AND receiver_id = ?2",
                [conversation_id, receiver_id],
            )?;
            Ok(())
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, password, profile_picture, bio, created_at
         FROM users WHERE {column} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], map_user).optional()?;
    Ok(row)
}

fn query_id_column(conn: &Connection, sql: &str, param: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([param], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

fn query_posts(conn: &Connection, sql: &str, params: &[&str]) -> Result<Vec<PostRow>> {
    let mut stmt = conn.prepare(sql)?;
    let bound: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p as &dyn rusqlite::types::ToSql).collect();
    let rows = stmt
        .query_map(bound.as_slice(), map_post)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_user(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        profile_picture: row.get(4)?,
        bio: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_post(row: &rusqlite::Row<'_>) -> std::result::Result<PostRow, rusqlite::Error> {
    Ok(PostRow {
        id: row.get(0)?,
        created_by: row.get(1)?,
        author_username: row.get(2)?,
        author_profile_picture: row.get(3)?,
        caption: row.get(4)?,
        image_url: row.get(5)?,
        video_url: row.get(6)?,
        location: row.get(7)?,
        tags: row.get(8)?,
        likes: row.get(9)?,
        saves: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn map_comment(row: &rusqlite::Row<'_>) -> std::result::Result<CommentRow, rusqlite::Error> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        text: row.get(3)?,
        username: row.get(4)?,
        profile_picture: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_message(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        body: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convo::{conversation_heads, conversation_key, pending_requests};

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_user(db: &Database, id: &str, name: &str) {
        db.create_user(id, name, &format!("{name}@example.com"), "hash")
            .unwrap();
    }

    fn send(db: &Database, id: &str, from: &str, to: &str, body: &str, at: &str) -> MessageRow {
        let row = MessageRow {
            id: id.to_string(),
            conversation_id: conversation_key(from, to),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            body: body.to_string(),
            is_read: false,
            created_at: at.to_string(),
        };
        db.insert_message(&row).unwrap();
        row
    }

    fn count(db: &Database, sql: &str, param: &str) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row(sql, [param], |row| row.get(0))?))
            .unwrap()
    }

    #[test]
    fn mark_read_only_touches_the_callers_inbound_messages() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");

        send(&db, "m1", "a", "b", "hi", "2026-01-01T10:00:00Z");
        send(&db, "m2", "b", "a", "hello", "2026-01-01T10:01:00Z");

        let conv = conversation_key("a", "b");
        db.update_read_flag(&conv, "b").unwrap();

        let msgs = db.find_messages_by_conversation(&conv).unwrap();
        assert!(msgs.iter().find(|m| m.id == "m1").unwrap().is_read);
        // Amy's inbound message stays unread.
        assert!(!msgs.iter().find(|m| m.id == "m2").unwrap().is_read);

        // Idempotent.
        db.update_read_flag(&conv, "b").unwrap();
        let msgs = db.find_messages_by_conversation(&conv).unwrap();
        assert!(msgs.iter().find(|m| m.id == "m1").unwrap().is_read);
    }

    #[test]
    fn conversation_listing_is_oldest_first() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");

        send(&db, "m2", "b", "a", "second", "2026-01-01T11:00:00Z");
        send(&db, "m1", "a", "b", "first", "2026-01-01T10:00:00Z");

        let msgs = db
            .find_messages_by_conversation(&conversation_key("a", "b"))
            .unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
    }

    #[test]
    fn unread_scenario_new_message_from_amy_to_ben() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");

        send(&db, "m1", "a", "b", "hi", "2026-01-01T10:00:00Z");

        let bens = conversation_heads(&db.find_messages_by_user("b").unwrap(), "b");
        assert_eq!(bens.len(), 1);
        assert!(bens[0].unread);

        let amys = conversation_heads(&db.find_messages_by_user("a").unwrap(), "a");
        assert_eq!(amys.len(), 1);
        assert!(!amys[0].unread);
    }

    #[test]
    fn reply_removes_the_request_for_both_sides() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");

        send(&db, "m1", "a", "b", "hi", "2026-01-01T10:00:00Z");
        assert_eq!(pending_requests(&db.find_messages_by_user("b").unwrap(), "b").len(), 1);

        send(&db, "m2", "b", "a", "hello", "2026-01-01T10:05:00Z");
        assert!(pending_requests(&db.find_messages_by_user("b").unwrap(), "b").is_empty());
        assert!(pending_requests(&db.find_messages_by_user("a").unwrap(), "a").is_empty());
    }

    #[test]
    fn decline_drops_every_message_in_the_conversation() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");
        add_user(&db, "c", "cal");

        send(&db, "m1", "a", "b", "hi", "2026-01-01T10:00:00Z");
        send(&db, "m2", "a", "b", "you there?", "2026-01-01T10:01:00Z");
        send(&db, "m3", "c", "b", "unrelated", "2026-01-01T10:02:00Z");

        let deleted = db.delete_conversation(&conversation_key("a", "b")).unwrap();
        assert_eq!(deleted, 2);
        assert!(db.find_messages_by_conversation(&conversation_key("a", "b")).unwrap().is_empty());
        assert_eq!(db.find_messages_by_conversation(&conversation_key("c", "b")).unwrap().len(), 1);
    }

    #[test]
    fn like_toggle_restores_the_counter() {
        let db = test_db();
        add_user(&db, "a", "amy");
        db.insert_post("p1", "a", Some("sunset"), Some("img.jpg"), None, None, None, "2026-01-01T10:00:00Z")
            .unwrap();

        assert!(db.toggle_like("p1", "a").unwrap());
        assert_eq!(db.get_post("p1").unwrap().unwrap().likes, 1);

        // Second toggle unlikes and the counter returns to its old value.
        assert!(!db.toggle_like("p1", "a").unwrap());
        assert_eq!(db.get_post("p1").unwrap().unwrap().likes, 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM likes WHERE post_id = ?1", "p1"), 0);
    }

    #[test]
    fn save_toggle_and_saved_listing() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");
        db.insert_post("p1", "a", None, Some("img.jpg"), None, None, None, "2026-01-01T10:00:00Z")
            .unwrap();

        assert!(db.toggle_save("p1", "b").unwrap());
        let saved = db.list_saved_posts("b").unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, "p1");
        assert_eq!(saved[0].saves, 1);

        assert!(!db.toggle_save("p1", "b").unwrap());
        assert!(db.list_saved_posts("b").unwrap().is_empty());
    }

    #[test]
    fn post_delete_cascades_children_to_zero() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");
        db.insert_post("p1", "a", None, Some("img.jpg"), None, None, None, "2026-01-01T10:00:00Z")
            .unwrap();

        db.toggle_like("p1", "b").unwrap();
        db.toggle_save("p1", "b").unwrap();
        db.insert_comment("c1", "p1", "b", "nice", "2026-01-01T10:05:00Z").unwrap();

        assert!(db.delete_post_cascade("p1").unwrap());
        assert!(db.get_post("p1").unwrap().is_none());
        for table in ["likes", "saves", "comments"] {
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE post_id = ?1");
            assert_eq!(count(&db, &sql, "p1"), 0);
        }
    }

    #[test]
    fn feed_contains_only_followed_authors() {
        let db = test_db();
        add_user(&db, "a", "amy");
        add_user(&db, "b", "ben");
        add_user(&db, "c", "cal");
        db.insert_post("p1", "b", None, Some("b.jpg"), None, None, None, "2026-01-01T10:00:00Z")
            .unwrap();
        db.insert_post("p2", "c", None, Some("c.jpg"), None, None, None, "2026-01-01T11:00:00Z")
            .unwrap();

        assert!(db.toggle_follow("a", "b").unwrap());
        let feed = db.list_feed_posts("a").unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "p1");
        assert_eq!(feed[0].author_username.as_deref(), Some("ben"));

        // Unfollow empties the feed again.
        assert!(!db.toggle_follow("a", "b").unwrap());
        assert!(db.list_feed_posts("a").unwrap().is_empty());
    }

    #[test]
    fn update_post_keeps_absent_fields() {
        let db = test_db();
        add_user(&db, "a", "amy");
        db.insert_post("p1", "a", Some("old"), Some("img.jpg"), None, Some("berlin"), None, "2026-01-01T10:00:00Z")
            .unwrap();

        assert!(db.update_post("p1", Some("new"), None, None).unwrap());
        let post = db.get_post("p1").unwrap().unwrap();
        assert_eq!(post.caption.as_deref(), Some("new"));
        assert_eq!(post.location.as_deref(), Some("berlin"));
    }
}
