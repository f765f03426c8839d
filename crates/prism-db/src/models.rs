/// Database row types — these map directly to SQLite rows.
/// Distinct from prism-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
    pub bio: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub created_by: String,
    pub author_username: Option<String>,
    pub author_profile_picture: Option<String>,
    pub caption: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub tags: Option<String>,
    pub likes: i64,
    pub saves: i64,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub text: String,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}
