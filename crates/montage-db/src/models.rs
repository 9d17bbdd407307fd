/// Database row types — these map directly to SQLite rows.
/// Distinct from montage-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct ImageRow {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub created_at: String,
}

pub struct AudioTrackRow {
    pub id: String,
    pub mood: String,
    pub url: String,
}
