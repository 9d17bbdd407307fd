use crate::Database;
use crate::models::{AudioTrackRow, ImageRow, UserRow};
use anyhow::Result;
use montage_types::models::{DEFAULT_MOODS, mood_file_name};
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

impl Database {
    // -- Users --

    /// Insert a user. Returns false when the username is already taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Images --

    pub fn insert_image(&self, id: &str, user_id: &str, url: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO images (id, user_id, url) VALUES (?1, ?2, ?3)",
                (id, user_id, url),
            )?;
            Ok(())
        })
    }

    /// All images owned by a user, in upload order.
    pub fn get_images_for_user(&self, user_id: &str) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, url, created_at FROM images WHERE user_id = ?1 ORDER BY rowid",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ImageRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        url: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Audio tracks --

    /// Seed one track per default mood, pointing at `{audio_base_url}/{Mood}.mp3`.
    /// Existing moods are left untouched. Returns the number of rows inserted.
    pub fn seed_audio_tracks(&self, audio_base_url: &str) -> Result<usize> {
        let base = audio_base_url.trim_end_matches('/');
        let inserted = self.with_conn(|conn| {
            let mut inserted = 0;
            for mood in DEFAULT_MOODS {
                let url = format!("{}/{}", base, mood_file_name(mood));
                inserted += conn.execute(
                    "INSERT OR IGNORE INTO audio_tracks (id, mood, url) VALUES (?1, ?2, ?3)",
                    (Uuid::new_v4().to_string(), *mood, url),
                )?;
            }
            Ok(inserted)
        })?;

        if inserted > 0 {
            info!("Seeded {} audio tracks", inserted);
        }
        Ok(inserted)
    }

    pub fn get_audio_track_by_mood(&self, mood: &str) -> Result<Option<AudioTrackRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, mood, url FROM audio_tracks WHERE mood = ?1",
                [mood],
                |row| {
                    Ok(AudioTrackRow {
                        id: row.get(0)?,
                        mood: row.get(1)?,
                        url: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }
}

const USER_COLUMNS: &str = "id, username, password, created_at";

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    conn.query_row(&sql, [value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            created_at: row.get(3)?,
        })
    })
    .optional()
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

    fn db_with_user(username: &str) -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4().to_string();
        assert!(db.create_user(&id, username, "hash").unwrap());
        (db, id)
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (db, first_id) = db_with_user("ana");

        let second = db.create_user(&Uuid::new_v4().to_string(), "ana", "other").unwrap();
        assert!(!second);

        let user = db.get_user_by_username("ana").unwrap().unwrap();
        assert_eq!(user.id, first_id);
        assert_eq!(user.password, "hash");

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unknown_user_lookups_are_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
        assert!(db.get_user_by_id("nope").unwrap().is_none());
    }

    #[test]
    fn images_are_listed_per_owner_in_upload_order() {
        let (db, ana) = db_with_user("ana");
        let bo = Uuid::new_v4().to_string();
        db.create_user(&bo, "bo", "hash").unwrap();

        db.insert_image("i1", &ana, "http://h/static/uploads/a.png").unwrap();
        db.insert_image("i2", &bo, "http://h/static/uploads/b.png").unwrap();
        db.insert_image("i3", &ana, "http://h/static/uploads/c.jpg").unwrap();

        let urls: Vec<String> = db
            .get_images_for_user(&ana)
            .unwrap()
            .into_iter()
            .map(|row| row.url)
            .collect();
        assert_eq!(
            urls,
            vec!["http://h/static/uploads/a.png", "http://h/static/uploads/c.jpg"]
        );
        assert_eq!(db.get_images_for_user(&bo).unwrap().len(), 1);
    }

    #[test]
    fn image_requires_existing_owner() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_image("i1", "ghost", "http://h/x.png").is_err());
    }

    #[test]
    fn audio_seeding_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_audio_tracks("http://h/static/Audio/").unwrap(), 3);
        assert_eq!(db.seed_audio_tracks("http://h/static/Audio").unwrap(), 0);

        let epic = db.get_audio_track_by_mood("Epic").unwrap().unwrap();
        assert_eq!(epic.mood, "Epic");
        assert_eq!(epic.url, "http://h/static/Audio/Epic.mp3");
        assert!(db.get_audio_track_by_mood("Angry").unwrap().is_none());
    }
}
