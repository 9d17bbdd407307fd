/// Moods seeded into the audio table at startup.
pub const DEFAULT_MOODS: &[&str] = &["Epic", "Happy", "Sad"];

/// File name of the seeded track for a mood, relative to the audio directory.
pub fn mood_file_name(mood: &str) -> String {
    format!("{}.mp3", mood)
}
