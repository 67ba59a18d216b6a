/// Idempotent schema, applied by [`super::Database::execute_init`].
///
/// `introductions.id` carries insertion order per (guild, user). The unique
/// (guild_id, message_id) pair is the reverse index and the duplicate guard.
pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS guild_config (
        guild_id INTEGER PRIMARY KEY,
        intro_channel_id INTEGER,
        log_channel_id INTEGER,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS introductions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        message_id INTEGER NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (guild_id, message_id)
    );
    CREATE INDEX IF NOT EXISTS idx_introductions_user ON introductions (guild_id, user_id, id);
";
