use super::{from_sql_id, sql_id, Database, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// What happened to a single `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    /// The message id was already recorded for this guild. Nothing changed.
    Duplicate { existing_user: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

impl Database {
    pub fn add_introduction(&self, guild_id: u64, user_id: u64, message_id: u64) -> Result<AddOutcome> {
        let conn = self.lock()?;
        insert_introduction(&conn, guild_id, user_id, message_id)
    }

    /// Insert every record in order inside one transaction. Either all of
    /// them become visible or none do.
    pub fn add_introductions(&self, guild_id: u64, records: &[(u64, u64)]) -> Result<IngestSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut summary = IngestSummary::default();
        for &(user_id, message_id) in records {
            match insert_introduction(&tx, guild_id, user_id, message_id)? {
                AddOutcome::Inserted => summary.inserted += 1,
                AddOutcome::Duplicate { .. } => summary.duplicates += 1,
            }
        }

        tx.commit()?;
        debug!(
            "Database: Committed {} introductions for guild {} ({} duplicates)",
            summary.inserted, guild_id, summary.duplicates
        );
        Ok(summary)
    }

    /// Returns whether a record was deleted.
    pub fn remove_introduction(&self, guild_id: u64, user_id: u64, message_id: u64) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM introductions WHERE guild_id = ?1 AND user_id = ?2 AND message_id = ?3",
            params![sql_id(guild_id), sql_id(user_id), sql_id(message_id)],
        )?;
        Ok(deleted > 0)
    }

    pub fn count_introductions(&self, guild_id: u64, user_id: u64) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM introductions WHERE guild_id = ?1 AND user_id = ?2",
            params![sql_id(guild_id), sql_id(user_id)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Message ids in the order they were recorded.
    pub fn list_introduction_ids(&self, guild_id: u64, user_id: u64) -> Result<Vec<u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT message_id FROM introductions WHERE guild_id = ?1 AND user_id = ?2 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![sql_id(guild_id), sql_id(user_id)], |row| {
            row.get::<_, i64>(0)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(from_sql_id(row?));
        }
        Ok(ids)
    }

    pub fn user_for_message(&self, guild_id: u64, message_id: u64) -> Result<Option<u64>> {
        let conn = self.lock()?;
        lookup_author(&conn, guild_id, message_id)
    }
}

fn insert_introduction(conn: &Connection, guild_id: u64, user_id: u64, message_id: u64) -> Result<AddOutcome> {
    let inserted = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO introductions (guild_id, user_id, message_id) VALUES (?1, ?2, ?3)",
        )?
        .execute(params![sql_id(guild_id), sql_id(user_id), sql_id(message_id)])?;

    if inserted > 0 {
        return Ok(AddOutcome::Inserted);
    }

    // The unique constraint fired, so the author row must exist.
    let existing_user = lookup_author(conn, guild_id, message_id)?.unwrap_or(user_id);
    Ok(AddOutcome::Duplicate { existing_user })
}

fn lookup_author(conn: &Connection, guild_id: u64, message_id: u64) -> Result<Option<u64>> {
    let user = conn
        .prepare_cached("SELECT user_id FROM introductions WHERE guild_id = ?1 AND message_id = ?2")?
        .query_row(params![sql_id(guild_id), sql_id(message_id)], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(user.map(from_sql_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_unknown_user_is_empty() {
        let db = test_db();
        assert_eq!(db.count_introductions(1, 99).unwrap(), 0);
        assert!(db.list_introduction_ids(1, 99).unwrap().is_empty());
        assert_eq!(db.user_for_message(1, 12345).unwrap(), None);
    }

    #[test]
    fn test_order_is_preserved() {
        let db = test_db();
        // Ids deliberately out of numeric order: insertion order wins.
        for id in [3, 1, 2] {
            assert_eq!(db.add_introduction(1, 7, id).unwrap(), AddOutcome::Inserted);
        }
        assert_eq!(db.list_introduction_ids(1, 7).unwrap(), vec![3, 1, 2]);
        assert_eq!(db.count_introductions(1, 7).unwrap(), 3);
    }

    #[test]
    fn test_reverse_index() {
        let db = test_db();
        db.add_introduction(1, 7, 100).unwrap();
        assert_eq!(db.user_for_message(1, 100).unwrap(), Some(7));

        assert!(db.remove_introduction(1, 7, 100).unwrap());
        assert_eq!(db.user_for_message(1, 100).unwrap(), None);
        assert_eq!(db.count_introductions(1, 7).unwrap(), 0);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let db = test_db();
        db.add_introduction(1, 7, 100).unwrap();
        db.add_introduction(1, 7, 101).unwrap();

        assert!(db.remove_introduction(1, 7, 100).unwrap());
        assert!(!db.remove_introduction(1, 7, 100).unwrap());
        assert_eq!(db.list_introduction_ids(1, 7).unwrap(), vec![101]);
        assert_eq!(db.count_introductions(1, 7).unwrap(), 1);
    }

    #[test]
    fn test_remove_requires_matching_user() {
        let db = test_db();
        db.add_introduction(1, 7, 100).unwrap();
        assert!(!db.remove_introduction(1, 8, 100).unwrap());
        assert_eq!(db.user_for_message(1, 100).unwrap(), Some(7));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let db = test_db();
        assert_eq!(db.add_introduction(1, 7, 100).unwrap(), AddOutcome::Inserted);
        assert_eq!(
            db.add_introduction(1, 7, 100).unwrap(),
            AddOutcome::Duplicate { existing_user: 7 }
        );
        // A second author claiming the same message does not steal it.
        assert_eq!(
            db.add_introduction(1, 8, 100).unwrap(),
            AddOutcome::Duplicate { existing_user: 7 }
        );

        assert_eq!(db.count_introductions(1, 7).unwrap(), 1);
        assert_eq!(db.count_introductions(1, 8).unwrap(), 0);
        assert_eq!(db.user_for_message(1, 100).unwrap(), Some(7));
    }

    #[test]
    fn test_count_matches_list_after_mixed_ops() {
        let db = test_db();
        let ops: [(bool, u64, u64); 9] = [
            (true, 1, 10),
            (true, 1, 11),
            (true, 2, 12),
            (false, 1, 10),
            (true, 1, 13),
            (false, 2, 99),
            (true, 2, 12),
            (false, 2, 12),
            (true, 1, 11),
        ];
        for (add, user, msg) in ops {
            if add {
                db.add_introduction(5, user, msg).unwrap();
            } else {
                db.remove_introduction(5, user, msg).unwrap();
            }
        }

        for user in [1, 2] {
            let ids = db.list_introduction_ids(5, user).unwrap();
            assert_eq!(db.count_introductions(5, user).unwrap(), ids.len());
            for id in ids {
                assert_eq!(db.user_for_message(5, id).unwrap(), Some(user));
            }
        }
        assert_eq!(db.list_introduction_ids(5, 1).unwrap(), vec![11, 13]);
        assert!(db.list_introduction_ids(5, 2).unwrap().is_empty());
    }

    #[test]
    fn test_batch_insert() {
        let db = test_db();
        db.add_introduction(1, 7, 10).unwrap();

        let summary = db
            .add_introductions(1, &[(7, 10), (7, 11), (8, 12), (7, 13)])
            .unwrap();
        assert_eq!(summary, IngestSummary { inserted: 3, duplicates: 1 });
        assert_eq!(db.list_introduction_ids(1, 7).unwrap(), vec![10, 11, 13]);
        assert_eq!(db.user_for_message(1, 12).unwrap(), Some(8));
    }

    #[test]
    fn test_guilds_are_isolated() {
        let db = test_db();
        db.add_introduction(1, 7, 100).unwrap();
        db.add_introduction(2, 7, 100).unwrap();
        db.add_introduction(2, 7, 101).unwrap();

        assert_eq!(db.count_introductions(1, 7).unwrap(), 1);
        assert_eq!(db.count_introductions(2, 7).unwrap(), 2);

        db.remove_introduction(2, 7, 100).unwrap();
        assert_eq!(db.user_for_message(1, 100).unwrap(), Some(7));
        assert_eq!(db.user_for_message(2, 100).unwrap(), None);
    }
}
