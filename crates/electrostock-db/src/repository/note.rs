//! Notes board repository. Pending notes float above completed ones; within
//! each group, manual position wins, then recency.

use electrostock_core::{NewNote, Note, NoteUpdate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};

/// Repository for board notes.
#[derive(Debug, Clone)]
pub struct NoteRepository {
    pool: SqlitePool,
}

impl NoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all notes in board order.
    pub async fn list(&self) -> DbResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes
             ORDER BY is_completed ASC, position_order DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Creates a note on top of the board (max position + 1).
    pub async fn create(&self, note: &NewNote) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let max_position: Option<i64> =
            sqlx::query_scalar("SELECT MAX(position_order) FROM notes")
                .fetch_one(&mut *tx)
                .await?;

        let result = sqlx::query(
            "INSERT INTO notes (title, content, color, position_order) VALUES (?, ?, ?, ?)",
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.color)
        .bind(max_position.unwrap_or(0) + 1)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    /// Applies a partial update; absent fields stay untouched. An update
    /// with no fields is a no-op.
    pub async fn update(&self, id: i64, update: &NoteUpdate) -> DbResult<()> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE notes SET ");
        let mut fields = builder.separated(", ");
        let mut any = false;

        if let Some(title) = &update.title {
            fields.push("title = ").push_bind_unseparated(title);
            any = true;
        }
        if let Some(content) = &update.content {
            fields.push("content = ").push_bind_unseparated(content);
            any = true;
        }
        if let Some(color) = &update.color {
            fields.push("color = ").push_bind_unseparated(color);
            any = true;
        }
        if let Some(is_completed) = update.is_completed {
            fields
                .push("is_completed = ")
                .push_bind_unseparated(is_completed);
            any = true;
        }
        if let Some(position_order) = update.position_order {
            fields
                .push("position_order = ")
                .push_bind_unseparated(position_order);
            any = true;
        }

        if !any {
            return Ok(());
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Note", id));
        }

        Ok(())
    }

    /// Deletes a note.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Note", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn note(title: &str) -> NewNote {
        NewNote {
            title: Some(title.to_string()),
            content: Some("...".to_string()),
            color: "bg-yellow-200".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_notes_land_on_top() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notes();

        repo.create(&note("primera")).await.unwrap();
        repo.create(&note("segunda")).await.unwrap();

        let notes = repo.list().await.unwrap();
        assert_eq!(notes[0].title.as_deref(), Some("segunda"));
        assert_eq!(notes[0].position_order, 2);
        assert_eq!(notes[1].position_order, 1);
    }

    #[tokio::test]
    async fn test_completed_notes_sink_below_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notes();

        let done = repo.create(&note("hecha")).await.unwrap();
        repo.create(&note("pendiente")).await.unwrap();

        repo.update(
            done,
            &NoteUpdate {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let notes = repo.list().await.unwrap();
        assert_eq!(notes[0].title.as_deref(), Some("pendiente"));
        assert!(notes[1].is_completed);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notes();
        let id = repo.create(&note("lista")).await.unwrap();

        repo.update(
            id,
            &NoteUpdate {
                color: Some("bg-blue-200".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let notes = repo.list().await.unwrap();
        assert_eq!(notes[0].color, "bg-blue-200");
        assert_eq!(notes[0].title.as_deref(), Some("lista"));

        // empty update is a no-op, not an error
        repo.update(id, &NoteUpdate::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(
            db.notes().delete(99).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
