use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Goal, GoalWithSubject, Grade, Subject};

/// Persistence collaborator for subjects, grades and goals.
///
/// Every call may fail; callers treat a failed write as not having happened.
/// Mutations on a missing row report `false` instead of an error so the caller
/// can decide how to surface it.
#[allow(async_fn_in_trait)]
pub trait GradeStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError>;
    async fn update_subject(&self, subject: &Subject) -> Result<bool, StoreError>;
    /// Removes the subject together with its grades and goal.
    async fn delete_subject(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn subject(&self, id: Uuid) -> Result<Option<Subject>, StoreError>;
    async fn find_subject(&self, name: &str, term: &str) -> Result<Option<Subject>, StoreError>;
    async fn subjects(&self) -> Result<Vec<Subject>, StoreError>;

    async fn insert_grade(&self, grade: &Grade) -> Result<(), StoreError>;
    async fn update_grade_value(&self, id: Uuid, value: f64) -> Result<bool, StoreError>;
    async fn delete_grade(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn grade(&self, id: Uuid) -> Result<Option<Grade>, StoreError>;
    /// Grades of one subject, oldest first.
    async fn grades_for_subject(&self, subject_id: Uuid) -> Result<Vec<Grade>, StoreError>;
    async fn all_grades(&self) -> Result<Vec<Grade>, StoreError>;

    /// Inserts the goal or overwrites the subject's existing one.
    async fn set_goal(&self, goal: &Goal) -> Result<(), StoreError>;
    async fn update_goal(&self, subject_id: Uuid, target_value: f64) -> Result<bool, StoreError>;
    async fn delete_goal(&self, subject_id: Uuid) -> Result<bool, StoreError>;
    async fn goal_for_subject(&self, subject_id: Uuid) -> Result<Option<Goal>, StoreError>;
    async fn goals_with_subjects(&self) -> Result<Vec<GoalWithSubject>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// A private database living as long as the returned store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl GradeStore for SqliteStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO subjects (id, name, term) VALUES (?, ?, ?)")
            .bind(subject.id)
            .bind(&subject.name)
            .bind(&subject.term)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE subjects SET name = ?, term = ? WHERE id = ?")
            .bind(&subject.name)
            .bind(&subject.term)
            .bind(subject.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_subject(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let grades = sqlx::query("DELETE FROM grades WHERE subject_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let goals = sqlx::query("DELETE FROM goals WHERE subject_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let subjects = sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            subject_id = %id,
            grades = grades.rows_affected(),
            goals = goals.rows_affected(),
            "cascade delete finished"
        );
        Ok(subjects.rows_affected() > 0)
    }

    async fn subject(&self, id: Uuid) -> Result<Option<Subject>, StoreError> {
        let row = sqlx::query("SELECT id, name, term FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| subject_from_row(&row)).transpose()?)
    }

    async fn find_subject(&self, name: &str, term: &str) -> Result<Option<Subject>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, term FROM subjects WHERE name = ? AND term = ? ORDER BY rowid LIMIT 1",
        )
        .bind(name)
        .bind(term)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| subject_from_row(&row)).transpose()?)
    }

    async fn subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let rows = sqlx::query("SELECT id, name, term FROM subjects ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        let mut subjects = Vec::with_capacity(rows.len());
        for row in rows {
            subjects.push(subject_from_row(&row)?);
        }
        Ok(subjects)
    }

    async fn insert_grade(&self, grade: &Grade) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO grades (id, subject_id, value, date, assessment_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(grade.id)
        .bind(grade.subject_id)
        .bind(grade.value)
        .bind(grade.date)
        .bind(&grade.assessment_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_grade_value(&self, id: Uuid, value: f64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE grades SET value = ? WHERE id = ?")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_grade(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM grades WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn grade(&self, id: Uuid) -> Result<Option<Grade>, StoreError> {
        let row = sqlx::query(
            "SELECT id, subject_id, value, date, assessment_type FROM grades WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| grade_from_row(&row)).transpose()?)
    }

    async fn grades_for_subject(&self, subject_id: Uuid) -> Result<Vec<Grade>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject_id, value, date, assessment_type
            FROM grades
            WHERE subject_id = ?
            ORDER BY date ASC, rowid ASC
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;
        grades_from_rows(rows)
    }

    async fn all_grades(&self) -> Result<Vec<Grade>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, subject_id, value, date, assessment_type
            FROM grades
            ORDER BY date ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        grades_from_rows(rows)
    }

    async fn set_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO goals (subject_id, target_value)
            VALUES (?, ?)
            ON CONFLICT (subject_id) DO UPDATE
            SET target_value = EXCLUDED.target_value
            "#,
        )
        .bind(goal.subject_id)
        .bind(goal.target_value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_goal(&self, subject_id: Uuid, target_value: f64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE goals SET target_value = ? WHERE subject_id = ?")
            .bind(target_value)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_goal(&self, subject_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM goals WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn goal_for_subject(&self, subject_id: Uuid) -> Result<Option<Goal>, StoreError> {
        let row = sqlx::query("SELECT subject_id, target_value FROM goals WHERE subject_id = ?")
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| goal_from_row(&row)).transpose()?)
    }

    async fn goals_with_subjects(&self) -> Result<Vec<GoalWithSubject>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT g.subject_id, g.target_value, s.name
            FROM goals g
            JOIN subjects s ON s.id = g.subject_id
            ORDER BY s.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut goals = Vec::with_capacity(rows.len());
        for row in rows {
            goals.push(GoalWithSubject {
                goal: goal_from_row(&row)?,
                subject_name: row.try_get("name")?,
            });
        }
        Ok(goals)
    }
}

fn subject_from_row(row: &SqliteRow) -> Result<Subject, sqlx::Error> {
    Ok(Subject {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        term: row.try_get("term")?,
    })
}

fn grade_from_row(row: &SqliteRow) -> Result<Grade, sqlx::Error> {
    Ok(Grade {
        id: row.try_get("id")?,
        subject_id: row.try_get("subject_id")?,
        value: row.try_get("value")?,
        date: row.try_get("date")?,
        assessment_type: row.try_get("assessment_type")?,
    })
}

fn grades_from_rows(rows: Vec<SqliteRow>) -> Result<Vec<Grade>, StoreError> {
    let mut grades = Vec::with_capacity(rows.len());
    for row in rows {
        grades.push(grade_from_row(&row)?);
    }
    Ok(grades)
}

fn goal_from_row(row: &SqliteRow) -> Result<Goal, sqlx::Error> {
    Ok(Goal {
        subject_id: row.try_get("subject_id")?,
        target_value: row.try_get("target_value")?,
    })
}
