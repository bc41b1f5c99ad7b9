//! PostgreSQL entity store
//!
//! Expected tables:
//!
//! ```sql
//! CREATE TABLE users (
//!     id            BIGSERIAL PRIMARY KEY,
//!     name          TEXT NOT NULL,
//!     email         TEXT NOT NULL UNIQUE,
//!     role          TEXT NOT NULL,
//!     avatar        TEXT NOT NULL,
//!     password_hash TEXT,
//!     created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE TABLE projects (
//!     id          BIGSERIAL PRIMARY KEY,
//!     title       TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     status      TEXT NOT NULL,
//!     progress    SMALLINT NOT NULL DEFAULT 0,
//!     start_date  DATE NOT NULL,
//!     end_date    DATE NOT NULL,
//!     manager_id  BIGINT NOT NULL REFERENCES users (id),
//!     members     BIGINT[] NOT NULL DEFAULT '{}',
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE TABLE tasks (
//!     id          BIGSERIAL PRIMARY KEY,
//!     title       TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     status      TEXT NOT NULL,
//!     priority    TEXT NOT NULL,
//!     project_id  BIGINT NOT NULL REFERENCES projects (id),
//!     assigned_to BIGINT NOT NULL REFERENCES users (id),
//!     due_date    DATE NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pd_core::traits::Id;
use pd_models::{Priority, Project, ProjectStatus, Role, Task, TaskStatus, User};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::codec::StoredCode;
use crate::store::{EntityStore, ProjectFilter, StoreError, StoreResult, TaskFilter};

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub progress: i16,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: i64,
    pub members: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> StoreResult<Self> {
        Ok(Project {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            status: ProjectStatus::from_code(&row.status)?,
            progress: row.progress.clamp(0, 100) as u8,
            start_date: row.start_date,
            end_date: row.end_date,
            manager_id: row.manager_id,
            members: row.members.into_iter().collect(),
            created_at: Some(row.created_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub project_id: i64,
    pub assigned_to: i64,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> StoreResult<Self> {
        Ok(Task {
            id: Some(row.id),
            title: row.title,
            description: row.description,
            status: TaskStatus::from_code(&row.status)?,
            priority: Priority::from_code(&row.priority)?,
            project_id: row.project_id,
            assigned_to: row.assigned_to,
            due_date: row.due_date,
            created_at: Some(row.created_at),
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: Some(row.id),
            name: row.name,
            email: row.email,
            role: Role::from_code(&row.role)?,
            avatar: row.avatar,
            password_hash: row.password_hash,
            created_at: Some(row.created_at),
        })
    }
}

fn decode_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Entity store over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn get_project(&self, id: Id) -> StoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, description, status, progress, start_date, end_date,
                   manager_id, members, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "Project",
            id,
        })?;

        row.try_into()
    }

    async fn list_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, description, status, progress, start_date, end_date,
                   manager_id, members, created_at
            FROM projects
            WHERE ($1::BIGINT IS NULL OR $1 = ANY(members))
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.member_id)
        .fetch_all(&self.pool)
        .await?;

        // status is matched after decoding so every stored spelling counts
        let projects: Vec<Project> = decode_all(rows)?;
        Ok(projects.into_iter().filter(|p| filter.matches(p)).collect())
    }

    async fn upsert_project(&self, project: Project) -> StoreResult<Project> {
        let members: Vec<i64> = project.members.iter().copied().collect();

        let query = match project.id {
            Some(id) => sqlx::query_as::<_, ProjectRow>(
                r#"
                UPDATE projects
                SET title = $2, description = $3, status = $4, progress = $5,
                    start_date = $6, end_date = $7, manager_id = $8, members = $9
                WHERE id = $1
                RETURNING id, title, description, status, progress, start_date, end_date,
                          manager_id, members, created_at
                "#,
            )
            .bind(id),
            None => sqlx::query_as::<_, ProjectRow>(
                r#"
                INSERT INTO projects
                    (title, description, status, progress, start_date, end_date, manager_id, members)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, title, description, status, progress, start_date, end_date,
                          manager_id, members, created_at
                "#,
            ),
        };

        let row = query
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.status.to_code())
            .bind(i16::from(project.progress))
            .bind(project.start_date)
            .bind(project.end_date)
            .bind(project.manager_id)
            .bind(&members)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::NotFound {
                entity: "Project",
                id: project.id.unwrap_or_default(),
            }),
        }
    }

    async fn delete_project(&self, id: Id) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound {
                entity: "Project",
                id,
            });
        }

        tx.commit().await?;
        debug!(
            project_id = id,
            tasks_removed = tasks.rows_affected(),
            "project deleted"
        );
        Ok(())
    }

    async fn get_task(&self, id: Id) -> StoreResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, project_id, assigned_to,
                   due_date, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { entity: "Task", id })?;

        row.try_into()
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, project_id, assigned_to,
                   due_date, created_at
            FROM tasks
            WHERE ($1::BIGINT IS NULL OR project_id = $1)
              AND ($2::BIGINT IS NULL OR assigned_to = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.project_id)
        .bind(filter.assigned_to)
        .fetch_all(&self.pool)
        .await?;

        let tasks: Vec<Task> = decode_all(rows)?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    async fn upsert_task(&self, task: Task) -> StoreResult<Task> {
        let query = match task.id {
            Some(id) => sqlx::query_as::<_, TaskRow>(
                r#"
                UPDATE tasks
                SET title = $2, description = $3, status = $4, priority = $5,
                    project_id = $6, assigned_to = $7, due_date = $8
                WHERE id = $1
                RETURNING id, title, description, status, priority, project_id, assigned_to,
                          due_date, created_at
                "#,
            )
            .bind(id),
            None => sqlx::query_as::<_, TaskRow>(
                r#"
                INSERT INTO tasks
                    (title, description, status, priority, project_id, assigned_to, due_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, title, description, status, priority, project_id, assigned_to,
                          due_date, created_at
                "#,
            ),
        };

        let row = query
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.to_code())
            .bind(task.priority.to_code())
            .bind(task.project_id)
            .bind(task.assigned_to)
            .bind(task.due_date)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::NotFound {
                entity: "Task",
                id: task.id.unwrap_or_default(),
            }),
        }
    }

    async fn delete_task(&self, id: Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "Task", id });
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, avatar, password_hash, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn get_user(&self, id: Id) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, avatar, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { entity: "User", id })?;

        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, avatar, password_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, role, avatar, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, role, avatar, password_hash, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.to_code())
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("email {} is already registered", user.email))
            }
            other => StoreError::Database(other),
        })?;

        row.try_into()
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let id = user
            .id
            .ok_or_else(|| StoreError::Conflict("cannot update a user that was never stored".into()))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, avatar = $5, password_hash = $6
            WHERE id = $1
            RETURNING id, name, email, role, avatar, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.to_code())
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("email {} is already registered", user.email))
            }
            other => StoreError::Database(other),
        })?
        .ok_or(StoreError::NotFound { entity: "User", id })?;

        row.try_into()
    }

    async fn delete_user(&self, id: Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    StoreError::Conflict(format!("user {id} is still referenced"))
                }
                other => StoreError::Database(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "User", id });
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
