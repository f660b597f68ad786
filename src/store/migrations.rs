use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

/// Current database schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = get_current_version(pool).await?;

    if current_version < SCHEMA_VERSION {
        info!(
            "Running database migrations from v{} to v{}",
            current_version, SCHEMA_VERSION
        );

        for version in (current_version + 1)..=SCHEMA_VERSION {
            run_migration(pool, version).await?;
        }

        info!("Database migrations completed");
    }

    Ok(())
}

/// Get the current schema version
async fn get_current_version(pool: &SqlitePool) -> Result<i32, sqlx::Error> {
    let result = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(result
        .and_then(|row| row.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

/// Run a specific migration version
async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let (name, sql) = match version {
        1 => ("initial_schema", MIGRATION_V1),
        _ => {
            warn!("Unknown migration version: {}", version);
            return Ok(());
        }
    };

    info!("Applying migration v{}: {}", version, name);

    for statement in sql.split(";").filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement.trim()).execute(pool).await?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Migration v1: course graph and learner progress
const MIGRATION_V1: &str = r#"
-- Courses table
CREATE TABLE IF NOT EXISTS course (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    total_estimated_hours REAL NOT NULL DEFAULT 0,
    difficulty TEXT NOT NULL DEFAULT '',
    prerequisites TEXT NOT NULL DEFAULT '[]',
    overview_summary TEXT NOT NULL DEFAULT '',
    learning_path TEXT NOT NULL DEFAULT '',
    total_chapters INTEGER NOT NULL DEFAULT 0,
    learning_objectives TEXT NOT NULL DEFAULT '[]',
    learning_paths TEXT NOT NULL DEFAULT '{}',
    related_topics TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_course_created ON course(created_at DESC);

-- Chapters table
CREATE TABLE IF NOT EXISTS chapter (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL,
    chapter_id TEXT NOT NULL,
    chapter_number INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT '',
    estimated_minutes INTEGER NOT NULL DEFAULT 0,
    prerequisites TEXT NOT NULL DEFAULT '[]',
    introduction TEXT NOT NULL DEFAULT '',
    chapter_summary TEXT NOT NULL DEFAULT '',
    checkpoints TEXT NOT NULL DEFAULT '[]',
    next_chapter_id TEXT,
    next_chapter_title TEXT,
    next_chapter_preview TEXT,
    FOREIGN KEY (course_id) REFERENCES course(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chapter_course ON chapter(course_id);
CREATE INDEX IF NOT EXISTS idx_chapter_course_number ON chapter(course_id, chapter_number);

-- Sections table, sort_order preserves authored position
CREATE TABLE IF NOT EXISTS section (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL,
    section_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    estimated_minutes INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (chapter_id) REFERENCES chapter(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_section_chapter ON section(chapter_id);

-- Media attachments table
CREATE TABLE IF NOT EXISTS media_attachment (
    id TEXT PRIMARY KEY,
    section_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    url TEXT,
    data TEXT,
    caption TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (section_id) REFERENCES section(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_media_section ON media_attachment(section_id);

-- Code examples table
CREATE TABLE IF NOT EXISTS code_example (
    id TEXT PRIMARY KEY,
    section_id TEXT NOT NULL,
    language TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL DEFAULT '',
    explanation TEXT NOT NULL DEFAULT '',
    runnable INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (section_id) REFERENCES section(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_code_example_section ON code_example(section_id);

-- Key concepts table
CREATE TABLE IF NOT EXISTS key_concept (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL,
    term TEXT NOT NULL,
    definition TEXT NOT NULL DEFAULT '',
    importance TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (chapter_id) REFERENCES chapter(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_key_concept_chapter ON key_concept(chapter_id);

-- Quizzes table, at most one per chapter
CREATE TABLE IF NOT EXISTS quiz (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL UNIQUE,
    FOREIGN KEY (chapter_id) REFERENCES chapter(id) ON DELETE CASCADE
);

-- Quiz questions table
CREATE TABLE IF NOT EXISTS quiz_question (
    id TEXT PRIMARY KEY,
    quiz_id TEXT NOT NULL,
    question TEXT NOT NULL,
    kind TEXT NOT NULL,
    options TEXT,
    correct_answer TEXT NOT NULL DEFAULT '',
    explanation TEXT NOT NULL DEFAULT '',
    points INTEGER,
    FOREIGN KEY (quiz_id) REFERENCES quiz(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_quiz_question_quiz ON quiz_question(quiz_id);

-- Resources table
CREATE TABLE IF NOT EXISTS resource (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    is_required INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (chapter_id) REFERENCES chapter(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_resource_chapter ON resource(chapter_id);

-- Glossary terms table
CREATE TABLE IF NOT EXISTS glossary_term (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL,
    term TEXT NOT NULL,
    definition TEXT NOT NULL DEFAULT '',
    first_mentioned_in TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (course_id) REFERENCES course(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_glossary_course ON glossary_term(course_id);

-- Learner progress, one row per course
CREATE TABLE IF NOT EXISTS learning_progress (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL UNIQUE,
    completed_chapters TEXT NOT NULL DEFAULT '[]',
    current_chapter TEXT NOT NULL DEFAULT '',
    completion_percentage REAL NOT NULL DEFAULT 0,
    total_time_spent INTEGER NOT NULL DEFAULT 0,
    last_accessed_at TEXT NOT NULL,
    chapter_progress TEXT NOT NULL DEFAULT '{}',
    achievements TEXT NOT NULL DEFAULT '[]',
    FOREIGN KEY (course_id) REFERENCES course(id) ON DELETE CASCADE
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn migrations_reach_current_version() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        assert_eq!(get_current_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn migrations_are_reentrant() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, SCHEMA_VERSION as i64);
    }

    #[tokio::test]
    async fn cascade_removes_chapter_children() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO course (id, title, created_at, updated_at) VALUES ('c', 't', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO chapter (id, course_id, chapter_id, chapter_number, title) VALUES ('ch', 'c', 'ch-1', 1, 't')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO section (id, chapter_id, section_id, kind) VALUES ('s', 'ch', '1-1', 'text')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM course WHERE id = 'c'")
            .execute(&pool)
            .await
            .unwrap();

        let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM section")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sections, 0);
    }
}
