use sqlx::FromRow;
use time::OffsetDateTime;

/// Course table row. Nested composites live in JSON text columns and are
/// decoded when the row is assembled into a [`crate::course::model::Course`].
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: String, // JSON
    pub total_estimated_hours: f64,
    pub difficulty: String,
    pub prerequisites: String, // JSON
    pub overview_summary: String,
    pub learning_path: String,
    pub total_chapters: i64,
    pub learning_objectives: String, // JSON
    pub learning_paths: String,      // JSON
    pub related_topics: String,      // JSON
    pub metadata: String,            // JSON
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChapterRow {
    pub id: String,
    pub course_id: String,
    pub chapter_id: String,
    pub chapter_number: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub estimated_minutes: i64,
    pub prerequisites: String, // JSON
    pub introduction: String,
    pub chapter_summary: String,
    pub checkpoints: String, // JSON
    pub next_chapter_id: Option<String>,
    pub next_chapter_title: Option<String>,
    pub next_chapter_preview: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SectionRow {
    pub id: String,
    pub chapter_id: String,
    pub section_id: String,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub estimated_minutes: i64,
    pub sort_order: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct MediaAttachmentRow {
    pub id: String,
    pub section_id: String,
    pub kind: String,
    pub url: Option<String>,
    pub data: Option<String>,
    pub caption: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CodeExampleRow {
    pub id: String,
    pub section_id: String,
    pub language: String,
    pub code: String,
    pub explanation: String,
    pub runnable: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct KeyConceptRow {
    pub id: String,
    pub chapter_id: String,
    pub term: String,
    pub definition: String,
    pub importance: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: String,
    pub chapter_id: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuizQuestionRow {
    pub id: String,
    pub quiz_id: String,
    pub question: String,
    pub kind: String,
    pub options: Option<String>, // JSON
    pub correct_answer: String,
    pub explanation: String,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: String,
    pub chapter_id: String,
    pub kind: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct GlossaryTermRow {
    pub id: String,
    pub course_id: String,
    pub term: String,
    pub definition: String,
    pub first_mentioned_in: String,
}

/// Learner progress row, unique per course
#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub id: String,
    pub course_id: String,
    pub completed_chapters: String, // JSON
    pub current_chapter: String,
    pub completion_percentage: f64,
    pub total_time_spent: i64,
    pub last_accessed_at: OffsetDateTime,
    pub chapter_progress: String, // JSON
    pub achievements: String,     // JSON
}
