use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::utils::now_local;

/// A course with its nested content graph, in the document shape clients
/// consume. `chapters` and `glossary_terms` are absent in list responses
/// and always present (possibly empty) in detail responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub total_estimated_hours: f64,
    pub difficulty: String,
    pub prerequisites: Vec<String>,
    pub overview_summary: String,
    /// Human-readable learning path label, distinct from `learning_paths`
    pub learning_path: String,
    pub total_chapters: i64,
    pub learning_objectives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary_terms: Option<Vec<GlossaryTerm>>,
    pub learning_paths: LearningPaths,
    pub metadata: CourseMetadata,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    /// Natural identifier carried by the authored document, e.g. "chapter-intro"
    pub chapter_id: String,
    /// Ordinal within the course, defines display order
    pub chapter_number: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub estimated_minutes: i64,
    pub prerequisites: Vec<String>,
    pub introduction: String,
    pub chapter_summary: String,
    pub checkpoints: Vec<String>,
    pub sections: Vec<Section>,
    pub key_concepts: Vec<KeyConcept>,
    pub quiz: Option<Quiz>,
    pub resources: Vec<Resource>,
    pub next_chapter_id: Option<String>,
    pub next_chapter_title: Option<String>,
    pub next_chapter_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub section_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub estimated_minutes: i64,
    /// Zero-based position within the chapter, assigned at import
    pub order: i64,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
    #[serde(default)]
    pub code_examples: Vec<CodeExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyConcept {
    pub id: String,
    pub term: String,
    pub definition: String,
    pub importance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    /// Inline payload for media embedded directly in the authored document
    pub data: Option<String>,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeExample {
    pub id: String,
    pub language: String,
    pub code: String,
    pub explanation: String,
    pub runnable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    pub id: String,
    pub term: String,
    pub definition: String,
    pub first_mentioned_in: String,
}

/// Recommended chapter-id sequence plus alternative tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningPaths {
    pub recommended: Vec<String>,
    pub alternative: AlternativeTracks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeTracks {
    pub fast_track: Vec<String>,
    pub thorough: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    pub version: String,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Content language tag, e.g. "en" or "ja"
    pub language: String,
}

impl Default for CourseMetadata {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: now_local(),
            language: "en".to_string(),
        }
    }
}

/// Tracks a learner's progress through one course, keyed uniquely by course id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    pub id: String,
    pub course_id: String,
    /// Ids of chapters the learner has finished
    pub completed_chapters: Vec<String>,
    /// Id of the chapter the learner is currently on, empty before first view
    pub current_chapter: String,
    pub completion_percentage: f64,
    /// Cumulative time spent across the course, in minutes
    pub total_time_spent: i64,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub last_accessed_at: OffsetDateTime,
    /// Per-chapter progress, key is the chapter id the client navigated by
    #[serde(default)]
    pub chapter_progress: BTreeMap<String, ChapterProgress>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub completed_sections: Vec<String>,
    pub quiz_scores: Vec<QuizScore>,
    pub time_spent: i64,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub block_id: String,
    pub score: f64,
    pub max_score: f64,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub attempted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub earned_at: OffsetDateTime,
}

/// Partial progress document submitted by clients. Absent fields leave the
/// stored values untouched; supplied fields replace them wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressUpdate {
    pub completed_chapters: Option<Vec<String>>,
    pub current_chapter: Option<String>,
    pub completion_percentage: Option<f64>,
    pub total_time_spent: Option<i64>,
    pub chapter_progress: Option<BTreeMap<String, ChapterProgress>>,
    pub achievements: Option<Vec<Achievement>>,
}

impl LearningProgress {
    /// Zero-progress record, materialized lazily on first course view
    pub fn empty(course_id: &str) -> Self {
        Self {
            id: format!("progress_{course_id}"),
            course_id: course_id.to_string(),
            completed_chapters: Vec::new(),
            current_chapter: String::new(),
            completion_percentage: 0.0,
            total_time_spent: 0,
            last_accessed_at: now_local(),
            chapter_progress: BTreeMap::new(),
            achievements: Vec::new(),
        }
    }

    /// Shallow merge: supplied fields replace stored ones, the last-accessed
    /// timestamp is always refreshed
    pub fn merge(&mut self, update: ProgressUpdate) {
        if let Some(completed_chapters) = update.completed_chapters {
            self.completed_chapters = completed_chapters;
        }
        if let Some(current_chapter) = update.current_chapter {
            self.current_chapter = current_chapter;
        }
        if let Some(completion_percentage) = update.completion_percentage {
            self.completion_percentage = completion_percentage;
        }
        if let Some(total_time_spent) = update.total_time_spent {
            self.total_time_spent = total_time_spent;
        }
        if let Some(chapter_progress) = update.chapter_progress {
            self.chapter_progress = chapter_progress;
        }
        if let Some(achievements) = update.achievements {
            self.achievements = achievements;
        }
        self.last_accessed_at = now_local();
    }
}
