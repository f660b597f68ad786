use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::course::model::{AlternativeTracks, LearningPaths};
use crate::error::Error;

/// Fully-populated course creation graph, the canonical input to the
/// persistence layer. Loosely authored documents reach this shape through
/// [`ImportDocument::into_draft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub total_estimated_hours: f64,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub overview: Overview,
    pub chapters: Vec<ChapterDraft>,
    /// Named `learningPath` in the authored shape, `learningPaths` on read
    pub learning_path: LearningPaths,
    #[serde(default)]
    pub glossary: Vec<GlossaryTermDraft>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub learning_path: String,
    #[serde(default)]
    pub total_chapters: i64,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    #[serde(default)]
    pub chapter_id: String,
    #[serde(default)]
    pub chapter_number: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub estimated_minutes: i64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub content: ChapterContent,
    pub quiz: Option<QuizDraft>,
    #[serde(default)]
    pub resources: Vec<ResourceDraft>,
    pub next_chapter: Option<NextChapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<SectionDraft>,
    #[serde(default)]
    pub key_concepts: Vec<KeyConceptDraft>,
    #[serde(default)]
    pub chapter_summary: String,
    #[serde(default)]
    pub checkpoints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionDraft {
    #[serde(default)]
    pub section_id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub estimated_minutes: i64,
    /// Absent means no attachment rows are created, distinct from an empty list
    pub media: Option<Vec<MediaAttachmentDraft>>,
    pub code_examples: Option<Vec<CodeExampleDraft>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyConceptDraft {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    #[serde(default)]
    pub questions: Vec<QuizQuestionDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDraft {
    #[serde(default)]
    pub question: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachmentDraft {
    #[serde(default, rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub data: Option<String>,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeExampleDraft {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub runnable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTermDraft {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub first_mentioned_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextChapter {
    pub chapter_id: String,
    pub title: String,
    pub preview: String,
}

/// Loosely-shaped authored document as received by the import endpoint.
/// Every composite is optional; [`Self::into_draft`] validates and fills
/// the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub total_estimated_hours: Option<f64>,
    pub difficulty: Option<String>,
    pub prerequisites: Option<Vec<String>>,
    pub overview: Option<Overview>,
    /// Top-level objective list, consulted only when `overview` is absent
    pub learning_objectives: Option<Vec<String>>,
    pub chapters: Option<Vec<ChapterDraft>>,
    pub learning_path: Option<LearningPaths>,
    pub glossary: Option<Vec<GlossaryTermDraft>>,
    pub related_topics: Option<Vec<String>>,
}

const INVALID_FORMAT: &str = "Invalid course data format";

impl ImportDocument {
    /// Validate and default an authored document into the canonical creation
    /// graph. Rejects when `title` is absent or empty, or `chapters` is
    /// absent; everything else gets a defined default. Pure, persists
    /// nothing.
    pub fn into_draft(self) -> Result<CourseDraft, Error> {
        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => return Err(Error::InvalidCourseData(INVALID_FORMAT.to_string())),
        };
        let Some(chapters) = self.chapters else {
            return Err(Error::InvalidCourseData(INVALID_FORMAT.to_string()));
        };

        let description = self.description.unwrap_or_default();
        let overview = match self.overview {
            Some(overview) => overview,
            None => Overview {
                summary: description.clone(),
                learning_path: String::new(),
                total_chapters: chapters.len() as i64,
                learning_objectives: self.learning_objectives.unwrap_or_default(),
            },
        };
        let learning_path = match self.learning_path {
            Some(learning_path) => learning_path,
            None => LearningPaths {
                recommended: chapters.iter().map(|c| c.chapter_id.clone()).collect(),
                alternative: AlternativeTracks::default(),
            },
        };

        Ok(CourseDraft {
            title,
            description,
            category: self.category.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            total_estimated_hours: self.total_estimated_hours.unwrap_or(0.0),
            difficulty: self.difficulty.unwrap_or_default(),
            prerequisites: self.prerequisites.unwrap_or_default(),
            overview,
            chapters,
            learning_path,
            glossary: self.glossary.unwrap_or_default(),
            related_topics: self.related_topics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_document() -> serde_json::Value {
        json!({
            "title": "T",
            "chapters": [
                { "chapterId": "ch-1", "chapterNumber": 1, "title": "First" },
                { "chapterId": "ch-2", "chapterNumber": 2, "title": "Second" }
            ]
        })
    }

    #[test]
    fn minimal_document_gets_synthesized_defaults() {
        let doc: ImportDocument = serde_json::from_value(minimal_document()).unwrap();
        let draft = doc.into_draft().unwrap();

        assert_eq!(draft.title, "T");
        assert_eq!(draft.description, "");
        assert_eq!(draft.overview.summary, "");
        assert_eq!(draft.overview.total_chapters, 2);
        assert!(draft.overview.learning_objectives.is_empty());
        assert_eq!(draft.learning_path.recommended, vec!["ch-1", "ch-2"]);
        assert!(draft.learning_path.alternative.fast_track.is_empty());
        assert!(draft.learning_path.alternative.thorough.is_empty());
        assert!(draft.tags.is_empty());
        assert!(draft.glossary.is_empty());
        assert!(draft.related_topics.is_empty());
        assert_eq!(draft.total_estimated_hours, 0.0);
    }

    #[test]
    fn overview_summary_mirrors_description() {
        let mut value = minimal_document();
        value["description"] = json!("All about things");
        let doc: ImportDocument = serde_json::from_value(value).unwrap();
        let draft = doc.into_draft().unwrap();
        assert_eq!(draft.overview.summary, "All about things");
        assert_eq!(draft.description, "All about things");
    }

    #[test]
    fn supplied_overview_and_learning_path_survive() {
        let mut value = minimal_document();
        value["overview"] = json!({
            "summary": "hand-written",
            "learningPath": "fast",
            "totalChapters": 99,
            "learningObjectives": ["a", "b"]
        });
        value["learningPath"] = json!({
            "recommended": ["ch-2", "ch-1"],
            "alternative": { "fastTrack": ["ch-2"], "thorough": [] }
        });
        let doc: ImportDocument = serde_json::from_value(value).unwrap();
        let draft = doc.into_draft().unwrap();
        assert_eq!(draft.overview.summary, "hand-written");
        assert_eq!(draft.overview.total_chapters, 99);
        assert_eq!(draft.learning_path.recommended, vec!["ch-2", "ch-1"]);
        assert_eq!(draft.learning_path.alternative.fast_track, vec!["ch-2"]);
    }

    #[test]
    fn top_level_objectives_feed_synthesized_overview() {
        let mut value = minimal_document();
        value["learningObjectives"] = json!(["understand", "apply"]);
        let doc: ImportDocument = serde_json::from_value(value).unwrap();
        let draft = doc.into_draft().unwrap();
        assert_eq!(
            draft.overview.learning_objectives,
            vec!["understand", "apply"]
        );
    }

    #[test]
    fn rejects_missing_title() {
        let doc: ImportDocument =
            serde_json::from_value(json!({ "chapters": [] })).unwrap();
        assert!(matches!(
            doc.into_draft(),
            Err(Error::InvalidCourseData(_))
        ));
    }

    #[test]
    fn rejects_empty_title() {
        let mut value = minimal_document();
        value["title"] = json!("");
        let doc: ImportDocument = serde_json::from_value(value).unwrap();
        assert!(matches!(
            doc.into_draft(),
            Err(Error::InvalidCourseData(_))
        ));
    }

    #[test]
    fn rejects_missing_chapters() {
        let doc: ImportDocument =
            serde_json::from_value(json!({ "title": "T" })).unwrap();
        assert!(matches!(
            doc.into_draft(),
            Err(Error::InvalidCourseData(_))
        ));
    }

    #[test]
    fn rejects_non_sequence_chapters_at_decode() {
        let result: Result<ImportDocument, _> =
            serde_json::from_value(json!({ "title": "T", "chapters": 42 }));
        assert!(result.is_err());
    }

    #[test]
    fn absent_media_stays_distinct_from_empty() {
        let value = json!({
            "sections": [
                { "sectionId": "a", "type": "text" },
                { "sectionId": "b", "type": "text", "media": [], "codeExamples": [] }
            ]
        });
        let content: ChapterContent = serde_json::from_value(value).unwrap();
        assert!(content.sections[0].media.is_none());
        assert!(content.sections[0].code_examples.is_none());
        assert_eq!(content.sections[1].media, Some(vec![]));
        assert_eq!(content.sections[1].code_examples, Some(vec![]));
    }

    #[test]
    fn code_example_runnable_defaults_to_false() {
        let example: CodeExampleDraft = serde_json::from_value(json!({
            "language": "rust",
            "code": "fn main() {}",
            "explanation": "entry point"
        }))
        .unwrap();
        assert!(!example.runnable);
    }
}
