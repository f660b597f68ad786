use std::path::{Path, PathBuf};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::course::model::{CourseMetadata, LearningPaths, LearningProgress, ProgressUpdate};
use crate::utils::now_local;

/// File-backed course shelf for the offline reader. Courses live in one
/// `granulearn_courses.json` document and progress in one
/// `granulearn_progress_<courseId>.json` per course; the store keeps an
/// in-memory view plus current-course, current-chapter and error slots.
///
/// Failures never propagate: operations return `None` and park a message in
/// the error slot, which the next operation clears.
pub struct LocalStore {
    dir: PathBuf,
    /// Loaded progress records keyed by course id, mirroring the per-course
    /// files on disk
    progress: DashMap<String, LearningProgress>,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    courses: Vec<StoredCourse>,
    current_course: Option<StoredCourse>,
    current_chapter: Option<StoredChapter>,
    last_error: Option<String>,
}

/// Course document as the shelf keeps it. Only the fields the store logic
/// needs are typed; everything else rides along in `rest` so imported
/// documents round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCourse {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
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
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub overview_summary: String,
    #[serde(default)]
    pub learning_path: String,
    #[serde(default)]
    pub total_chapters: i64,
    #[serde(default)]
    pub chapters: Vec<StoredChapter>,
    #[serde(default)]
    pub learning_paths: LearningPaths,
    #[serde(default)]
    pub metadata: CourseMetadata,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default = "now_local", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl StoredChapter {
    /// The three identifier forms clients navigate by: the row id, the
    /// authored chapter id, and the ordinal form `chapter_<n>`.
    fn matches(&self, chapter_id: &str) -> bool {
        self.id.as_deref() == Some(chapter_id)
            || self.chapter_id.as_deref() == Some(chapter_id)
            || self
                .chapter_number
                .is_some_and(|n| format!("chapter_{n}") == chapter_id)
    }
}

impl StoredCourse {
    /// Fill the gaps a hand-authored document is allowed to leave: empty
    /// strings and zero totals count as absent, supplied values are kept.
    fn apply_import_defaults(&mut self) {
        if self.total_chapters == 0 {
            self.total_chapters = self.chapters.len() as i64;
        }
        if self.total_estimated_hours == 0.0 {
            let minutes: i64 = self
                .chapters
                .iter()
                .map(|chapter| chapter.estimated_minutes.unwrap_or(0))
                .sum();
            // one decimal place
            self.total_estimated_hours = (minutes as f64 / 60.0 * 10.0).round() / 10.0;
        }
        if self.category.is_empty() {
            self.category = "General".to_string();
        }
        if self.difficulty.is_empty() {
            self.difficulty = "Intermediate".to_string();
        }
        if self.overview_summary.is_empty() {
            self.overview_summary = self.description.clone().unwrap_or_default();
        }
    }
}

impl LocalStore {
    /// Open the shelf directory, creating it if needed, and load the course
    /// list from disk. A missing or corrupt course file reads as empty.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let store = Self {
            dir,
            progress: DashMap::new(),
            state: RwLock::new(StoreState::default()),
        };
        store.state.write().courses = store.read_courses_file();
        Ok(store)
    }

    /// Reload the course list from disk.
    pub fn fetch_courses(&self) -> Vec<StoredCourse> {
        let courses = self.read_courses_file();
        let mut state = self.state.write();
        state.last_error = None;
        state.courses = courses.clone();
        courses
    }

    /// Make a course current and load its progress, materializing a
    /// zero-progress record on first contact.
    pub fn fetch_course(&self, id: &str) -> Option<StoredCourse> {
        let mut state = self.state.write();
        state.last_error = None;

        let course = state.courses.iter().find(|c| c.id == id).cloned();
        let Some(course) = course else {
            state.last_error = Some("Course not found".to_string());
            return None;
        };

        let progress = match self.read_progress_file(id) {
            Some(progress) => progress,
            None => {
                let progress = LearningProgress::empty(id);
                if let Err(e) = write_json(&self.progress_path(id), &progress) {
                    warn!("persist zero progress for {id} failed: {e:#}");
                }
                progress
            }
        };
        self.progress.insert(id.to_string(), progress);

        state.current_course = Some(course.clone());
        Some(course)
    }

    /// Look a chapter up inside a shelved course by any of its identifier
    /// forms and make it current.
    pub fn fetch_chapter(&self, course_id: &str, chapter_id: &str) -> Option<StoredChapter> {
        let mut state = self.state.write();
        state.last_error = None;

        let found = state
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|course| {
                course
                    .chapters
                    .iter()
                    .find(|chapter| chapter.matches(chapter_id))
                    .cloned()
            });
        match found {
            None => {
                state.last_error = Some("Course not found".to_string());
                None
            }
            Some(None) => {
                state.last_error = Some("Chapter not found".to_string());
                None
            }
            Some(Some(chapter)) => {
                state.current_chapter = Some(chapter.clone());
                Some(chapter)
            }
        }
    }

    /// Validate, default and shelve an authored document. The course keeps
    /// every field it arrived with; a missing id gets a generated one.
    pub fn import_course(&self, document: Value) -> Option<StoredCourse> {
        self.state.write().last_error = None;

        let title_ok = document
            .get("title")
            .and_then(Value::as_str)
            .is_some_and(|title| !title.is_empty());
        let chapters_ok = document.get("chapters").is_some_and(Value::is_array);
        if !title_ok || !chapters_ok {
            self.state.write().last_error = Some("Invalid course data format".to_string());
            return None;
        }

        let mut course: StoredCourse = match serde_json::from_value(document) {
            Ok(course) => course,
            Err(e) => {
                warn!("decode imported course failed: {e}");
                self.state.write().last_error = Some("Invalid course data format".to_string());
                return None;
            }
        };
        course.apply_import_defaults();
        let now = now_local();
        course.created_at = now;
        course.updated_at = now;
        if course.id.is_empty() {
            course.id = format!("course_{}", Uuid::new_v4());
        }

        let mut state = self.state.write();
        let mut courses = state.courses.clone();
        courses.push(course.clone());
        if let Err(e) = write_json(&self.courses_path(), &courses) {
            warn!("persist courses failed: {e:#}");
            state.last_error = Some("Failed to import course".to_string());
            return None;
        }
        state.courses = courses;
        Some(course)
    }

    /// Merge a partial update into the current course's progress. Does
    /// nothing when no course is current.
    pub fn update_progress(&self, update: ProgressUpdate) {
        let course_id = {
            let state = self.state.read();
            match &state.current_course {
                Some(course) => course.id.clone(),
                None => return,
            }
        };
        let Some(current) = self.progress.get(&course_id).map(|p| p.value().clone()) else {
            return;
        };

        let mut merged = current;
        merged.merge(update);
        if let Err(e) = write_json(&self.progress_path(&course_id), &merged) {
            warn!("persist progress for {course_id} failed: {e:#}");
            self.state.write().last_error = Some("Failed to update progress".to_string());
            return;
        }
        self.progress.insert(course_id, merged);
    }

    pub fn courses(&self) -> Vec<StoredCourse> {
        self.state.read().courses.clone()
    }

    pub fn current_course(&self) -> Option<StoredCourse> {
        self.state.read().current_course.clone()
    }

    pub fn current_chapter(&self) -> Option<StoredChapter> {
        self.state.read().current_chapter.clone()
    }

    /// Progress of the current course, `None` before any course was fetched.
    pub fn progress(&self) -> Option<LearningProgress> {
        let course_id = {
            let state = self.state.read();
            state.current_course.as_ref().map(|c| c.id.clone())?
        };
        self.progress.get(&course_id).map(|p| p.value().clone())
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state.write().last_error = None;
    }

    fn courses_path(&self) -> PathBuf {
        self.dir.join("granulearn_courses.json")
    }

    fn progress_path(&self, course_id: &str) -> PathBuf {
        self.dir.join(format!("granulearn_progress_{course_id}.json"))
    }

    fn read_courses_file(&self) -> Vec<StoredCourse> {
        match std::fs::read_to_string(self.courses_path()) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(courses) => courses,
                Err(e) => {
                    warn!("course shelf file is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    fn read_progress_file(&self, course_id: &str) -> Option<LearningProgress> {
        let text = std::fs::read_to_string(self.progress_path(course_id)).ok()?;
        match serde_json::from_str(&text) {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!("progress file for {course_id} is corrupt: {e}");
                None
            }
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}
