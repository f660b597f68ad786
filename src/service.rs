use std::path::Path;

use tracing::{error, info};

use crate::course::input::{CourseDraft, ImportDocument};
use crate::course::model::{Chapter, Course, LearningProgress, ProgressUpdate};
use crate::error::Error;
use crate::store::CourseStore;

/// Course operations behind the HTTP surface. Failures are mapped to the
/// wire error taxonomy here, with the underlying cause logged; storage
/// details stay inside [`CourseStore`].
pub struct CourseService {
    store: CourseStore,
    /// Language tag stamped into the metadata of newly created courses
    content_language: String,
}

impl CourseService {
    pub fn new(store: CourseStore, content_language: impl Into<String>) -> Self {
        Self {
            store,
            content_language: content_language.into(),
        }
    }

    pub async fn create_course(&self, draft: CourseDraft) -> Result<Course, Error> {
        self.store
            .create_course(draft, &self.content_language)
            .await
            .map_err(|e| {
                error!("create course failed: {e:#}");
                Error::internal("Failed to create course", e)
            })
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, Error> {
        self.store.list_courses().await.map_err(|e| {
            error!("list courses failed: {e:#}");
            Error::internal("Failed to fetch courses", e)
        })
    }

    pub async fn get_course(&self, id: &str) -> Result<Course, Error> {
        self.store
            .get_course(id)
            .await
            .map_err(|e| {
                error!("get course {id} failed: {e:#}");
                Error::internal("Failed to fetch course", e)
            })?
            .ok_or(Error::CourseNotFound)
    }

    pub async fn get_chapter(&self, course_id: &str, chapter_id: &str) -> Result<Chapter, Error> {
        self.store
            .get_chapter(course_id, chapter_id)
            .await
            .map_err(|e| {
                error!("get chapter {course_id}/{chapter_id} failed: {e:#}");
                Error::internal("Failed to fetch chapter", e)
            })?
            .ok_or(Error::ChapterNotFound)
    }

    /// Validate and default a loosely authored document, then persist it.
    pub async fn import_course(&self, document: ImportDocument) -> Result<Course, Error> {
        let draft = document.into_draft()?;
        self.store
            .create_course(draft, &self.content_language)
            .await
            .map_err(|e| {
                error!("import course failed: {e:#}");
                Error::internal("Failed to import course", e)
            })
    }

    /// Merge a partial progress update into the course's progress record.
    /// The course must exist; the progress row is created on first update.
    pub async fn update_progress(
        &self,
        course_id: &str,
        update: ProgressUpdate,
    ) -> Result<LearningProgress, Error> {
        let exists = self.store.course_exists(course_id).await.map_err(|e| {
            error!("check course {course_id} failed: {e:#}");
            Error::internal("Failed to update progress", e)
        })?;
        if !exists {
            return Err(Error::CourseNotFound);
        }

        self.store
            .upsert_progress(course_id, &update)
            .await
            .map_err(|e| {
                error!("update progress for {course_id} failed: {e:#}");
                Error::internal("Failed to update progress", e)
            })
    }

    /// Stored progress, or a zero-progress record when the course has never
    /// been touched. The fallback is not persisted.
    pub async fn get_progress(&self, course_id: &str) -> Result<LearningProgress, Error> {
        let stored = self.store.get_progress(course_id).await.map_err(|e| {
            error!("get progress for {course_id} failed: {e:#}");
            Error::internal("Failed to fetch progress", e)
        })?;
        Ok(stored.unwrap_or_else(|| LearningProgress::empty(course_id)))
    }

    /// Import every `.json` course document under `dir`. Unreadable or
    /// invalid files are logged and skipped, and documents whose title is
    /// already present are left alone so restarts do not duplicate courses.
    /// Returns the number of courses imported.
    pub async fn import_course_base(&self, dir: &Path) -> anyhow::Result<usize> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("walkdir error: {}", e);
                    continue;
                }
            };
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                paths.push(entry.path().to_path_buf());
            }
        }

        let mut imported = 0;
        for path in paths {
            match self.import_course_file(&path).await {
                Ok(true) => imported += 1,
                Ok(false) => {}
                Err(e) => error!("import {} failed: {}", path.display(), e),
            }
        }
        Ok(imported)
    }

    /// Returns false when the file was skipped as a duplicate.
    async fn import_course_file(&self, path: &Path) -> anyhow::Result<bool> {
        let text = std::fs::read_to_string(path)?;
        let document: ImportDocument = serde_json::from_str(&text)?;
        let draft = document.into_draft()?;
        if self.store.course_title_exists(&draft.title).await? {
            info!(
                "course '{}' already present, skipping {}",
                draft.title,
                path.display()
            );
            return Ok(false);
        }
        let course = self
            .store
            .create_course(draft, &self.content_language)
            .await?;
        info!(
            "imported course {} - {} from {}",
            course.id,
            course.title,
            path.display()
        );
        Ok(true)
    }
}
