use crate::course::model::{LearningProgress, ProgressUpdate};
use crate::store::rows::ProgressRow;
use crate::store::{CourseStore, decode_json, encode_json};
use crate::utils::now_local;

impl CourseStore {
    /// Merge a partial update into the course's progress row, creating it on
    /// first contact. A single upsert keeps the merge atomic under
    /// concurrent updates: absent fields fall back to the stored value,
    /// missing rows start from zero-progress defaults.
    pub async fn upsert_progress(
        &self,
        course_id: &str,
        update: &ProgressUpdate,
    ) -> anyhow::Result<LearningProgress> {
        let completed_chapters = update
            .completed_chapters
            .as_ref()
            .map(encode_json)
            .transpose()?;
        let chapter_progress = update
            .chapter_progress
            .as_ref()
            .map(encode_json)
            .transpose()?;
        let achievements = update.achievements.as_ref().map(encode_json).transpose()?;
        let now = now_local();

        sqlx::query(
            r#"
            INSERT INTO learning_progress (id, course_id, completed_chapters, current_chapter,
                completion_percentage, total_time_spent, last_accessed_at, chapter_progress, achievements)
            VALUES (?, ?, COALESCE(?, '[]'), COALESCE(?, ''), COALESCE(?, 0), COALESCE(?, 0), ?,
                COALESCE(?, '{}'), COALESCE(?, '[]'))
            ON CONFLICT(course_id) DO UPDATE SET
                completed_chapters = COALESCE(?, completed_chapters),
                current_chapter = COALESCE(?, current_chapter),
                completion_percentage = COALESCE(?, completion_percentage),
                total_time_spent = COALESCE(?, total_time_spent),
                last_accessed_at = ?,
                chapter_progress = COALESCE(?, chapter_progress),
                achievements = COALESCE(?, achievements)
            "#,
        )
        .bind(format!("progress_{course_id}"))
        .bind(course_id)
        .bind(&completed_chapters)
        .bind(&update.current_chapter)
        .bind(update.completion_percentage)
        .bind(update.total_time_spent)
        .bind(now)
        .bind(&chapter_progress)
        .bind(&achievements)
        .bind(&completed_chapters)
        .bind(&update.current_chapter)
        .bind(update.completion_percentage)
        .bind(update.total_time_spent)
        .bind(now)
        .bind(&chapter_progress)
        .bind(&achievements)
        .execute(&self.database)
        .await?;

        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT * FROM learning_progress WHERE course_id = ?",
        )
        .bind(course_id)
        .fetch_one(&self.database)
        .await?;
        progress_from_row(row)
    }

    pub async fn get_progress(&self, course_id: &str) -> anyhow::Result<Option<LearningProgress>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT * FROM learning_progress WHERE course_id = ?",
        )
        .bind(course_id)
        .fetch_optional(&self.database)
        .await?;
        row.map(progress_from_row).transpose()
    }
}

fn progress_from_row(row: ProgressRow) -> anyhow::Result<LearningProgress> {
    Ok(LearningProgress {
        id: row.id,
        course_id: row.course_id,
        completed_chapters: decode_json(&row.completed_chapters)?,
        current_chapter: row.current_chapter,
        completion_percentage: row.completion_percentage,
        total_time_spent: row.total_time_spent,
        last_accessed_at: row.last_accessed_at,
        chapter_progress: decode_json(&row.chapter_progress)?,
        achievements: decode_json(&row.achievements)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::input::ImportDocument;
    use crate::course::model::{Achievement, ChapterProgress};
    use serde_json::json;
    use std::collections::BTreeMap;

    async fn store_with_course() -> (CourseStore, String) {
        let store = CourseStore::in_memory().await.unwrap();
        let draft = serde_json::from_value::<ImportDocument>(json!({
            "title": "Progress target",
            "chapters": [
                { "chapterId": "ch-1", "chapterNumber": 1, "title": "One" },
                { "chapterId": "ch-2", "chapterNumber": 2, "title": "Two" }
            ]
        }))
        .unwrap()
        .into_draft()
        .unwrap();
        let course = store.create_course(draft, "en").await.unwrap();
        (store, course.id)
    }

    #[tokio::test]
    async fn first_update_starts_from_zero_progress() {
        let (store, course_id) = store_with_course().await;
        let update = ProgressUpdate {
            current_chapter: Some("ch-1".to_string()),
            ..Default::default()
        };
        let progress = store.upsert_progress(&course_id, &update).await.unwrap();

        assert_eq!(progress.id, format!("progress_{course_id}"));
        assert_eq!(progress.course_id, course_id);
        assert_eq!(progress.current_chapter, "ch-1");
        assert!(progress.completed_chapters.is_empty());
        assert_eq!(progress.completion_percentage, 0.0);
        assert_eq!(progress.total_time_spent, 0);
        assert!(progress.chapter_progress.is_empty());
        assert!(progress.achievements.is_empty());
    }

    #[tokio::test]
    async fn absent_fields_keep_stored_values() {
        let (store, course_id) = store_with_course().await;
        let first = ProgressUpdate {
            completion_percentage: Some(30.0),
            total_time_spent: Some(10),
            ..Default::default()
        };
        store.upsert_progress(&course_id, &first).await.unwrap();

        let second = ProgressUpdate {
            current_chapter: Some("ch-2".to_string()),
            ..Default::default()
        };
        let progress = store.upsert_progress(&course_id, &second).await.unwrap();

        assert_eq!(progress.current_chapter, "ch-2");
        assert_eq!(progress.completion_percentage, 30.0);
        assert_eq!(progress.total_time_spent, 10);
    }

    #[tokio::test]
    async fn supplied_collections_replace_wholesale() {
        let (store, course_id) = store_with_course().await;
        let with_achievement = ProgressUpdate {
            achievements: Some(vec![Achievement {
                kind: "first-chapter".to_string(),
                title: "Getting started".to_string(),
                earned_at: now_local(),
            }]),
            ..Default::default()
        };
        let progress = store
            .upsert_progress(&course_id, &with_achievement)
            .await
            .unwrap();
        assert_eq!(progress.achievements.len(), 1);

        // absent list leaves the stored one alone
        let unrelated = ProgressUpdate {
            total_time_spent: Some(5),
            ..Default::default()
        };
        let progress = store.upsert_progress(&course_id, &unrelated).await.unwrap();
        assert_eq!(progress.achievements.len(), 1);

        // explicit empty list clears it
        let cleared = ProgressUpdate {
            achievements: Some(Vec::new()),
            ..Default::default()
        };
        let progress = store.upsert_progress(&course_id, &cleared).await.unwrap();
        assert!(progress.achievements.is_empty());
    }

    #[tokio::test]
    async fn repeated_update_is_idempotent() {
        let (store, course_id) = store_with_course().await;
        let mut chapter_progress = BTreeMap::new();
        chapter_progress.insert(
            "ch-1".to_string(),
            ChapterProgress {
                completed_sections: vec!["1-1".to_string()],
                quiz_scores: Vec::new(),
                time_spent: 7,
                completed_at: None,
            },
        );
        let update = ProgressUpdate {
            completed_chapters: Some(vec!["ch-1".to_string()]),
            completion_percentage: Some(50.0),
            chapter_progress: Some(chapter_progress),
            ..Default::default()
        };

        let first = store.upsert_progress(&course_id, &update).await.unwrap();
        let second = store.upsert_progress(&course_id, &update).await.unwrap();

        assert_eq!(first.completed_chapters, second.completed_chapters);
        assert_eq!(first.completion_percentage, second.completion_percentage);
        assert_eq!(first.chapter_progress, second.chapter_progress);
    }

    #[tokio::test]
    async fn unknown_course_has_no_progress_row() {
        let (store, _) = store_with_course().await;
        assert!(store.get_progress("missing").await.unwrap().is_none());
    }
}
