use anyhow::Context;
use uuid::Uuid;

use crate::course::input::CourseDraft;
use crate::course::model::{
    Chapter, CodeExample, Course, CourseMetadata, GlossaryTerm, KeyConcept, MediaAttachment,
    Quiz, QuizQuestion, Resource, Section,
};
use crate::store::rows::{
    ChapterRow, CodeExampleRow, CourseRow, GlossaryTermRow, KeyConceptRow, MediaAttachmentRow,
    QuizQuestionRow, QuizRow, ResourceRow, SectionRow,
};
use crate::store::{CourseStore, decode_json, encode_json};
use crate::utils::now_local;

impl CourseStore {
    /// Persist a full course graph in one transaction and read it back in
    /// the document shape. Row ids are generated here; authored identifiers
    /// like `chapter_id` and `section_id` are kept alongside.
    pub async fn create_course(&self, draft: CourseDraft, language: &str) -> anyhow::Result<Course> {
        let course_id = Uuid::new_v4().to_string();
        let now = now_local();
        let metadata = CourseMetadata {
            version: "1.0".to_string(),
            created_at: now,
            language: language.to_string(),
        };

        let mut tx = self.database.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO course (id, title, description, category, tags, total_estimated_hours,
                difficulty, prerequisites, overview_summary, learning_path, total_chapters,
                learning_objectives, learning_paths, related_topics, metadata, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(encode_json(&draft.tags)?)
        .bind(draft.total_estimated_hours)
        .bind(&draft.difficulty)
        .bind(encode_json(&draft.prerequisites)?)
        .bind(&draft.overview.summary)
        .bind(&draft.overview.learning_path)
        .bind(draft.overview.total_chapters)
        .bind(encode_json(&draft.overview.learning_objectives)?)
        .bind(encode_json(&draft.learning_path)?)
        .bind(encode_json(&draft.related_topics)?)
        .bind(encode_json(&metadata)?)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for chapter in &draft.chapters {
            let chapter_row_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO chapter (id, course_id, chapter_id, chapter_number, title, description,
                    difficulty, estimated_minutes, prerequisites, introduction, chapter_summary,
                    checkpoints, next_chapter_id, next_chapter_title, next_chapter_preview)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chapter_row_id)
            .bind(&course_id)
            .bind(&chapter.chapter_id)
            .bind(chapter.chapter_number)
            .bind(&chapter.title)
            .bind(&chapter.description)
            .bind(&chapter.difficulty)
            .bind(chapter.estimated_minutes)
            .bind(encode_json(&chapter.prerequisites)?)
            .bind(&chapter.content.introduction)
            .bind(&chapter.content.chapter_summary)
            .bind(encode_json(&chapter.content.checkpoints)?)
            .bind(chapter.next_chapter.as_ref().map(|n| n.chapter_id.as_str()))
            .bind(chapter.next_chapter.as_ref().map(|n| n.title.as_str()))
            .bind(chapter.next_chapter.as_ref().map(|n| n.preview.as_str()))
            .execute(&mut *tx)
            .await?;

            for (position, section) in chapter.content.sections.iter().enumerate() {
                let section_row_id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO section (id, chapter_id, section_id, kind, title, content,
                        estimated_minutes, sort_order)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&section_row_id)
                .bind(&chapter_row_id)
                .bind(&section.section_id)
                .bind(&section.kind)
                .bind(&section.title)
                .bind(&section.content)
                .bind(section.estimated_minutes)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;

                if let Some(media) = &section.media {
                    for attachment in media {
                        sqlx::query(
                            "INSERT INTO media_attachment (id, section_id, kind, url, data, caption) VALUES (?, ?, ?, ?, ?, ?)",
                        )
                        .bind(Uuid::new_v4().to_string())
                        .bind(&section_row_id)
                        .bind(&attachment.kind)
                        .bind(&attachment.url)
                        .bind(&attachment.data)
                        .bind(&attachment.caption)
                        .execute(&mut *tx)
                        .await?;
                    }
                }

                if let Some(examples) = &section.code_examples {
                    for example in examples {
                        sqlx::query(
                            "INSERT INTO code_example (id, section_id, language, code, explanation, runnable) VALUES (?, ?, ?, ?, ?, ?)",
                        )
                        .bind(Uuid::new_v4().to_string())
                        .bind(&section_row_id)
                        .bind(&example.language)
                        .bind(&example.code)
                        .bind(&example.explanation)
                        .bind(example.runnable)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
            }

            for concept in &chapter.content.key_concepts {
                sqlx::query(
                    "INSERT INTO key_concept (id, chapter_id, term, definition, importance) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&chapter_row_id)
                .bind(&concept.term)
                .bind(&concept.definition)
                .bind(&concept.importance)
                .execute(&mut *tx)
                .await?;
            }

            if let Some(quiz) = &chapter.quiz {
                let quiz_row_id = Uuid::new_v4().to_string();
                sqlx::query("INSERT INTO quiz (id, chapter_id) VALUES (?, ?)")
                    .bind(&quiz_row_id)
                    .bind(&chapter_row_id)
                    .execute(&mut *tx)
                    .await?;

                for question in &quiz.questions {
                    sqlx::query(
                        r#"
                        INSERT INTO quiz_question (id, quiz_id, question, kind, options,
                            correct_answer, explanation, points)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(&quiz_row_id)
                    .bind(&question.question)
                    .bind(&question.kind)
                    .bind(question.options.as_ref().map(encode_json).transpose()?)
                    .bind(&question.correct_answer)
                    .bind(&question.explanation)
                    .bind(question.points)
                    .execute(&mut *tx)
                    .await?;
                }
            }

            for resource in &chapter.resources {
                sqlx::query(
                    "INSERT INTO resource (id, chapter_id, kind, title, url, description, is_required) VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&chapter_row_id)
                .bind(&resource.kind)
                .bind(&resource.title)
                .bind(&resource.url)
                .bind(&resource.description)
                .bind(resource.is_required)
                .execute(&mut *tx)
                .await?;
            }
        }

        for term in &draft.glossary {
            sqlx::query(
                "INSERT INTO glossary_term (id, course_id, term, definition, first_mentioned_in) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&course_id)
            .bind(&term.term)
            .bind(&term.definition)
            .bind(&term.first_mentioned_in)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_course(&course_id)
            .await?
            .context("read back created course")
    }

    /// Course summaries, newest first. `chapters` and `glossary_terms` stay
    /// absent here.
    pub async fn list_courses(&self) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>("SELECT * FROM course ORDER BY created_at DESC")
            .fetch_all(&self.database)
            .await?;
        rows.into_iter()
            .map(|row| course_from_row(row, None, None))
            .collect()
    }

    /// Full course document with chapters and glossary, `None` when the id
    /// is unknown.
    pub async fn get_course(&self, id: &str) -> anyhow::Result<Option<Course>> {
        let Some(row) = sqlx::query_as::<_, CourseRow>("SELECT * FROM course WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.database)
            .await?
        else {
            return Ok(None);
        };

        let chapters = self.load_chapters(&row.id).await?;
        let glossary_rows = sqlx::query_as::<_, GlossaryTermRow>(
            "SELECT * FROM glossary_term WHERE course_id = ? ORDER BY rowid",
        )
        .bind(&row.id)
        .fetch_all(&self.database)
        .await?;
        let glossary_terms = glossary_rows
            .into_iter()
            .map(|term| GlossaryTerm {
                id: term.id,
                term: term.term,
                definition: term.definition,
                first_mentioned_in: term.first_mentioned_in,
            })
            .collect();

        course_from_row(row, Some(chapters), Some(glossary_terms)).map(Some)
    }

    /// Single chapter by either its row id or its authored `chapter_id`.
    pub async fn get_chapter(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> anyhow::Result<Option<Chapter>> {
        let Some(row) = sqlx::query_as::<_, ChapterRow>(
            "SELECT * FROM chapter WHERE course_id = ? AND (id = ? OR chapter_id = ?)",
        )
        .bind(course_id)
        .bind(chapter_id)
        .bind(chapter_id)
        .fetch_optional(&self.database)
        .await?
        else {
            return Ok(None);
        };
        self.assemble_chapter(row).await.map(Some)
    }

    pub async fn course_exists(&self, id: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course WHERE id = ?")
            .bind(id)
            .fetch_one(&self.database)
            .await?;
        Ok(count > 0)
    }

    pub async fn course_title_exists(&self, title: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course WHERE title = ?")
            .bind(title)
            .fetch_one(&self.database)
            .await?;
        Ok(count > 0)
    }

    async fn load_chapters(&self, course_id: &str) -> anyhow::Result<Vec<Chapter>> {
        let rows = sqlx::query_as::<_, ChapterRow>(
            "SELECT * FROM chapter WHERE course_id = ? ORDER BY chapter_number ASC",
        )
        .bind(course_id)
        .fetch_all(&self.database)
        .await?;

        let mut chapters = Vec::with_capacity(rows.len());
        for row in rows {
            chapters.push(self.assemble_chapter(row).await?);
        }
        Ok(chapters)
    }

    async fn assemble_chapter(&self, row: ChapterRow) -> anyhow::Result<Chapter> {
        let section_rows = sqlx::query_as::<_, SectionRow>(
            "SELECT * FROM section WHERE chapter_id = ? ORDER BY sort_order ASC",
        )
        .bind(&row.id)
        .fetch_all(&self.database)
        .await?;

        let mut sections = Vec::with_capacity(section_rows.len());
        for section_row in section_rows {
            let media = sqlx::query_as::<_, MediaAttachmentRow>(
                "SELECT * FROM media_attachment WHERE section_id = ? ORDER BY rowid",
            )
            .bind(&section_row.id)
            .fetch_all(&self.database)
            .await?;
            let examples = sqlx::query_as::<_, CodeExampleRow>(
                "SELECT * FROM code_example WHERE section_id = ? ORDER BY rowid",
            )
            .bind(&section_row.id)
            .fetch_all(&self.database)
            .await?;
            sections.push(section_from_row(section_row, media, examples));
        }

        let concept_rows = sqlx::query_as::<_, KeyConceptRow>(
            "SELECT * FROM key_concept WHERE chapter_id = ? ORDER BY rowid",
        )
        .bind(&row.id)
        .fetch_all(&self.database)
        .await?;
        let key_concepts = concept_rows
            .into_iter()
            .map(|concept| KeyConcept {
                id: concept.id,
                term: concept.term,
                definition: concept.definition,
                importance: concept.importance,
            })
            .collect();

        let quiz = match sqlx::query_as::<_, QuizRow>("SELECT * FROM quiz WHERE chapter_id = ?")
            .bind(&row.id)
            .fetch_optional(&self.database)
            .await?
        {
            Some(quiz_row) => {
                let question_rows = sqlx::query_as::<_, QuizQuestionRow>(
                    "SELECT * FROM quiz_question WHERE quiz_id = ? ORDER BY rowid",
                )
                .bind(&quiz_row.id)
                .fetch_all(&self.database)
                .await?;
                let questions = question_rows
                    .into_iter()
                    .map(question_from_row)
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Some(Quiz {
                    id: quiz_row.id,
                    questions,
                })
            }
            None => None,
        };

        let resource_rows = sqlx::query_as::<_, ResourceRow>(
            "SELECT * FROM resource WHERE chapter_id = ? ORDER BY rowid",
        )
        .bind(&row.id)
        .fetch_all(&self.database)
        .await?;
        let resources = resource_rows
            .into_iter()
            .map(|resource| Resource {
                id: resource.id,
                kind: resource.kind,
                title: resource.title,
                url: resource.url,
                description: resource.description,
                is_required: resource.is_required,
            })
            .collect();

        chapter_from_row(row, sections, key_concepts, quiz, resources)
    }
}

fn course_from_row(
    row: CourseRow,
    chapters: Option<Vec<Chapter>>,
    glossary_terms: Option<Vec<GlossaryTerm>>,
) -> anyhow::Result<Course> {
    Ok(Course {
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        tags: decode_json(&row.tags)?,
        total_estimated_hours: row.total_estimated_hours,
        difficulty: row.difficulty,
        prerequisites: decode_json(&row.prerequisites)?,
        overview_summary: row.overview_summary,
        learning_path: row.learning_path,
        total_chapters: row.total_chapters,
        learning_objectives: decode_json(&row.learning_objectives)?,
        chapters,
        glossary_terms,
        learning_paths: decode_json(&row.learning_paths)?,
        metadata: decode_json(&row.metadata)?,
        related_topics: decode_json(&row.related_topics)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn chapter_from_row(
    row: ChapterRow,
    sections: Vec<Section>,
    key_concepts: Vec<KeyConcept>,
    quiz: Option<Quiz>,
    resources: Vec<Resource>,
) -> anyhow::Result<Chapter> {
    Ok(Chapter {
        id: row.id,
        chapter_id: row.chapter_id,
        chapter_number: row.chapter_number,
        title: row.title,
        description: row.description,
        difficulty: row.difficulty,
        estimated_minutes: row.estimated_minutes,
        prerequisites: decode_json(&row.prerequisites)?,
        introduction: row.introduction,
        chapter_summary: row.chapter_summary,
        checkpoints: decode_json(&row.checkpoints)?,
        sections,
        key_concepts,
        quiz,
        resources,
        next_chapter_id: row.next_chapter_id,
        next_chapter_title: row.next_chapter_title,
        next_chapter_preview: row.next_chapter_preview,
    })
}

fn section_from_row(
    row: SectionRow,
    media: Vec<MediaAttachmentRow>,
    examples: Vec<CodeExampleRow>,
) -> Section {
    Section {
        id: row.id,
        section_id: row.section_id,
        kind: row.kind,
        title: row.title,
        content: row.content,
        estimated_minutes: row.estimated_minutes,
        order: row.sort_order,
        media_attachments: media
            .into_iter()
            .map(|attachment| MediaAttachment {
                id: attachment.id,
                kind: attachment.kind,
                url: attachment.url,
                data: attachment.data,
                caption: attachment.caption,
            })
            .collect(),
        code_examples: examples
            .into_iter()
            .map(|example| CodeExample {
                id: example.id,
                language: example.language,
                code: example.code,
                explanation: example.explanation,
                runnable: example.runnable,
            })
            .collect(),
    }
}

fn question_from_row(row: QuizQuestionRow) -> anyhow::Result<QuizQuestion> {
    let options = match row.options {
        Some(text) => Some(decode_json(&text)?),
        None => None,
    };
    Ok(QuizQuestion {
        id: row.id,
        question: row.question,
        kind: row.kind,
        options,
        correct_answer: row.correct_answer,
        explanation: row.explanation,
        points: row.points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::input::ImportDocument;
    use serde_json::json;
    use std::time::Duration;

    async fn store() -> CourseStore {
        CourseStore::in_memory().await.unwrap()
    }

    fn draft_from(value: serde_json::Value) -> CourseDraft {
        serde_json::from_value::<ImportDocument>(value)
            .unwrap()
            .into_draft()
            .unwrap()
    }

    fn full_document() -> serde_json::Value {
        json!({
            "title": "Async Rust",
            "description": "Futures from the ground up",
            "category": "Programming",
            "tags": ["rust", "async"],
            "totalEstimatedHours": 6.5,
            "difficulty": "Intermediate",
            "relatedTopics": ["tokio", "pinning"],
            "chapters": [
                {
                    "chapterId": "ch-futures",
                    "chapterNumber": 1,
                    "title": "Futures",
                    "estimatedMinutes": 45,
                    "content": {
                        "introduction": "What a future is",
                        "sections": [
                            {
                                "sectionId": "1-1",
                                "type": "text",
                                "title": "Polling",
                                "content": "poll, Ready, Pending",
                                "estimatedMinutes": 10
                            },
                            {
                                "sectionId": "1-2",
                                "type": "code",
                                "title": "Writing a future by hand",
                                "content": "impl Future by hand",
                                "estimatedMinutes": 15,
                                "codeExamples": [
                                    {
                                        "language": "rust",
                                        "code": "impl Future for Delay {}",
                                        "explanation": "manual impl",
                                        "runnable": true
                                    }
                                ],
                                "media": [
                                    { "type": "diagram", "url": "https://example.com/poll.svg", "caption": "poll loop" }
                                ]
                            }
                        ],
                        "keyConcepts": [
                            { "term": "poll", "definition": "drive a future", "importance": "high" }
                        ],
                        "chapterSummary": "Futures are inert",
                        "checkpoints": ["explain poll"]
                    },
                    "quiz": {
                        "questions": [
                            {
                                "question": "What does poll return?",
                                "type": "multiple-choice",
                                "options": ["Poll<T>", "T"],
                                "correctAnswer": "Poll<T>",
                                "explanation": "Ready or Pending",
                                "points": 2
                            },
                            {
                                "question": "Futures run themselves",
                                "type": "true-false",
                                "correctAnswer": "false",
                                "explanation": "they must be polled"
                            }
                        ]
                    },
                    "resources": [
                        {
                            "type": "article",
                            "title": "Async book",
                            "url": "https://rust-lang.github.io/async-book/",
                            "description": "reference",
                            "isRequired": true
                        }
                    ],
                    "nextChapter": { "chapterId": "ch-tokio", "title": "Tokio", "preview": "executors" }
                },
                {
                    "chapterId": "ch-tokio",
                    "chapterNumber": 2,
                    "title": "Tokio",
                    "estimatedMinutes": 60,
                    "content": { "introduction": "The runtime", "sections": [] }
                }
            ],
            "glossary": [
                { "term": "executor", "definition": "polls futures", "firstMentionedIn": "ch-tokio" }
            ]
        })
    }

    #[tokio::test]
    async fn create_and_read_back_full_graph() {
        let store = store().await;
        let course = store
            .create_course(draft_from(full_document()), "ja")
            .await
            .unwrap();

        assert_eq!(course.title, "Async Rust");
        assert_eq!(course.metadata.language, "ja");
        assert_eq!(course.metadata.version, "1.0");
        assert_eq!(course.related_topics, vec!["tokio", "pinning"]);

        let chapters = course.chapters.as_ref().unwrap();
        assert_eq!(chapters.len(), 2);

        let futures = &chapters[0];
        assert_eq!(futures.chapter_id, "ch-futures");
        assert_eq!(futures.sections.len(), 2);
        assert_eq!(futures.sections[1].code_examples.len(), 1);
        assert!(futures.sections[1].code_examples[0].runnable);
        assert_eq!(futures.sections[1].media_attachments.len(), 1);
        assert_eq!(futures.key_concepts.len(), 1);
        assert_eq!(futures.resources.len(), 1);
        assert!(futures.resources[0].is_required);
        assert_eq!(futures.next_chapter_id.as_deref(), Some("ch-tokio"));

        let quiz = futures.quiz.as_ref().unwrap();
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(
            quiz.questions[0].options,
            Some(vec!["Poll<T>".to_string(), "T".to_string()])
        );
        assert_eq!(quiz.questions[0].points, Some(2));
        assert_eq!(quiz.questions[1].options, None);
        assert_eq!(quiz.questions[1].points, None);

        let tokio_chapter = &chapters[1];
        assert!(tokio_chapter.quiz.is_none());
        assert!(tokio_chapter.next_chapter_id.is_none());

        let glossary = course.glossary_terms.as_ref().unwrap();
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary[0].first_mentioned_in, "ch-tokio");
    }

    #[tokio::test]
    async fn sections_keep_authored_order() {
        let store = store().await;
        let document = json!({
            "title": "Ordering",
            "chapters": [{
                "chapterId": "ch-1",
                "chapterNumber": 1,
                "title": "One",
                "content": {
                    "sections": [
                        { "sectionId": "s-b", "type": "text" },
                        { "sectionId": "s-a", "type": "text" },
                        { "sectionId": "s-c", "type": "text" }
                    ]
                }
            }]
        });
        let course = store
            .create_course(draft_from(document), "en")
            .await
            .unwrap();

        let sections = &course.chapters.as_ref().unwrap()[0].sections;
        let ids: Vec<&str> = sections.iter().map(|s| s.section_id.as_str()).collect();
        assert_eq!(ids, vec!["s-b", "s-a", "s-c"]);
        let orders: Vec<i64> = sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn chapters_sort_by_ordinal() {
        let store = store().await;
        let document = json!({
            "title": "Shuffled",
            "chapters": [
                { "chapterId": "ch-2", "chapterNumber": 2, "title": "Second" },
                { "chapterId": "ch-1", "chapterNumber": 1, "title": "First" }
            ]
        });
        let course = store
            .create_course(draft_from(document), "en")
            .await
            .unwrap();

        let numbers: Vec<i64> = course
            .chapters
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.chapter_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn list_is_newest_first_without_nested_content() {
        let store = store().await;
        let older = json!({ "title": "Older", "chapters": [] });
        let newer = json!({ "title": "Newer", "chapters": [] });
        store.create_course(draft_from(older), "en").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.create_course(draft_from(newer), "en").await.unwrap();

        let courses = store.list_courses().await.unwrap();
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
        assert!(courses.iter().all(|c| c.chapters.is_none()));
        assert!(courses.iter().all(|c| c.glossary_terms.is_none()));
    }

    #[tokio::test]
    async fn absent_media_creates_no_rows() {
        let store = store().await;
        let document = json!({
            "title": "Media",
            "chapters": [{
                "chapterId": "ch-1",
                "chapterNumber": 1,
                "title": "One",
                "content": {
                    "sections": [
                        { "sectionId": "none", "type": "text" },
                        { "sectionId": "empty", "type": "text", "media": [] },
                        {
                            "sectionId": "one",
                            "type": "text",
                            "media": [{ "type": "image", "url": "https://example.com/a.png", "caption": "a" }]
                        }
                    ]
                }
            }]
        });
        store
            .create_course(draft_from(document), "en")
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_attachment")
            .fetch_one(&store.database)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn chapter_lookup_accepts_both_identifiers() {
        let store = store().await;
        let course = store
            .create_course(draft_from(full_document()), "en")
            .await
            .unwrap();
        let row_id = course.chapters.as_ref().unwrap()[0].id.clone();

        let by_authored = store
            .get_chapter(&course.id, "ch-futures")
            .await
            .unwrap()
            .unwrap();
        let by_row = store.get_chapter(&course.id, &row_id).await.unwrap().unwrap();
        assert_eq!(by_authored.id, by_row.id);
        assert_eq!(by_authored.title, "Futures");

        assert!(
            store
                .get_chapter(&course.id, "no-such-chapter")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get_chapter("no-such-course", "ch-futures")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_course_reads_as_none() {
        let store = store().await;
        assert!(store.get_course("missing").await.unwrap().is_none());
        assert!(!store.course_exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn title_lookup_sees_created_courses() {
        let store = store().await;
        let course = store
            .create_course(draft_from(json!({ "title": "Dedupe me", "chapters": [] })), "en")
            .await
            .unwrap();

        assert!(store.course_title_exists("Dedupe me").await.unwrap());
        assert!(!store.course_title_exists("Someone else").await.unwrap());
        assert!(store.course_exists(&course.id).await.unwrap());
    }
}
