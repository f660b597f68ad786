use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::api::ApiSuccess;
use crate::course::input::{CourseDraft, ImportDocument};
use crate::course::model::{Chapter, Course, LearningProgress, ProgressUpdate};
use crate::error::{Error, ErrorBody};
use crate::service::CourseService;

#[utoipa::path(
    context_path = "/api/courses",
    path = "",
    method(post),
    request_body = CourseDraft,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn create_course(
    State(service): State<Arc<CourseService>>,
    Json(draft): Json<CourseDraft>,
) -> impl IntoResponse {
    match service.create_course(draft).await {
        Ok(course) => (StatusCode::CREATED, Json(ApiSuccess::new(course))).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "",
    method(get),
    responses(
        (status = 200, description = "All courses, newest first", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_courses(State(service): State<Arc<CourseService>>) -> impl IntoResponse {
    match service.list_courses().await {
        Ok(courses) => Json(ApiSuccess::new(courses)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "/{id}",
    method(get),
    params(
        ("id" = String, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Course with chapters and glossary", body = Course),
        (status = 404, description = "Course not found", body = ErrorBody)
    )
)]
pub async fn get_course(
    State(service): State<Arc<CourseService>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.get_course(&id).await {
        Ok(course) => Json(ApiSuccess::new(course)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "/{course_id}/chapters/{chapter_id}",
    method(get),
    params(
        ("course_id" = String, Path, description = "Course id"),
        ("chapter_id" = String, Path, description = "Chapter row id or authored chapter id")
    ),
    responses(
        (status = 200, description = "Chapter with its content blocks", body = Chapter),
        (status = 404, description = "Chapter not found", body = ErrorBody)
    )
)]
pub async fn get_chapter(
    State(service): State<Arc<CourseService>>,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match service.get_chapter(&course_id, &chapter_id).await {
        Ok(chapter) => Json(ApiSuccess::new(chapter)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "/import",
    method(post),
    request_body = ImportDocument,
    responses(
        (status = 201, description = "Course imported", body = Course),
        (status = 400, description = "Invalid course data format", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn import_course(
    State(service): State<Arc<CourseService>>,
    Json(value): Json<serde_json::Value>,
) -> impl IntoResponse {
    // Shape errors get the same enveloped 400 as semantic ones, so the
    // document is decoded from a raw value rather than by the extractor.
    let document: ImportDocument = match serde_json::from_value(value) {
        Ok(document) => document,
        Err(_) => {
            return Error::InvalidCourseData("Invalid course data format".to_string())
                .into_response();
        }
    };
    match service.import_course(document).await {
        Ok(course) => (
            StatusCode::CREATED,
            Json(ApiSuccess::with_message("Course imported successfully", course)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "/{course_id}/progress",
    method(post),
    params(
        ("course_id" = String, Path, description = "Course id")
    ),
    request_body = ProgressUpdate,
    responses(
        (status = 200, description = "Merged progress record", body = LearningProgress),
        (status = 404, description = "Course not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_progress(
    State(service): State<Arc<CourseService>>,
    Path(course_id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> impl IntoResponse {
    match service.update_progress(&course_id, update).await {
        Ok(progress) => Json(ApiSuccess::new(progress)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    context_path = "/api/courses",
    path = "/{course_id}/progress",
    method(get),
    params(
        ("course_id" = String, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Stored progress, zeroed when never updated", body = LearningProgress),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_progress(
    State(service): State<Arc<CourseService>>,
    Path(course_id): Path<String>,
) -> impl IntoResponse {
    match service.get_progress(&course_id).await {
        Ok(progress) => Json(ApiSuccess::new(progress)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn get_courses_scope() -> Router<Arc<CourseService>> {
    Router::new().nest(
        "/courses",
        Router::new()
            .route("/", post(create_course).get(list_courses))
            .route("/import", post(import_course))
            .route("/{id}", get(get_course))
            .route("/{course_id}/chapters/{chapter_id}", get(get_chapter))
            .route(
                "/{course_id}/progress",
                post(update_progress).get(get_progress),
            ),
    )
}
