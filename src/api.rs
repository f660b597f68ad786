pub mod courses;

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Success envelope shared by every endpoint. `message` is only carried by
/// operations that announce one, e.g. course import.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiSuccess<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data,
        }
    }

    pub fn with_message(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message),
            data,
        }
    }
}

#[derive(OpenApi)]
#[openapi(paths(
    courses::create_course,
    courses::list_courses,
    courses::get_course,
    courses::get_chapter,
    courses::import_course,
    courses::update_progress,
    courses::get_progress,
))]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_absent_message() {
        let value = serde_json::to_value(ApiSuccess::new(1)).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], 1);
        assert!(value.get("message").is_none());

        let value = serde_json::to_value(ApiSuccess::with_message("done", 1)).unwrap();
        assert_eq!(value["message"], "done");
    }
}
