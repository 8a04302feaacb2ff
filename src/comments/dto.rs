use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use super::repo_types::Comment;
use crate::images::image_path;

#[derive(Debug, Deserialize)]
pub struct CreateOrUpdateComment {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub author: i32,
    pub author_first_name: String,
    pub author_image: Option<String>,
    pub created_at: String,
    pub pk: i32,
    pub text: String,
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            author: c.author_id,
            author_first_name: c.author_first_name,
            author_image: c.author_image_id.map(|id| image_path("users", id)),
            created_at: c.created_at.format(&Rfc3339).unwrap_or_default(),
            pk: c.id,
            text: c.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn comment(image: Option<i32>) -> Comment {
        Comment {
            id: 9,
            ad_id: 1,
            author_id: 3,
            author_email: "bob@x.com".into(),
            author_first_name: "Bob".into(),
            author_image_id: image,
            text: "hi".into(),
            created_at: datetime!(2024-05-01 12:30:00 UTC),
        }
    }

    #[test]
    fn serializes_camel_case_with_timestamp() {
        let json = serde_json::to_value(CommentDto::from(comment(Some(7)))).unwrap();
        assert_eq!(json["pk"], 9);
        assert_eq!(json["author"], 3);
        assert_eq!(json["authorFirstName"], "Bob");
        assert_eq!(json["authorImage"], "/users/image/7");
        assert_eq!(json["createdAt"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn missing_author_image_is_null() {
        let json = serde_json::to_value(CommentDto::from(comment(None))).unwrap();
        assert!(json["authorImage"].is_null());
    }
}
