pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{Image, ImageContent};
pub use services::{ImageService, UploadItem};

pub fn image_path(prefix: &str, id: i32) -> String {
    format!("/{}/image/{}", prefix, id)
}
