use serde::{Deserialize, Serialize};

use super::repo_types::{Ad, AdDetail, AdFields};
use crate::images::image_path;

/// Body of `PATCH /ads/{id}` and the `properties` part of `POST /ads`.
#[derive(Debug, Deserialize)]
pub struct CreateOrUpdateAd {
    pub title: String,
    pub price: i32,
    #[serde(default)]
    pub description: String,
}

impl From<CreateOrUpdateAd> for AdFields {
    fn from(r: CreateOrUpdateAd) -> Self {
        Self {
            title: r.title,
            price: r.price,
            description: r.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdDto {
    pub pk: i32,
    pub author: i32,
    pub title: String,
    pub price: i32,
    pub image: String,
}

impl From<Ad> for AdDto {
    fn from(a: Ad) -> Self {
        Self {
            pk: a.id,
            author: a.owner_id,
            image: image_path("ads", a.image_id),
            title: a.title,
            price: a.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullAdDto {
    pub pk: i32,
    pub author_first_name: String,
    pub author_last_name: String,
    pub description: String,
    pub email: String,
    pub image: String,
    pub phone: String,
    pub price: i32,
    pub title: String,
}

impl From<AdDetail> for FullAdDto {
    fn from(d: AdDetail) -> Self {
        Self {
            pk: d.id,
            image: image_path("ads", d.image_id),
            author_first_name: d.owner_first_name,
            author_last_name: d.owner_last_name,
            description: d.description,
            email: d.owner_email,
            phone: d.owner_phone,
            price: d.price,
            title: d.title,
        }
    }
}
