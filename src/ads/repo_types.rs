use serde::Serialize;
use sqlx::FromRow;

/// Ad row joined with its owner's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Ad {
    pub id: i32,
    pub owner_id: i32,
    pub owner_email: String,
    pub title: String,
    pub price: i32,
    pub description: String,
    pub image_id: i32,
}

/// Ad with the owner's contact details joined in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AdDetail {
    pub id: i32,
    pub title: String,
    pub price: i32,
    pub description: String,
    pub image_id: i32,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_email: String,
    pub owner_phone: String,
}

/// Mutable columns of an ad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdFields {
    pub title: String,
    pub price: i32,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewAd {
    pub owner_id: i32,
    pub fields: AdFields,
    pub image_id: i32,
}
