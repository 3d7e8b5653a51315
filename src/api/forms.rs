//! Multipart form decoding for book and author submissions

use std::collections::HashMap;
use std::str::FromStr;

use axum_extra::extract::Multipart;
use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::book::UploadedImage,
    validation::ValidationFailure,
};

/// Decoded multipart form: text fields plus an optional image attachment
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

/// Drain a multipart body. Fields named `image` or `file` are treated as the
/// attachment; everything else is collected as text.
pub async fn read_form(mut multipart: Multipart) -> AppResult<FormData> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" || name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
                .to_vec();
            image = Some(UploadedImage { file_name, data });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?;
            fields.insert(name, value);
        }
    }

    Ok(FormData { fields, image })
}

impl FormData {
    pub fn required(&self, name: &str) -> AppResult<String> {
        self.fields
            .get(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationFailure::single(name, "field is required").into())
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> AppResult<T> {
        self.required(name)?
            .parse()
            .map_err(|_| ValidationFailure::single(name, "invalid value").into())
    }

    pub fn parse_date(&self, name: &str) -> AppResult<NaiveDate> {
        NaiveDate::parse_from_str(&self.required(name)?, "%Y-%m-%d")
            .map_err(|_| ValidationFailure::single(name, "expected a YYYY-MM-DD date").into())
    }
}
