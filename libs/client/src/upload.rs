//! The photo submission form

use std::path::Path;

use common::{
    Rarity,
    models::{Matto, NewMatto},
    photo::{encode_data_uri, mime_for_file_name},
};
use tracing::info;

use crate::{
    error::{ClientError, ClientResult},
    session::Session,
};

const MISSING_FIELDS: &str = "Fill in all the required fields!";

/// An image picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Read an image from disk; the MIME type comes from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(file_name, bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ClientResult<Self> {
        let file_name = file_name.into();
        let mime = mime_for_file_name(&file_name).ok_or_else(|| {
            ClientError::Validation(format!("{} is not a supported image", file_name))
        })?;
        if bytes.is_empty() {
            return Err(ClientError::Validation(format!("{} is empty", file_name)));
        }

        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn data_uri(&self) -> String {
        encode_data_uri(self.mime, &self.bytes)
    }
}

/// Transient state of one upload
///
/// Defaults are empty text, no photo and the lowest tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    photo: Option<Photo>,
    preview: Option<String>,
    nickname: String,
    description: String,
    rarity: Rarity,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_photo(&mut self, photo: Photo) {
        self.preview = Some(photo.data_uri());
        self.photo = Some(photo);
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Exactly one tier is selected; choosing one replaces the last
    pub fn select_rarity(&mut self, rarity: Rarity) {
        self.rarity = rarity;
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    /// Inline-displayable copy of the selected photo
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check the form against `session` without touching the network
    pub fn validate(&self, session: &Session) -> ClientResult<NewMatto> {
        let user = session.current().ok_or(ClientError::Anonymous)?;
        let photo = self
            .photo
            .as_ref()
            .ok_or_else(|| ClientError::Validation(MISSING_FIELDS.to_string()))?;
        let nickname = self.nickname.trim();
        if nickname.is_empty() {
            return Err(ClientError::Validation(MISSING_FIELDS.to_string()));
        }

        Ok(NewMatto {
            user_id: user.id,
            username: user.username.clone(),
            photo_data: photo.data_uri(),
            nickname: nickname.to_string(),
            description: self.description.trim().to_string(),
            rarity: self.rarity,
        })
    }

    /// Upload the form; on success every field returns to its default
    ///
    /// On failure the form is left exactly as it was.
    pub async fn submit(&mut self, session: &Session) -> ClientResult<Matto> {
        let body = self.validate(session)?;
        let matto = session.api().create_matto(&body).await?;
        info!(
            "Uploaded {} ({}, +{}pt)",
            matto.nickname, matto.rarity, matto.points
        );

        self.reset();
        Ok(matto)
    }
}
