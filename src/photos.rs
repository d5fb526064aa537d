use crate::config::AppConfig;
use crate::draft::{EntryDraft, MAX_PHOTOS};
use crate::error::PhotoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use futures::future::join_all;

/// Object storage as exposed by the backend.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Stores `bytes` and returns the stored object path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct PhotoUploader<'a> {
    storage: &'a dyn ObjectStorage,
    bucket: String,
    max_bytes: usize,
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

impl<'a> PhotoUploader<'a> {
    pub fn new(
        storage: &'a dyn ObjectStorage,
        bucket: impl Into<String>,
        max_bytes: usize,
    ) -> Self {
        PhotoUploader {
            storage,
            bucket: bucket.into(),
            max_bytes,
        }
    }

    /// Bucket and size limit come from the app config.
    pub fn from_config(storage: &'a dyn ObjectStorage, config: &AppConfig) -> Self {
        Self::new(
            storage,
            config.supabase.photo_bucket.clone(),
            config.max_photo_bytes,
        )
    }

    pub fn validate(&self, file: &PhotoFile) -> Result<(), PhotoError> {
        if !self.storage.is_authenticated() {
            return Err(PhotoError::NotAuthenticated);
        }
        if !file.content_type.starts_with("image/") {
            return Err(PhotoError::NotAnImage(file.content_type.clone()));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(PhotoError::TooLarge {
                size: file.bytes.len(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn object_path(user_id: &str, file_name: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}/{}-{}",
            user_id,
            at.timestamp_millis(),
            sanitize_file_name(file_name)
        )
    }

    async fn store(
        &self,
        user_id: &str,
        file: PhotoFile,
        at: DateTime<Utc>,
    ) -> Result<String, PhotoError> {
        let path = Self::object_path(user_id, &file.file_name, at);
        let stored = self
            .storage
            .upload(&self.bucket, &path, file.bytes, &file.content_type)
            .await
            .map_err(|e| PhotoError::Upload(e.to_string()))?;
        Ok(self.storage.public_url(&self.bucket, &stored))
    }

    /// Uploads one photo and attaches it to `draft`. The draft is only
    /// touched once the upload has succeeded.
    pub async fn upload_photo(
        &self,
        draft: &mut EntryDraft,
        user_id: &str,
        file: PhotoFile,
    ) -> Result<String, PhotoError> {
        draft.ensure_photo_slot()?;
        self.validate(&file)?;
        let url = self.store(user_id, file, Utc::now()).await?;
        draft.attach_photo(url.clone())?;
        log::info!("attached photo {}", url);
        Ok(url)
    }

    /// Uploads several photos concurrently. Free slots go, in order, to the
    /// files that pass validation; each result lines up with its input file.
    pub async fn upload_photos(
        &self,
        draft: &mut EntryDraft,
        user_id: &str,
        files: Vec<PhotoFile>,
    ) -> Vec<Result<String, PhotoError>> {
        let mut slots = draft.remaining_photo_slots();
        let now = Utc::now();

        let checked: Vec<Result<PhotoFile, PhotoError>> = files
            .into_iter()
            .map(|file| -> Result<PhotoFile, PhotoError> {
                self.validate(&file)?;
                if slots == 0 {
                    return Err(PhotoError::LimitReached(MAX_PHOTOS));
                }
                slots -= 1;
                Ok(file)
            })
            .collect();

        let uploads = checked.into_iter().enumerate().map(move |(i, file)| async move {
            let at = now + chrono::Duration::milliseconds(i as i64);
            self.store(user_id, file?, at).await
        });

        let results = join_all(uploads).await;
        results
            .into_iter()
            .map(|result| -> Result<String, PhotoError> {
                let url = result?;
                draft.attach_photo(url.clone())?;
                Ok(url)
            })
            .collect()
    }
}
