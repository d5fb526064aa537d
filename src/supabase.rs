//! Thin reqwest client for the hosted Supabase backend: PostgREST for diary
//! rows, Storage for photos.

use crate::config::SupabaseConfig;
use crate::diary_entry::DiaryEntry;
use crate::entry_store::EntryStore;
use crate::photos::ObjectStorage;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use reqwest::{Client, Method, RequestBuilder, Response};

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    entries_table: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        SupabaseClient {
            http: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
            entries_table: config.entries_table.clone(),
        }
    }

    /// Requests made after this act on behalf of the signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(eyre!("{} failed with {}: {}", what, status, body))
    }

    /// Request against the single row whose `id` matches.
    fn entry_request(&self, method: Method, id: &str) -> RequestBuilder {
        self.http
            .request(method, self.rest_url(&self.entries_table))
            .query(&[("id", format!("eq.{}", id))])
    }
}

#[async_trait]
impl EntryStore for SupabaseClient {
    async fn list(&self) -> Result<Vec<DiaryEntry>> {
        let request = self
            .http
            .get(self.rest_url(&self.entries_table))
            .query(&[("select", "*"), ("order", "date.desc")]);
        let response = self
            .authorize(request)
            .send()
            .await
            .wrap_err("Failed to reach Supabase")?;
        let entries = Self::check(response, "list entries")
            .await?
            .json::<Vec<DiaryEntry>>()
            .await?;
        log::debug!("fetched {} diary entries", entries.len());
        Ok(entries)
    }

    async fn create(&self, entry: DiaryEntry) -> Result<DiaryEntry> {
        let response = self
            .authorize(self.http.post(self.rest_url(&self.entries_table)))
            .header("Prefer", "return=representation")
            .json(&entry)
            .send()
            .await
            .wrap_err("Failed to reach Supabase")?;
        let mut rows = Self::check(response, "create entry")
            .await?
            .json::<Vec<DiaryEntry>>()
            .await?;
        rows.pop().ok_or_else(|| eyre!("create entry returned no row"))
    }

    async fn update(&self, entry: DiaryEntry) -> Result<DiaryEntry> {
        let id = entry
            .id
            .clone()
            .ok_or_else(|| eyre!("cannot update an entry without an id"))?;
        let response = self
            .authorize(self.entry_request(Method::PATCH, &id))
            .header("Prefer", "return=representation")
            .json(&entry)
            .send()
            .await
            .wrap_err("Failed to reach Supabase")?;
        let mut rows = Self::check(response, "update entry")
            .await?
            .json::<Vec<DiaryEntry>>()
            .await?;
        rows.pop().ok_or_else(|| eyre!("entry {} not found", id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.entry_request(Method::DELETE, id))
            .send()
            .await
            .wrap_err("Failed to reach Supabase")?;
        Self::check(response, "delete entry").await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for SupabaseClient {
    fn is_authenticated(&self) -> bool {
        SupabaseClient::is_authenticated(self)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let response = self
            .authorize(self.http.post(self.object_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .wrap_err("Failed to reach Supabase storage")?;
        Self::check(response, "photo upload").await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.public_object_url(bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: "https://proj.supabase.co/".into(),
            anon_key: "anon".into(),
            ..Default::default()
        })
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let client = client();
        assert_eq!(
            client.rest_url("site_diary_entries"),
            "https://proj.supabase.co/rest/v1/site_diary_entries"
        );
        assert_eq!(
            client.public_object_url("site-diary-photos", "u1/1.jpg"),
            "https://proj.supabase.co/storage/v1/object/public/site-diary-photos/u1/1.jpg"
        );
    }

    #[test]
    fn row_filter_is_url_encoded() {
        let request = client()
            .entry_request(Method::DELETE, "a&b c")
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/rest/v1/site_diary_entries");
        assert_eq!(request.url().query(), Some("id=eq.a%26b+c"));

        let request = client().entry_request(Method::PATCH, "42").build().unwrap();
        assert_eq!(request.url().query(), Some("id=eq.42"));
    }

    #[test]
    fn access_token_marks_client_authenticated() {
        assert!(!client().is_authenticated());
        assert!(client().with_access_token("jwt").is_authenticated());
    }
}
