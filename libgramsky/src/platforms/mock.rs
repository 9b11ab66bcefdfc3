//! Mock destination platform for testing
//!
//! A configurable stand-in that records every call so tests can verify the
//! orchestration logic without credentials or network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{PlatformError, Result};
use crate::platforms::DestinationPlatform;
use crate::post::Embed;

/// A post as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub date: DateTime<Utc>,
    pub text: String,
    pub media_count: usize,
    pub is_video: bool,
}

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,
    pub auth_succeeds: bool,
    pub upload_succeeds: bool,
    pub post_succeeds: bool,
    pub auth_error: Option<String>,
    pub post_error: Option<String>,

    pub login_call_count: Arc<Mutex<usize>>,
    pub upload_call_count: Arc<Mutex<usize>>,
    pub created_posts: Arc<Mutex<Vec<RecordedPost>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            upload_succeeds: true,
            post_succeeds: true,
            auth_error: None,
            post_error: None,
            login_call_count: Arc::new(Mutex::new(0)),
            upload_call_count: Arc::new(Mutex::new(0)),
            created_posts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
    authenticated: bool,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A mock where every operation succeeds, pre-authenticated for
    /// convenience in tests.
    pub fn success() -> Self {
        let mut platform = Self::new(MockConfig::default());
        platform.authenticated = true;
        platform
    }

    /// A mock that fails authentication.
    pub fn auth_failure(error: &str) -> Self {
        Self::new(MockConfig {
            auth_succeeds: false,
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A pre-authenticated mock that fails every post creation.
    pub fn post_failure(error: &str) -> Self {
        let mut platform = Self::new(MockConfig {
            post_succeeds: false,
            post_error: Some(error.to_string()),
            ..Default::default()
        });
        platform.authenticated = true;
        platform
    }

    /// A pre-authenticated mock that fails every video upload.
    pub fn upload_failure() -> Self {
        let mut platform = Self::new(MockConfig {
            upload_succeeds: false,
            ..Default::default()
        });
        platform.authenticated = true;
        platform
    }

    pub fn login_call_count(&self) -> usize {
        *self.config.login_call_count.lock().unwrap()
    }

    pub fn upload_call_count(&self) -> usize {
        *self.config.upload_call_count.lock().unwrap()
    }

    pub fn created_posts(&self) -> Vec<RecordedPost> {
        self.config.created_posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationPlatform for MockPlatform {
    async fn login(&mut self) -> Result<()> {
        *self.config.login_call_count.lock().unwrap() += 1;

        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            let error_msg = self
                .config
                .auth_error
                .clone()
                .unwrap_or_else(|| "Mock authentication failed".to_string());
            Err(PlatformError::Authentication(error_msg).into())
        }
    }

    async fn upload_video(&self, bytes: &[u8]) -> Result<String> {
        *self.config.upload_call_count.lock().unwrap() += 1;

        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }
        if !self.config.upload_succeeds {
            return Err(PlatformError::Upload("Mock upload failed".to_string()).into());
        }
        Ok(format!("mock-blob-{}", bytes.len()))
    }

    async fn create_post(
        &self,
        date: DateTime<Utc>,
        text: &str,
        embed: &Embed,
    ) -> Result<Option<String>> {
        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }
        if !self.config.post_succeeds {
            let error_msg = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| "Mock posting failed".to_string());
            return Err(PlatformError::Posting(error_msg).into());
        }

        let (media_count, is_video) = match embed {
            Embed::Video(_) => (1, true),
            Embed::Images(images) => (images.len(), false),
        };
        let mut posts = self.config.created_posts.lock().unwrap();
        posts.push(RecordedPost {
            date,
            text: text.to_string(),
            media_count,
            is_video,
        });
        let index = posts.len();
        Ok(Some(format!("https://mock.example/post/{}", index)))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_mock_records_created_posts() {
        let platform = MockPlatform::success();
        let date = Utc.timestamp_opt(1600000000, 0).unwrap();

        let url = platform
            .create_post(date, "hello", &Embed::empty())
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://mock.example/post/1"));

        let posts = platform.created_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "hello");
        assert_eq!(posts[0].media_count, 0);
        assert!(!posts[0].is_video);
    }

    #[tokio::test]
    async fn test_mock_auth_failure() {
        let mut platform = MockPlatform::auth_failure("Invalid credentials");
        let result = platform.login().await;
        assert!(result.is_err());
        assert_eq!(platform.login_call_count(), 1);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_mock_post_failure() {
        let platform = MockPlatform::post_failure("Network down");
        let date = Utc.timestamp_opt(1600000000, 0).unwrap();
        let result = platform.create_post(date, "hello", &Embed::empty()).await;
        assert!(result.is_err());
        assert!(platform.created_posts().is_empty());
    }

    #[tokio::test]
    async fn test_mock_requires_authentication() {
        let platform = MockPlatform::new(MockConfig::default());
        let result = platform.upload_video(b"bytes").await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Not authenticated"));
    }

    #[tokio::test]
    async fn test_mock_upload_returns_ref() {
        let platform = MockPlatform::success();
        let blob_ref = platform.upload_video(b"12345").await.unwrap();
        assert_eq!(blob_ref, "mock-blob-5");
        assert_eq!(platform.upload_call_count(), 1);
    }
}
