use crate::error::{Error, Result};
use crate::types::{Message, MessageRef, MessagesResponse};
use async_trait::async_trait;
use tracing::debug;

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com";
pub const INBOX_LABEL: &str = "INBOX";
/// Upper bound on ids returned by one listing; no further pages are requested.
pub const MAX_RESULTS: u32 = 5000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailApi: Send + Sync {
    async fn list_messages(&self, query: &str) -> Result<Vec<MessageRef>>;
    async fn get_message(&self, id: &str) -> Result<Message>;
}

pub struct GmailClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl GmailClient {
    pub fn new(client: reqwest::Client, token: impl Into<String>) -> Self {
        Self::with_base_url(client, token, GMAIL_API_BASE)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(Error::Api { status, body })
    }
}

#[async_trait]
impl MailApi for GmailClient {
    // Lists inbox message ids matching `query`, capped at MAX_RESULTS
    async fn list_messages(&self, query: &str) -> Result<Vec<MessageRef>> {
        let messages_url = format!("{}/gmail/v1/users/me/messages", self.base_url);
        let response = self
            .client
            .get(&messages_url)
            .query(&[
                ("labelIds", INBOX_LABEL.to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
                ("q", query.to_string()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let messages_data: MessagesResponse = Self::check(response).await?.json().await?;
        let refs: Vec<MessageRef> = messages_data
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.id.is_some())
            .collect();
        debug!(count = refs.len(), "listed messages");
        Ok(refs)
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let message_url = format!(
            "{}/gmail/v1/users/me/messages/{}?format=full",
            self.base_url, id
        );
        let response = self
            .client
            .get(&message_url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
