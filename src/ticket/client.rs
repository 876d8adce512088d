//! Ticket store contract and the REST implementation.
//!
//! [`TicketStore`] is the seam between the support flow and ticket persistence;
//! [`TicketApiClient`] implements it against the remote HTTP API. The client is
//! stateless, applies one bounded request timeout, and never retries — callers
//! decide how to degrade when a call fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::{Result, SupportError, User};

use super::model::{
    Attachment, CreateMessageRequest, CreateTicketRequest, Ticket, TicketMessage, TicketStatus,
    TicketWithMessages,
};

/// Remote ticket store operations. The support flow is written against this trait
/// so tests can substitute a recording or in-process implementation.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Creates a ticket plus its first message. Fails with `Transport`, `Remote`, or `Decode`.
    async fn create_ticket(
        &self,
        user: &User,
        initial_text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        attachments: &[Attachment],
    ) -> Result<Ticket>;

    /// Appends one message to an existing ticket. A missing ticket surfaces as `Remote { status: 404 }`.
    #[allow(clippy::too_many_arguments)]
    async fn append_message(
        &self,
        ticket_id: Uuid,
        author: &User,
        text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        is_staff: bool,
        attachments: &[Attachment],
    ) -> Result<TicketMessage>;

    /// Marks the ticket closed. Idempotent: closing twice never errors.
    async fn close_ticket(&self, ticket_id: Uuid, closed_by: i64) -> Result<Ticket>;

    /// Read-through fetch of a ticket with its messages; no local cache.
    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketWithMessages>;
}

/// REST client for the ticket API. One shared connection pool, bearer auth, bounded timeout.
#[derive(Debug, Clone)]
pub struct TicketApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TicketApiClient {
    /// Builds a client for the given API base URL and auth token.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SupportError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| SupportError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.token)
            .send()
            .await
            .map_err(|e| SupportError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Ticket API rejected request");
            return Err(SupportError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SupportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TicketStore for TicketApiClient {
    async fn create_ticket(
        &self,
        user: &User,
        initial_text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        attachments: &[Attachment],
    ) -> Result<Ticket> {
        let ticket_req = CreateTicketRequest::open_for(user);
        let ticket: Ticket = self.post_json("ticket/add", &ticket_req).await?;
        info!(ticket_id = %ticket.id, user_id = user.id, "Created ticket");

        let message_req = CreateMessageRequest::new(
            ticket.id,
            user.id,
            initial_text,
            origin_chat_id,
            origin_msg_id,
            false,
            attachments,
        );
        let _: TicketMessage = self
            .post_json(&format!("ticket/{}/messages/add", ticket.id), &message_req)
            .await?;

        Ok(ticket)
    }

    async fn append_message(
        &self,
        ticket_id: Uuid,
        author: &User,
        text: &str,
        origin_chat_id: &str,
        origin_msg_id: &str,
        is_staff: bool,
        attachments: &[Attachment],
    ) -> Result<TicketMessage> {
        let message_req = CreateMessageRequest::new(
            ticket_id,
            author.id,
            text,
            origin_chat_id,
            origin_msg_id,
            is_staff,
            attachments,
        );
        let message: TicketMessage = self
            .post_json(&format!("ticket/{}/messages/add", ticket_id), &message_req)
            .await?;
        info!(ticket_id = %ticket_id, is_staff = is_staff, "Appended message to ticket");
        Ok(message)
    }

    async fn close_ticket(&self, ticket_id: Uuid, closed_by: i64) -> Result<Ticket> {
        // The remote API has no close endpoint; closing is a tagged system message.
        let close_req = CreateMessageRequest::new(
            ticket_id,
            closed_by,
            &format!("[system] ticket closed by {}", closed_by),
            "",
            "",
            true,
            &[],
        );
        let _: TicketMessage = self
            .post_json(&format!("ticket/{}/messages/add", ticket_id), &close_req)
            .await?;
        info!(ticket_id = %ticket_id, closed_by = closed_by, "Closed ticket");

        let fetched = self.get_ticket(ticket_id).await?;
        Ok(Ticket {
            status: TicketStatus::Closed,
            updated_at: Some(chrono::Utc::now()),
            ..fetched.ticket
        })
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketWithMessages> {
        self.get_json(&format!("ticket/{}", ticket_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client =
            TicketApiClient::new("http://api.local/", "tok", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/ticket/add"), "http://api.local/ticket/add");
        assert_eq!(client.url("ticket/add"), "http://api.local/ticket/add");
    }
}
