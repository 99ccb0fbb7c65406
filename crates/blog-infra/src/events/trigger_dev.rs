//! trigger.dev task client and the event bus built on it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use blog_core::domain::DomainEvent;
use blog_core::ports::{DispatchError, EventBus};

const GENERATE_POST_AUDIO: &str = "generate-post-audio";

#[derive(Debug, Clone)]
pub struct TriggerDevConfig {
    pub secret_key: String,
    pub base_url: String,
}

impl TriggerDevConfig {
    /// `None` when `TRIGGER_SECRET_KEY` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("TRIGGER_SECRET_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        Some(Self {
            secret_key,
            base_url: std::env::var("TRIGGER_BASE_URL")
                .unwrap_or_else(|_| "https://api.trigger.dev".to_string()),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioPayload<'a> {
    post_id: &'a str,
}

#[derive(Serialize)]
struct TriggerRequest<T> {
    payload: T,
}

/// Acknowledgement returned when a task run is queued.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP client for the trigger.dev task API.
#[derive(Clone)]
pub struct TriggerDevClient {
    http_client: Client,
    config: TriggerDevConfig,
}

impl TriggerDevClient {
    pub fn new(config: TriggerDevConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }

    async fn trigger<T: Serialize + Sync>(
        &self,
        task: &str,
        payload: T,
    ) -> Result<TriggerResponse, DispatchError> {
        let url = format!("{}/api/v1/tasks/{task}/trigger", self.config.base_url);
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.config.secret_key)
            .json(&TriggerRequest { payload })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(task, error = %e, "Trigger request failed");
                DispatchError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(task, status = %status, error = %body, "Trigger request rejected");
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TriggerResponse>()
            .await
            .map_err(|e| DispatchError::Decode(e.to_string()))
    }

    /// Queue audio generation for one post.
    pub async fn trigger_post_audio(&self, post_id: &str) -> Result<TriggerResponse, DispatchError> {
        let ack = self
            .trigger(GENERATE_POST_AUDIO, AudioPayload { post_id })
            .await?;
        tracing::info!(
            post_id = %post_id,
            run_id = ack.id.as_deref().unwrap_or_default(),
            "Post audio generation triggered"
        );
        Ok(ack)
    }
}

/// Routes post events to trigger.dev tasks.
pub struct TriggerDevEventBus {
    client: TriggerDevClient,
}

impl TriggerDevEventBus {
    pub fn new(client: TriggerDevClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventBus for TriggerDevEventBus {
    async fn process_events(&self, events: &[DomainEvent]) -> Result<(), DispatchError> {
        for event in events {
            match event {
                DomainEvent::PostUpdated { post_id } => {
                    self.client.trigger_post_audio(post_id).await?;
                }
                DomainEvent::PostCreated { .. } => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TRIGGER_PATH: &str = "/api/v1/tasks/generate-post-audio/trigger";

    fn bus(server: &MockServer) -> TriggerDevEventBus {
        TriggerDevEventBus::new(TriggerDevClient::new(TriggerDevConfig {
            secret_key: "tr_dev_secret".to_string(),
            base_url: server.uri(),
        }))
    }

    fn updated(id: &str) -> DomainEvent {
        DomainEvent::PostUpdated {
            post_id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_post_updated_triggers_audio_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TRIGGER_PATH))
            .and(header("Authorization", "Bearer tr_dev_secret"))
            .and(body_json(json!({ "payload": { "postId": "p1" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1" })))
            .expect(1)
            .mount(&server)
            .await;

        bus(&server).process_events(&[updated("p1")]).await.unwrap();
    }

    #[tokio::test]
    async fn test_post_created_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        bus(&server)
            .process_events(&[DomainEvent::PostCreated {
                post_id: "p1".to_string(),
            }])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_status_stops_processing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let result = bus(&server)
            .process_events(&[updated("p1"), updated("p2")])
            .await;

        match result {
            Err(DispatchError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_ack_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = bus(&server).process_events(&[updated("p1")]).await;
        assert!(matches!(result, Err(DispatchError::Decode(_))));
    }
}
