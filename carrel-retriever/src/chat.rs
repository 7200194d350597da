//! Retrieval-augmented chat flow.
//!
//! [`ChatEngine::reply`] stitches the pieces together for one chat turn:
//! replay the workspace's persisted history, run retrieval for the incoming
//! message, hand everything to the chat-completion service, and persist the
//! new user/assistant pair. The system preamble and the retrieval-context
//! message are rebuilt every turn and never persisted.
//!
//! Retrieval runs on every turn whether or not the workspace has documents;
//! an un-indexed workspace simply contributes no context message, and the
//! chat still succeeds without document grounding. A completion failure, on
//! the other hand, propagates as an error; it is never disguised as a reply,
//! so callers can tell "no answer" from "service down".

use crate::retrieval::Retriever;
use crate::retrieval::retriever::DEFAULT_TOP_K;
use crate::storage::{ChatMessage, WorkspaceStore};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// System preamble sent (but never persisted) at the start of every turn.
pub const SYSTEM_PROMPT: &str = "You are a professional assistant for a user's \
private document workspaces. Answer questions using the supplied document \
excerpts when they are relevant, and say so plainly when they are not. Never \
invent file contents. Keep answers concise unless detail is required.";

/// Trait for the chat-completion service.
///
/// The completion call is opaque to this crate: messages in, reply text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate the assistant's reply for the given conversation.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Default model requested from the completion service.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
        }
    }

    /// Set the model name (builder style).
    pub fn with_model<S: Into<String>>(self, model: S) -> Self {
        Self {
            model: model.into(),
            ..self
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("completion service returned {status}: {body}");
        }

        let body: CompletionResponse = response.json().await?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("completion service returned no choices"))?;
        Ok(choice.message.content.trim().to_string())
    }
}

/// Drives one retrieval-augmented chat conversation per workspace.
pub struct ChatEngine {
    store: WorkspaceStore,
    retriever: Retriever,
    completion: Arc<dyn CompletionClient>,
    top_k: usize,
}

impl ChatEngine {
    pub fn new(
        store: WorkspaceStore,
        retriever: Retriever,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            store,
            retriever,
            completion,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many passages to retrieve per turn (builder style).
    pub fn with_top_k(self, top_k: usize) -> Self {
        Self { top_k, ..self }
    }

    /// Run one chat turn against the workspace and return the assistant's
    /// reply.
    ///
    /// History is persisted only after a successful completion, so a failed
    /// turn leaves the conversation exactly where it was.
    pub async fn reply(&self, workspace: &str, user_message: &str) -> Result<String> {
        let history = self.store.load_history(workspace).await?;

        // Retrieval is an enhancement: any failure here degrades to an
        // ungrounded chat turn rather than blocking the reply.
        let passages = match self
            .retriever
            .retrieve(workspace, user_message, self.top_k)
            .await
        {
            Ok(passages) => passages,
            Err(err) => {
                warn!(workspace, error = %err, "retrieval failed; answering ungrounded");
                Vec::new()
            }
        };

        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(history);
        if !passages.is_empty() {
            debug!(workspace, passages = passages.len(), "augmenting with retrieved context");
            messages.push(ChatMessage::system(format!(
                "Relevant excerpts from the workspace documents:\n\n{}",
                passages.join("\n\n")
            )));
        }
        messages.push(ChatMessage::user(user_message));

        let reply = self.completion.complete(&messages).await?;

        // The pair lands in one atomic write: no dangling user message if the
        // process dies mid-turn.
        self.store
            .append_turn(workspace, user_message, &reply)
            .await?;

        Ok(reply)
    }
}
