//! Dialog state machine.
//!
//! Consumes decoded user-turn payloads, fills the two required slots
//! (repository URL and tag), resolves missing slots from the memory store
//! behind a confirmation round-trip, and drives the status backend call
//! once both slots are present. Replies are emitted as wire frames through
//! an outbound channel drained by the connection's writer task.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::clients::status::StatusReport;
use crate::clients::{MemoryStore, StatusBackend};
use crate::dialog::extract::{self, SlotPatterns};
use crate::dialog::prompts;
use crate::dialog::session::{DialogSession, DialogState};
use crate::protocol::frame::Frame;
use crate::protocol::message::{InboundMessage, ReplyMessage};
use crate::{AppError, Result};

/// Memory store key for the repository URL slot.
pub const KEY_REPO_URL: &str = "repoUrl";
/// Memory store key for the tag slot.
pub const KEY_TAG: &str = "tag";

/// Slot-filling state machine, one instance per channel.
///
/// Sessions are held in an explicit per-`dialog_id` map and are mutated
/// only through [`DialogEngine::handle_user_turn`]; there is exactly one
/// mutator of session state per channel, so no locking is needed.
#[derive(Debug)]
pub struct DialogEngine<M, S> {
    memory: M,
    status: S,
    patterns: SlotPatterns,
    sessions: HashMap<String, DialogSession>,
    replies: mpsc::Sender<Frame>,
    persist_slots: bool,
}

impl<M: MemoryStore, S: StatusBackend> DialogEngine<M, S> {
    /// Build an engine with freshly compiled slot patterns.
    ///
    /// When `persist_slots` is set, both slots are saved to the memory
    /// store before every status query; the shipped default is off.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if a slot pattern fails to compile.
    pub fn new(
        memory: M,
        status: S,
        replies: mpsc::Sender<Frame>,
        persist_slots: bool,
    ) -> Result<Self> {
        Ok(Self {
            memory,
            status,
            patterns: SlotPatterns::compile()?,
            sessions: HashMap::new(),
            replies,
            persist_slots,
        })
    }

    /// Inspect the session for a dialog, if one exists yet.
    #[must_use]
    pub fn session(&self, dialog_id: &str) -> Option<&DialogSession> {
        self.sessions.get(dialog_id)
    }

    fn session_mut(&mut self, dialog_id: &str) -> &mut DialogSession {
        self.sessions.entry(dialog_id.to_owned()).or_default()
    }

    /// Process one user turn to completion, including any awaited
    /// collaborator calls, before the channel hands over the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Channel`] if a reply cannot be queued (the
    /// writer task is gone). Collaborator failures are absorbed into
    /// user-visible replies and never propagate.
    pub async fn handle_user_turn(&mut self, turn: &InboundMessage) -> Result<()> {
        let dialog_id = turn.dialog_id.clone();
        let user_id = turn.user_id.clone();
        let content = turn.messages.content.clone();
        debug!(%dialog_id, %user_id, "handling user turn");

        // Exit keyword overrides everything, including confirmation state.
        if extract::is_exit_request(&content) {
            info!(%dialog_id, "user exited the flow");
            self.session_mut(&dialog_id).clear();
            return self
                .send(ReplyMessage::flow_exited(
                    &dialog_id,
                    &user_id,
                    prompts::EXIT_ACK.to_owned(),
                ))
                .await;
        }

        if self.session_mut(&dialog_id).state == DialogState::AwaitingConfirmation {
            return self.handle_confirmation(&dialog_id, &user_id, &content).await;
        }

        // Fresh extraction: a successful match overwrites the slot, a failed
        // one leaves whatever the session already holds.
        let extracted = self.patterns.extract(&content);
        {
            let session = self.session_mut(&dialog_id);
            if let Some(url) = extracted.repo_url {
                session.repo_url = Some(url);
            }
            if let Some(tag) = extracted.tag {
                session.tag = Some(tag);
            }
        }

        if extract::refers_to_previous(&content) {
            return self.handle_recall(&dialog_id, &user_id).await;
        }

        let (repo_url, tag) = {
            let session = self.session_mut(&dialog_id);
            (session.repo_url.clone(), session.tag.clone())
        };
        match (repo_url, tag) {
            (Some(repo_url), Some(tag)) => {
                // Freshly-typed values need no confirmation round-trip.
                self.run_query(&dialog_id, &user_id, &repo_url, &tag).await
            }
            (Some(_), None) => {
                self.send(ReplyMessage::reply(
                    &dialog_id,
                    &user_id,
                    prompts::ASK_TAG.to_owned(),
                ))
                .await
            }
            (None, Some(_)) => {
                self.send(ReplyMessage::reply(
                    &dialog_id,
                    &user_id,
                    prompts::ASK_REPO_URL.to_owned(),
                ))
                .await
            }
            (None, None) => {
                self.send(ReplyMessage::reply(
                    &dialog_id,
                    &user_id,
                    prompts::ASK_BOTH.to_owned(),
                ))
                .await
            }
        }
    }

    /// Interpret a reply while staged values await confirmation.
    ///
    /// Confirmed only when a confirm keyword matches and no deny keyword
    /// does; denial, ambiguity, and unrelated text all discard the staged
    /// values and re-prompt. Either branch returns the session to idle.
    async fn handle_confirmation(
        &mut self,
        dialog_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<()> {
        let (pending_repo_url, pending_tag) = self.session_mut(dialog_id).take_pending();

        if extract::is_confirmed(content) {
            if let (Some(repo_url), Some(tag)) = (pending_repo_url, pending_tag) {
                info!(%dialog_id, "staged values confirmed");
                let session = self.session_mut(dialog_id);
                session.repo_url = Some(repo_url.clone());
                session.tag = Some(tag.clone());
                return self.run_query(dialog_id, user_id, &repo_url, &tag).await;
            }
        }

        debug!(%dialog_id, "staged values not confirmed");
        self.session_mut(dialog_id).clear_slots();
        self.send(ReplyMessage::reply(
            dialog_id,
            user_id,
            prompts::RESUPPLY_AFTER_DENIAL.to_owned(),
        ))
        .await
    }

    /// Resolve still-missing slots from the memory store, then stage the
    /// result for confirmation.
    ///
    /// Memory-sourced values are never acted upon silently: the user must
    /// re-affirm them, guarding against stale or wrong history.
    async fn handle_recall(&mut self, dialog_id: &str, user_id: &str) -> Result<()> {
        if self.session_mut(dialog_id).repo_url.is_none() {
            if let Some(value) = self.memory.query(KEY_REPO_URL, user_id).await {
                self.session_mut(dialog_id).repo_url = Some(value);
            }
        }
        if self.session_mut(dialog_id).tag.is_none() {
            if let Some(value) = self.memory.query(KEY_TAG, user_id).await {
                self.session_mut(dialog_id).tag = Some(value);
            }
        }

        let (repo_url, tag) = {
            let session = self.session_mut(dialog_id);
            (session.repo_url.clone(), session.tag.clone())
        };
        if let (Some(repo_url), Some(tag)) = (repo_url, tag) {
            self.session_mut(dialog_id).stage(repo_url.clone(), tag.clone());
            self.send(ReplyMessage::reply(
                dialog_id,
                user_id,
                prompts::confirm_values(&repo_url, &tag),
            ))
            .await
        } else {
            self.send(ReplyMessage::reply(
                dialog_id,
                user_id,
                prompts::NO_HISTORY.to_owned(),
            ))
            .await
        }
    }

    /// Run the status query for a completed slot set.
    ///
    /// Sends the interim reply first, then a final reply for whichever of
    /// the three outcomes occurred; the session's active slots are cleared
    /// afterwards regardless of outcome.
    async fn run_query(
        &mut self,
        dialog_id: &str,
        user_id: &str,
        repo_url: &str,
        tag: &str,
    ) -> Result<()> {
        self.send(ReplyMessage::reply(
            dialog_id,
            user_id,
            prompts::QUERY_STARTED.to_owned(),
        ))
        .await?;

        if self.persist_slots {
            self.memory.save(KEY_REPO_URL, repo_url, user_id).await;
            self.memory.save(KEY_TAG, tag, user_id).await;
        }

        let content = match self.status.fetch(repo_url, tag).await {
            Ok(StatusReport::Success(info)) => {
                info!(%dialog_id, repo_url, tag, "status query succeeded");
                prompts::query_success(repo_url, tag, &info)
            }
            Ok(StatusReport::Failed(result)) => {
                info!(%dialog_id, repo_url, tag, %result, "status query reported failure");
                prompts::query_failed(repo_url, tag, &result)
            }
            Err(AppError::Status(msg)) => {
                info!(%dialog_id, repo_url, tag, error = %msg, "status query errored");
                prompts::query_errored(repo_url, tag, &msg)
            }
            Err(err) => {
                info!(%dialog_id, repo_url, tag, error = %err, "status query errored");
                prompts::query_errored(repo_url, tag, &err.to_string())
            }
        };
        self.send(ReplyMessage::final_reply(dialog_id, user_id, content))
            .await?;

        self.session_mut(dialog_id).clear_slots();
        Ok(())
    }

    async fn send(&self, reply: ReplyMessage) -> Result<()> {
        let frame = reply.into_frame()?;
        self.replies
            .send(frame)
            .await
            .map_err(|_| AppError::Channel("reply channel closed".to_owned()))
    }
}
