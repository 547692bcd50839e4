//! Ingestion pipeline: authenticate, resolve, classify, persist, notify.
//!
//! A single-shot sequence per inbound event. There is no rollback: a
//! failure leaves earlier side effects in place, and only a persistence
//! failure propagates as an error (the handler's HTTP 500).

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::classify::Analyzer;
use crate::model::{InboundTweet, Post};
use crate::notify::{format_notification_with_buttons, Notifier};
use crate::store::{PostStore, ProjectDirectory};

/// Terminal outcome of one ingestion. Persistence failure is not a
/// variant; it propagates as the pipeline's only `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted { post_id: String },
    RejectedAuth,
    NoProject,
}

pub struct Pipeline {
    projects: Arc<dyn ProjectDirectory>,
    posts: Arc<dyn PostStore>,
    analyzer: Analyzer,
    notifier: Arc<dyn Notifier>,
    /// Expected shared secret. `None` disables the check: auth passes iff
    /// supplied equals expected, including both-absent.
    webhook_secret: Option<String>,
}

impl Pipeline {
    pub fn new(
        projects: Arc<dyn ProjectDirectory>,
        posts: Arc<dyn PostStore>,
        analyzer: Analyzer,
        notifier: Arc<dyn Notifier>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            projects,
            posts,
            analyzer,
            notifier,
            webhook_secret,
        }
    }

    /// Run the five stages for one inbound event.
    pub async fn ingest(
        &self,
        supplied_secret: Option<&str>,
        event: InboundTweet,
    ) -> Result<IngestOutcome> {
        // Stage 1: shared-secret check. No side effects on mismatch.
        if supplied_secret != self.webhook_secret.as_deref() {
            warn!("webhook rejected: invalid shared secret");
            return Ok(IngestOutcome::RejectedAuth);
        }

        let preview: String = event.text.chars().take(50).collect();
        info!(text = %preview, "received new tweet");

        // Stage 2: explicit project id wins over handle-based routing.
        let project = match &event.project_id {
            Some(id) => self.projects.find_by_id(id).await?,
            None => match event.screen_name() {
                Some(handle) => self.projects.find_by_handle(handle).await?,
                None => None,
            },
        };
        let Some(project) = project else {
            warn!(
                handle = event.screen_name().unwrap_or("none"),
                "no matching project for inbound tweet"
            );
            return Ok(IngestOutcome::NoProject);
        };

        // Stage 3: classification cannot fail the pipeline; the analyzer
        // degrades to its neutral fallback internally.
        let analysis = self
            .analyzer
            .classify(&event.text, &project.token_symbol)
            .await;

        // Stage 4: persist. The only stage allowed to error out.
        let mut post = Post {
            id: None,
            tweet_id: event.external_id().unwrap_or_default(),
            project_id: project.id.clone(),
            twitter_username: event.screen_name().unwrap_or_default().to_string(),
            token_symbol: project.token_symbol.clone(),
            text: event.text.clone(),
            created_at: Utc::now(),
            analysis: Some(analysis.clone()),
        };
        let post_id = self.posts.insert(post.clone()).await?;
        post.id = Some(post_id.clone());
        info!(post_id = %post_id, "tweet persisted");

        // Stage 5: conditional alert. Delivery failure is logged and does
        // not change the recorded outcome.
        if analysis.impact_level.triggers_notification() {
            let (message, buttons) = format_notification_with_buttons(&post, None);
            let delivered = self.notifier.send(&message, Some(&buttons)).await;
            if delivered {
                info!(impact = %analysis.impact_level, "alert dispatched");
            } else {
                warn!(impact = %analysis.impact_level, "alert dispatch failed");
            }
        }

        Ok(IngestOutcome::Accepted { post_id })
    }
}
