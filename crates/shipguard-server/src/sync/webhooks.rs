//! Webhook validator
//!
//! Reconciles the remote webhook registry against the merchant's expected
//! set with upsert semantics: missing topics are registered, topics
//! pointing at a stale callback URL are repointed, everything else is
//! left alone.

use shipguard_common::types::{
    split_setting_list, SETTING_WEBHOOK_CALLBACK_URL, SETTING_WEBHOOK_TOPICS,
};
use shipguard_common::SyncResult;
use tracing::{info, warn};

use super::SyncContext;
use crate::remote::RemoteWebhook;

/// Topics registered when the merchant never configured a set.
const DEFAULT_TOPICS: &[&str] = &["order.create", "order.update", "order.cancelled"];

pub async fn upsert_webhooks(ctx: &SyncContext) -> SyncResult<()> {
    let Some(callback_url) = ctx.store.get_setting(SETTING_WEBHOOK_CALLBACK_URL).await? else {
        info!("no webhook callback URL configured, validator pass skipped");
        return Ok(());
    };

    let topics = ctx
        .store
        .get_setting(SETTING_WEBHOOK_TOPICS)
        .await?
        .map(|raw| split_setting_list(&raw))
        .filter(|topics| !topics.is_empty())
        .unwrap_or_else(|| DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect());

    let response = ctx.client.get_webhooks().await?;
    if response.status != 200 {
        warn!(status = response.status, "webhook registry unavailable");
        return Ok(());
    }

    let registered: Vec<RemoteWebhook> =
        serde_json::from_value(response.body.clone()).unwrap_or_default();

    for topic in &topics {
        match registered.iter().find(|w| &w.topic == topic) {
            None => {
                let response = ctx.client.create_webhook(topic, &callback_url).await?;
                if response.status == 201 || response.status == 409 {
                    info!(topic = %topic, "webhook registered");
                } else {
                    warn!(topic = %topic, status = response.status, "webhook create rejected");
                }
            }
            Some(webhook) if webhook.url != callback_url => {
                let response = ctx
                    .client
                    .update_webhook(&webhook.id, topic, &callback_url)
                    .await?;
                if response.status == 200 {
                    info!(topic = %topic, "webhook repointed");
                } else {
                    warn!(topic = %topic, status = response.status, "webhook update rejected");
                }
            }
            Some(_) => {}
        }
    }

    Ok(())
}
