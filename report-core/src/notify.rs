//! Dispatch to the organization a report was routed to.
//!
//! [`WebhookNotifier`] posts an email-shaped JSON message (recipient, subject,
//! body plus the structured report fields) to a relay endpoint; [`LogNotifier`]
//! only records the dispatch.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::errors::NotifyError;
use crate::fingerprint::short;
use crate::model::{Report, Urgency};
use crate::routing::Organization;

/// Bound on one webhook delivery.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tells `org` that `report` is now theirs. Errors are logged by the caller.
    async fn report_routed(&self, report: &Report, org: &Organization) -> Result<(), NotifyError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Records dispatches in the log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn report_routed(&self, report: &Report, org: &Organization) -> Result<(), NotifyError> {
        info!(
            report_id = %report.id,
            fingerprint = short(&report.fingerprint),
            organization = %org.name,
            contact = org.contact_email.as_deref().unwrap_or("-"),
            category = %report.category,
            urgency = %report.urgency,
            "routing notification dispatched"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Message posted to the webhook.
#[derive(Debug, Serialize)]
pub struct RoutingMessage<'a> {
    pub to: Option<&'a str>,
    pub organization: &'a str,
    pub subject: String,
    pub body: String,
    pub report_id: &'a str,
    pub category: &'a str,
    pub urgency: Urgency,
    pub locations: &'a [String],
}

impl<'a> RoutingMessage<'a> {
    pub fn new(report: &'a Report, org: &'a Organization) -> Self {
        let subject = format!(
            "[{}] New {} report routed to {}",
            report.urgency.as_str().to_uppercase(),
            report.category,
            org.name
        );
        let mut body = format!(
            "Report {} has been routed to {}.\n\nTitle: {}\nDescription: {}\nCategory: {}\nUrgency: {}",
            report.id, org.name, report.title, report.description, report.category, report.urgency
        );
        if !report.entities.locations.is_empty() {
            body.push_str(&format!("\nLocations: {}", report.entities.locations.join(", ")));
        }
        Self {
            to: org.contact_email.as_deref(),
            organization: &org.name,
            subject,
            body,
            report_id: &report.id,
            category: &report.category,
            urgency: report.urgency,
            locations: &report.entities.locations,
        }
    }
}

/// Posts routing messages to an HTTP relay (mail gateway, chat hook, ...).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// # Errors
    /// - [`NotifyError::InvalidEndpoint`] if `url` is not http(s)
    /// - [`NotifyError::Transport`] if the HTTP client cannot be built
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NotifyError::InvalidEndpoint(url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip_all, fields(report_id = %report.id, organization = %org.name))]
    async fn report_routed(&self, report: &Report, org: &Organization) -> Result<(), NotifyError> {
        let message = RoutingMessage::new(report, org);
        debug!(to = message.to.unwrap_or("-"), "POST {}", self.url);

        let resp = self.client.post(&self.url).json(&message).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            error!(%status, %snippet, "routing webhook rejected the notification");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                snippet,
            });
        }

        info!(%status, "routing notification delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
