//! Task execution: one handler per payload kind.
//!
//! Mail delivery is best effort throughout — a failed send is logged and
//! counted, never propagated to the task outcome, and a failure for one
//! recipient does not abort delivery to the rest.

use askama::Template;
use tracing::{error, info, warn};

use newsroom_core::config::Settings;
use newsroom_core::storage::Storage;
use newsroom_core::tasks::TaskPayload;
use newsroom_core::{NewsroomError, Result};

use crate::digest;
use crate::mail::{strip_tags, EmailMessage, Mailer};
use crate::observability::metrics::{increment, MetricName};
use crate::templates::{NewPostEmail, WelcomeEmail};

pub async fn execute(
    storage: &dyn Storage,
    mailer: &dyn Mailer,
    settings: &Settings,
    payload: TaskPayload,
) -> Result<()> {
    match payload {
        TaskPayload::SendWelcomeEmail { username, email } => {
            send_welcome_email(mailer, settings, &username, &email).await
        }
        TaskPayload::NotifyCategorySubscribers {
            post_id,
            category_id,
        } => notify_category_subscribers(storage, mailer, settings, post_id, category_id).await,
        TaskPayload::SendWeeklyDigest => {
            digest::run_digest(storage, mailer, settings).await.map(|_| ())
        }
    }
}

/// Deliver a message, logging the outcome either way. Returns whether the
/// send succeeded so fan-out handlers can count deliveries.
pub(crate) async fn deliver(mailer: &dyn Mailer, message: &EmailMessage) -> bool {
    match mailer.send(message).await {
        Ok(()) => {
            increment(MetricName::EmailsSent);
            info!(subject = %message.subject, to = ?message.to, "Email sent");
            true
        }
        Err(e) => {
            increment(MetricName::EmailsFailed);
            error!(subject = %message.subject, to = ?message.to, error = %e, "Failed to send email");
            false
        }
    }
}

async fn send_welcome_email(
    mailer: &dyn Mailer,
    settings: &Settings,
    username: &str,
    email: &str,
) -> Result<()> {
    info!("Sending welcome email to {email}");
    let html = WelcomeEmail { username }
        .render()
        .map_err(|e| NewsroomError::Mail(format!("failed to render welcome email: {e}")))?;

    let message = EmailMessage::new(
        "Welcome to Newsroom!",
        strip_tags(&html),
        settings.mail.from_email.clone(),
        vec![email.to_string()],
    )
    .with_html(html);

    deliver(mailer, &message).await;
    Ok(())
}

/// Fan-out for one post/category pair: one templated email per subscriber.
/// A vanished post or category is logged and swallowed, matching the
/// best-effort contract of the queue.
async fn notify_category_subscribers(
    storage: &dyn Storage,
    mailer: &dyn Mailer,
    settings: &Settings,
    post_id: uuid::Uuid,
    category_id: uuid::Uuid,
) -> Result<()> {
    let Some(post) = storage.get_post(post_id).await? else {
        error!(%post_id, "Post not found for subscriber notification");
        return Ok(());
    };
    let Some(category) = storage.get_category_by_id(category_id).await? else {
        error!(%category_id, "Category not found for subscriber notification");
        return Ok(());
    };

    let subscribers = storage.category_subscribers(category.id).await?;
    if subscribers.is_empty() {
        warn!(category = %category.name, "Category has no subscribers");
        return Ok(());
    }

    let subject = format!("New post in category '{}'", category.name);
    let preview = post.preview();
    let post_url = format!("{}/news/{}", settings.site_url, post.id);

    let mut delivered = 0usize;
    for subscriber in &subscribers {
        let html = NewPostEmail {
            username: &subscriber.username,
            post_title: &post.title,
            preview: &preview,
            category_name: &category.name,
            post_url: &post_url,
        }
        .render()
        .map_err(|e| NewsroomError::Mail(format!("failed to render notification: {e}")))?;

        let message = EmailMessage::new(
            subject.clone(),
            strip_tags(&html),
            settings.mail.from_email.clone(),
            vec![subscriber.email.clone()],
        )
        .with_html(html);

        if deliver(mailer, &message).await {
            delivered += 1;
            increment(MetricName::NotificationsDelivered);
        }
    }

    info!(
        post = %post.title,
        category = %category.name,
        delivered,
        total = subscribers.len(),
        "Subscriber notification fan-out finished"
    );
    Ok(())
}
