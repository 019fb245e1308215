//! Weekly digest: for every category with posts in the trailing seven
//! days, mail each subscriber a summary.
//!
//! The window is computed from the current time on every run — there is no
//! watermark, so a missed scheduled run loses that window's coverage
//! rather than catching up (see DESIGN.md).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use askama::Template;
use chrono::{Duration, Utc};
use tracing::{error, info};

use newsroom_core::config::Settings;
use newsroom_core::storage::Storage;
use newsroom_core::{NewsroomError, Result};

use crate::mail::{strip_tags, EmailMessage, Mailer};
use crate::observability::metrics::{increment, MetricName};
use crate::tasks::handlers::deliver;
use crate::templates::{DigestPost, WeeklyDigestEmail};

/// Trailing window covered by one digest.
pub const DIGEST_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DigestReport {
    /// Categories that had recent posts and were mailed out.
    pub categories: usize,
    pub emails_sent: usize,
}

/// Run the digest once, now.
pub async fn run_digest(
    storage: &dyn Storage,
    mailer: &dyn Mailer,
    settings: &Settings,
) -> Result<DigestReport> {
    let since = Utc::now() - Duration::days(DIGEST_WINDOW_DAYS);
    let mut report = DigestReport::default();

    for category in storage.list_categories().await? {
        let posts = storage.posts_in_category_since(category.id, since).await?;
        if posts.is_empty() {
            continue;
        }
        report.categories += 1;

        let digest_posts: Vec<DigestPost> = posts
            .iter()
            .map(|post| DigestPost {
                title: post.title.clone(),
                preview: post.preview(),
                url: format!("{}/news/{}", settings.site_url, post.id),
            })
            .collect();

        let html = WeeklyDigestEmail {
            category_name: &category.name,
            posts: &digest_posts,
        }
        .render()
        .map_err(|e| NewsroomError::Mail(format!("failed to render digest: {e}")))?;
        let body = strip_tags(&html);
        let subject = format!("New posts this week in {}", category.name);

        for subscriber in storage.category_subscribers(category.id).await? {
            let message = EmailMessage::new(
                subject.clone(),
                body.clone(),
                settings.mail.from_email.clone(),
                vec![subscriber.email.clone()],
            )
            .with_html(html.clone());

            if deliver(mailer, &message).await {
                report.emails_sent += 1;
            }
        }
    }

    increment(MetricName::DigestRuns);
    info!(
        categories = report.categories,
        emails = report.emails_sent,
        "Weekly digest run finished"
    );
    Ok(report)
}

/// Periodic digest trigger. The first tick is consumed immediately so a
/// fresh worker does not mail everyone on startup.
pub async fn run_scheduler(
    storage: Arc<dyn Storage>,
    mailer: Arc<dyn Mailer>,
    settings: Arc<Settings>,
) -> Result<()> {
    let period = StdDuration::from_secs(settings.digest_period_days.max(1) * 24 * 60 * 60);
    info!(period_days = settings.digest_period_days, "Digest scheduler started");

    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = run_digest(storage.as_ref(), mailer.as_ref(), &settings).await {
            error!(error = %e, "Digest run failed");
        }
    }
}
