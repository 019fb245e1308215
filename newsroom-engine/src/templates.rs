//! Askama templates for outgoing email bodies.

use askama::Template;

#[derive(Template)]
#[template(path = "email/welcome.html")]
pub struct WelcomeEmail<'a> {
    pub username: &'a str,
}

#[derive(Template)]
#[template(path = "email/new_post.html")]
pub struct NewPostEmail<'a> {
    pub username: &'a str,
    pub post_title: &'a str,
    pub preview: &'a str,
    pub category_name: &'a str,
    pub post_url: &'a str,
}

pub struct DigestPost {
    pub title: String,
    pub preview: String,
    pub url: String,
}

#[derive(Template)]
#[template(path = "email/weekly_digest.html")]
pub struct WeeklyDigestEmail<'a> {
    pub category_name: &'a str,
    pub posts: &'a [DigestPost],
}
