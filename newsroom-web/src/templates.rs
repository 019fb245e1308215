use askama::Template;

use crate::filters;
use crate::models::{CategoryRow, CommentView, PostDetailView, PostView, UserView};

#[derive(Template)]
#[template(path = "news_list.html")]
pub struct NewsListTemplate {
    pub posts: Vec<PostView>,
    pub page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "news_detail.html")]
pub struct NewsDetailTemplate {
    pub post: PostDetailView,
    pub comments: Vec<CommentView>,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "news_search.html")]
pub struct SearchTemplate {
    pub posts: Vec<PostView>,
    pub q: String,
    pub author: String,
    pub date: String,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub kind: String,
    pub title_value: String,
    pub content_value: String,
    pub categories_value: String,
    pub error: Option<String>,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub username: String,
    pub email: String,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub username: String,
    pub bio: String,
    pub location: String,
    pub birth_date: String,
    pub is_author: bool,
    pub error: Option<String>,
    pub user: Option<UserView>,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub categories: Vec<CategoryRow>,
    pub notice: Option<String>,
    pub user: Option<UserView>,
}
