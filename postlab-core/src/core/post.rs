use serde::{Deserialize, Serialize};
use std::fmt;

/// One post as returned by the posts API or read back from the local store.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    id: i32,
    title: String,
    body: String,
}

impl Post {
    pub fn new(id: i32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Post #{}\nTitle: {}\nBody: {}", self.id, self.title, self.body)
    }
}

/// Payload sent when creating a post. Serializes as `{"title", "body", "userId"}`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i32,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: i32) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}
