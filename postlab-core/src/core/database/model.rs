use diesel::prelude::*;

use crate::core::database::schema::posts;
use crate::core::post::Post;

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PostRow {
    pub id: i32,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        PostRow {
            id: post.id(),
            title: Some(post.title().to_string()),
            body: Some(post.body().to_string()),
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post::new(row.id, row.title.unwrap_or_default(), row.body.unwrap_or_default())
    }
}

#[derive(QueryableByName, Debug)]
pub struct UserVersion {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub user_version: i32,
}
