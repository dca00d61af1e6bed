// Mirrors the DDL in `create_posts_table`.

diesel::table! {
    posts (id) {
        id -> Integer,
        title -> Nullable<Text>,
        body -> Nullable<Text>,
    }
}
