// export all modules
pub mod post;
pub mod storage;
pub mod database;
pub mod request;
pub mod app;
