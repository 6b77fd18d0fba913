pub mod activity_log;
pub mod attachment;
pub mod board;
pub mod checklist;
pub mod comment;
pub mod custom_field;
pub mod label;
pub mod notification;
pub mod organization;
pub mod project;
pub mod task;
pub mod time_entry;
pub mod user;
