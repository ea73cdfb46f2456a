pub mod chat;
pub mod collaboration;
pub mod declined;
pub mod evaluation;
pub mod feedback;
pub mod notification;
pub mod requests;
pub mod stats;
pub mod user;
