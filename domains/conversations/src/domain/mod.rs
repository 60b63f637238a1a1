//! Domain model for conversations and messages

pub mod entities;
pub mod state;
