//! API handlers module

pub mod collections;
pub mod explore;
pub mod favorites;
pub mod health;
pub mod journal;
pub mod paintings;
pub mod search;
pub mod stats;
pub mod tags;

use serde::Serialize;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
