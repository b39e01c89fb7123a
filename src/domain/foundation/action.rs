//! Change verbs attached to every broadcast.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to the entity carried in a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastAction {
    Create,
    Update,
    Delete,
}

impl BroadcastAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastAction::Create => "create",
            BroadcastAction::Update => "update",
            BroadcastAction::Delete => "delete",
        }
    }
}

impl fmt::Display for BroadcastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
