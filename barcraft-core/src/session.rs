//! Identity and clock source for version operations.

use chrono::{DateTime, Utc};

/// Supplies the author and timestamps stamped onto history entries and new
/// versions. Production code uses [`SystemSession`]; tests substitute fixed
/// clocks.
pub trait Session: Send + Sync {
    fn author(&self) -> String;
    fn now(&self) -> DateTime<Utc>;
}

/// The real author name and wall clock.
#[derive(Debug, Clone)]
pub struct SystemSession {
    author: String,
}

impl SystemSession {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }
}

impl Session for SystemSession {
    fn author(&self) -> String {
        self.author.clone()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
