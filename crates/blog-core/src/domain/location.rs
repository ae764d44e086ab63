use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location - administrator-managed place a post can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String) -> Self {
        Self {
            id: 0,
            name,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}
