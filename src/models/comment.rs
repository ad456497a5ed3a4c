use serde::{Deserialize, Serialize};

use crate::entities::comments;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub created_at: String,
    pub laptop_id: i32,
}

impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            created_at: model.created_at,
            laptop_id: model.laptop_id,
        }
    }
}
