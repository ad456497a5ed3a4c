use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{comments, laptops, prelude::*};

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest comments first, optionally for a single laptop, with the total match count.
    pub async fn list(
        &self,
        laptop_id: Option<i32>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<comments::Model>, u64)> {
        let mut query = Comments::find();
        if let Some(id) = laptop_id {
            query = query.filter(comments::Column::LaptopId.eq(id));
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count comments")?;

        let rows = query
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        Ok((rows, total))
    }

    /// Text of every comment attached to a laptop of `brand` (all laptops when `None`).
    pub async fn contents_for_brand(&self, brand: Option<&str>) -> Result<Vec<String>> {
        let mut query = Comments::find()
            .select_only()
            .column(comments::Column::Content)
            .inner_join(Laptops);
        if let Some(brand) = brand {
            query = query.filter(laptops::Column::Brand.eq(brand));
        }

        query
            .order_by_asc(comments::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load comments for sentiment")
    }

    pub async fn count(&self) -> Result<u64> {
        Comments::find()
            .count(&self.conn)
            .await
            .context("Failed to count comments")
    }

    /// Replace the first comment of a laptop, or attach a new one.
    /// Returns `true` when a new comment was inserted.
    pub async fn upsert_for_laptop<C: ConnectionTrait>(
        conn: &C,
        laptop_id: i32,
        content: &str,
    ) -> Result<bool> {
        let existing = Comments::find()
            .filter(comments::Column::LaptopId.eq(laptop_id))
            .order_by_asc(comments::Column::Id)
            .one(conn)
            .await
            .context("Failed to look up existing comment")?;

        if let Some(model) = existing {
            let mut active: comments::ActiveModel = model.into();
            active.content = Set(content.to_string());
            active.update(conn).await?;
            return Ok(false);
        }

        let active = comments::ActiveModel {
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            laptop_id: Set(laptop_id),
            ..Default::default()
        };
        active.insert(conn).await?;
        Ok(true)
    }
}
