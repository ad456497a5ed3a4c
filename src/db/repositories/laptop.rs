use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entities::{laptops, prelude::*};
use crate::models::{LaptopFilter, LaptopRecord};

/// Aggregate row of a `GROUP BY` over one text column.
#[derive(Debug, Clone, FromQueryResult)]
pub struct GroupStatsRow {
    pub key: Option<String>,
    pub count: i64,
    pub avg_price: Option<f64>,
    pub total_sales: Option<i64>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct RamGbStatsRow {
    pub ram_gb: i32,
    pub count: i64,
    pub avg_price: Option<f64>,
    pub total_sales: Option<i64>,
}

#[derive(Debug, Clone, Default, FromQueryResult)]
pub struct PriceBandRow {
    pub count: i64,
    pub avg_price: Option<f64>,
    pub total_sales: Option<i64>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct BrandRamRow {
    pub brand: Option<String>,
    pub ram: Option<String>,
}

/// Text columns the catalog can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Brand,
    Cpu,
}

impl GroupColumn {
    const fn column(self) -> laptops::Column {
        match self {
            Self::Brand => laptops::Column::Brand,
            Self::Cpu => laptops::Column::Cpu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added(i32),
    Updated(i32),
}

impl UpsertOutcome {
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Added(id) | Self::Updated(id) => id,
        }
    }
}

fn avg_price_expr() -> SimpleExpr {
    Func::avg(Expr::col(laptops::Column::Price)).into()
}

fn total_sales_expr() -> SimpleExpr {
    Func::sum(Expr::col(laptops::Column::Sales)).into()
}

fn apply_filter(mut query: Select<Laptops>, filter: &LaptopFilter) -> Select<Laptops> {
    if let Some(brand) = &filter.brand {
        query = query.filter(laptops::Column::Brand.eq(brand.as_str()));
    }
    if let Some(cpu) = &filter.cpu {
        query = query.filter(laptops::Column::Cpu.eq(cpu.as_str()));
    }
    if let Some(ram) = &filter.ram {
        query = query.filter(laptops::Column::Ram.eq(ram.as_str()));
    }
    if let Some(min) = filter.ram_gb_min {
        query = query.filter(laptops::Column::RamGb.gte(min));
    }
    if let Some(max) = filter.ram_gb_max {
        query = query.filter(laptops::Column::RamGb.lte(max));
    }
    if let Some(min) = filter.price_min {
        query = query.filter(laptops::Column::Price.gte(min));
    }
    if let Some(max) = filter.price_max {
        query = query.filter(laptops::Column::Price.lte(max));
    }
    query
}

pub struct LaptopRepository {
    conn: DatabaseConnection,
}

impl LaptopRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<laptops::Model>> {
        Laptops::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query laptop by ID")
    }

    /// Rows matching `filter` in id order, optionally windowed by `(offset, limit)`,
    /// together with the unwindowed match count.
    pub async fn find(
        &self,
        filter: &LaptopFilter,
        window: Option<(u64, u64)>,
    ) -> Result<(Vec<laptops::Model>, u64)> {
        let total = apply_filter(Laptops::find(), filter)
            .count(&self.conn)
            .await
            .context("Failed to count laptops")?;

        let mut query = apply_filter(Laptops::find(), filter).order_by_asc(laptops::Column::Id);
        if let Some((offset, limit)) = window {
            query = query.offset(offset).limit(limit);
        }

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to list laptops")?;

        Ok((rows, total))
    }

    pub async fn list_all(&self) -> Result<Vec<laptops::Model>> {
        Laptops::find()
            .order_by_asc(laptops::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list laptops")
    }

    pub async fn count(&self, filter: &LaptopFilter) -> Result<u64> {
        apply_filter(Laptops::find(), filter)
            .count(&self.conn)
            .await
            .context("Failed to count laptops")
    }

    /// Mean non-null price of the rows matching `filter`.
    pub async fn avg_price(&self, filter: &LaptopFilter) -> Result<Option<f64>> {
        let avg: Option<Option<f64>> = apply_filter(Laptops::find(), filter)
            .select_only()
            .column_as(avg_price_expr(), "avg_price")
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to compute average price")?;

        Ok(avg.flatten())
    }

    pub async fn total_sales(&self) -> Result<i64> {
        let total: Option<Option<i64>> = Laptops::find()
            .select_only()
            .column_as(total_sales_expr(), "total_sales")
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to sum sales")?;

        Ok(total.flatten().unwrap_or_default())
    }

    pub async fn distinct_brand_count(&self) -> Result<u64> {
        Laptops::find()
            .select_only()
            .column(laptops::Column::Brand)
            .filter(laptops::Column::Brand.is_not_null())
            .distinct()
            .count(&self.conn)
            .await
            .context("Failed to count brands")
    }

    /// Listings of other brands priced within `[min, max]`.
    pub async fn competitors(&self, brand: &str, min: f64, max: f64) -> Result<Vec<laptops::Model>> {
        Laptops::find()
            .filter(laptops::Column::Brand.ne(brand))
            .filter(laptops::Column::Price.gte(min))
            .filter(laptops::Column::Price.lte(max))
            .all(&self.conn)
            .await
            .context("Failed to query competitor listings")
    }

    pub async fn group_stats(&self, group: GroupColumn) -> Result<Vec<GroupStatsRow>> {
        let column = group.column();
        Laptops::find()
            .select_only()
            .column_as(column, "key")
            .column_as(laptops::Column::Id.count(), "count")
            .column_as(avg_price_expr(), "avg_price")
            .column_as(total_sales_expr(), "total_sales")
            .group_by(column)
            .order_by_asc(column)
            .into_model::<GroupStatsRow>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate laptops")
    }

    pub async fn ram_gb_stats(&self) -> Result<Vec<RamGbStatsRow>> {
        Laptops::find()
            .select_only()
            .column(laptops::Column::RamGb)
            .column_as(laptops::Column::Id.count(), "count")
            .column_as(avg_price_expr(), "avg_price")
            .column_as(total_sales_expr(), "total_sales")
            .filter(laptops::Column::RamGb.is_not_null())
            .group_by(laptops::Column::RamGb)
            .order_by_asc(laptops::Column::RamGb)
            .into_model::<RamGbStatsRow>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate memory sizes")
    }

    /// Aggregates over `min <= price < max`.
    pub async fn price_band(&self, min: f64, max: Option<f64>) -> Result<PriceBandRow> {
        let mut query = Laptops::find()
            .select_only()
            .column_as(laptops::Column::Id.count(), "count")
            .column_as(avg_price_expr(), "avg_price")
            .column_as(total_sales_expr(), "total_sales")
            .filter(laptops::Column::Price.gte(min));
        if let Some(max) = max {
            query = query.filter(laptops::Column::Price.lt(max));
        }

        let row = query
            .into_model::<PriceBandRow>()
            .one(&self.conn)
            .await
            .context("Failed to aggregate price band")?;

        Ok(row.unwrap_or_default())
    }

    pub async fn top_by_sales(&self, limit: u64) -> Result<Vec<laptops::Model>> {
        Laptops::find()
            .filter(laptops::Column::Sales.is_not_null())
            .order_by_desc(laptops::Column::Sales)
            .order_by_asc(laptops::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query top sellers")
    }

    pub async fn brand_ram_options(&self) -> Result<Vec<BrandRamRow>> {
        Laptops::find()
            .select_only()
            .column(laptops::Column::Brand)
            .column(laptops::Column::Ram)
            .group_by(laptops::Column::Brand)
            .group_by(laptops::Column::Ram)
            .order_by_asc(laptops::Column::Brand)
            .order_by_asc(laptops::Column::Ram)
            .into_model::<BrandRamRow>()
            .all(&self.conn)
            .await
            .context("Failed to query brand/memory combinations")
    }

    /// Insert a row or update the one sharing its `original_id`.
    pub async fn upsert<C: ConnectionTrait>(conn: &C, record: &LaptopRecord) -> Result<UpsertOutcome> {
        let existing = Laptops::find()
            .filter(laptops::Column::OriginalId.eq(record.original_id.as_str()))
            .one(conn)
            .await
            .context("Failed to look up laptop by original id")?;

        let mut active: laptops::ActiveModel = match &existing {
            Some(model) => model.clone().into(),
            None => laptops::ActiveModel {
                original_id: Set(record.original_id.clone()),
                ..Default::default()
            },
        };

        active.name = Set(record.name.clone());
        active.price = Set(record.price);
        active.shop = Set(record.shop.clone());
        active.brand = Set(record.brand.clone());
        active.ram = Set(record.ram.clone());
        active.cpu = Set(record.cpu.clone());
        active.sales = Set(record.sales);
        active.rating = Set(record.rating);
        active.ram_gb = Set(record.ram_gb);

        if existing.is_some() {
            let model = active.update(conn).await?;
            Ok(UpsertOutcome::Updated(model.id))
        } else {
            let model = active.insert(conn).await?;
            Ok(UpsertOutcome::Added(model.id))
        }
    }

    /// Rows whose `ram_gb` is unset or zero, in id order, starting after `after_id`.
    pub async fn missing_ram_gb(&self, after_id: i32, limit: u64) -> Result<Vec<(i32, Option<String>)>> {
        Laptops::find()
            .select_only()
            .column(laptops::Column::Id)
            .column(laptops::Column::Ram)
            .filter(
                laptops::Column::RamGb
                    .is_null()
                    .or(laptops::Column::RamGb.eq(0)),
            )
            .filter(laptops::Column::Id.gt(after_id))
            .order_by_asc(laptops::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query rows without ram_gb")
    }

    pub async fn set_ram_gb<C: ConnectionTrait>(conn: &C, id: i32, ram_gb: Option<i32>) -> Result<()> {
        Laptops::update_many()
            .col_expr(laptops::Column::RamGb, Expr::value(ram_gb))
            .filter(laptops::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(())
    }
}
