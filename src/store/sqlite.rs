//! SQLite implementation of ItemStore.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::page::PageRequest;
use crate::store::schema::Items;
use crate::store::{ItemDraft, ItemRecord, ItemStore, Result, StoreError, FIRST_ITEM_ID};

/// SQLite-backed item store.
///
/// Prices are stored as TEXT and parsed on read, keeping their decimal
/// scale exact; SQLite has no native decimal type.
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Create a new SQLite item store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ItemRecord> {
    let id: i64 = row.get("id");
    let price_text: String = row.get("price");
    let price = price_text
        .parse::<Decimal>()
        .map_err(|e| StoreError::Corrupt(format!("price '{}' for item {}: {}", price_text, id, e)))?;

    Ok(ItemRecord {
        id,
        stock: row.get("stock"),
        name: row.get("name"),
        description: row.get("description"),
        price,
        img_alt: row.get("img_alt"),
        img: row.get("img"),
    })
}

const ITEM_COLUMNS: [Items; 7] = [
    Items::Id,
    Items::Stock,
    Items::Name,
    Items::Description,
    Items::Price,
    Items::ImgAlt,
    Items::Img,
];

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stock INTEGER NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price TEXT NOT NULL,
                img_alt TEXT,
                img TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // AUTOINCREMENT tracks the last issued id in sqlite_sequence; priming
        // it makes the first insert land on FIRST_ITEM_ID. The guard keeps a
        // re-run from rewinding a sequence that is already live.
        sqlx::query(&format!(
            "INSERT INTO sqlite_sequence (name, seq)
             SELECT 'items', {}
             WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'items')",
            FIRST_ITEM_ID - 1
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<ItemRecord>> {
        let query = Query::select()
            .columns(ITEM_COLUMNS)
            .from(Items::Table)
            .and_where(Expr::col(Items::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.map(|r| record_from_row(&r)).transpose()
    }

    async fn page(&self, request: PageRequest) -> Result<Vec<ItemRecord>> {
        let query = Query::select()
            .columns(ITEM_COLUMNS)
            .from(Items::Table)
            .order_by(Items::Id, Order::Asc)
            .limit(request.size)
            .offset(request.offset())
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self) -> Result<u64> {
        let query = Query::select()
            .expr(Expr::col(Items::Id).count())
            .from(Items::Table)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    async fn create(&self, draft: &ItemDraft) -> Result<ItemRecord> {
        let query = Query::insert()
            .into_table(Items::Table)
            .columns([
                Items::Stock,
                Items::Name,
                Items::Description,
                Items::Price,
                Items::ImgAlt,
                Items::Img,
            ])
            .values_panic([
                draft.stock.into(),
                draft.name.clone().into(),
                draft.description.clone().into(),
                draft.price.to_string().into(),
                draft.img_alt.clone().into(),
                draft.img.clone().into(),
            ])
            .returning_col(Items::Id)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        let id: i64 = row.get("id");

        Ok(ItemRecord {
            id,
            stock: draft.stock,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            img_alt: draft.img_alt.clone(),
            img: draft.img.clone(),
        })
    }

    async fn update(&self, record: &ItemRecord) -> Result<bool> {
        let query = Query::update()
            .table(Items::Table)
            .values([
                (Items::Stock, record.stock.into()),
                (Items::Name, record.name.clone().into()),
                (Items::Description, record.description.clone().into()),
                (Items::Price, record.price.to_string().into()),
                (Items::ImgAlt, record.img_alt.clone().into()),
                (Items::Img, record.img.clone().into()),
            ])
            .and_where(Expr::col(Items::Id).eq(record.id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let query = Query::delete()
            .from_table(Items::Table)
            .and_where(Expr::col(Items::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn deduct_stock(&self, id: i64, count: i64) -> Result<Option<i64>> {
        let query = Query::update()
            .table(Items::Table)
            .value(Items::Stock, Expr::col(Items::Stock).sub(count))
            .and_where(Expr::col(Items::Id).eq(id))
            .returning_col(Items::Stock)
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| r.get::<i64, _>("stock")))
    }
}
