//! PostgreSQL implementation of ItemStore.

use async_trait::async_trait;
use sea_query::{Expr, Order, PostgresQueryBuilder, Query};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::page::PageRequest;
use crate::store::schema::Items;
use crate::store::{ItemDraft, ItemRecord, ItemStore, Result, FIRST_ITEM_ID};

/// PostgreSQL-backed item store.
///
/// Prices map to NUMERIC(8,2); ids come from an identity column whose
/// sequence is never rewound, so deleted ids are not reissued.
pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    /// Create a new PostgreSQL item store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> ItemRecord {
    ItemRecord {
        id: row.get("id"),
        stock: row.get("stock"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        img_alt: row.get("img_alt"),
        img: row.get("img"),
    }
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
impl ItemStore for PostgresItemStore {
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS items (
                id BIGINT GENERATED ALWAYS AS IDENTITY (START WITH {}) PRIMARY KEY,
                stock BIGINT NOT NULL,
                name VARCHAR(100) NOT NULL,
                description VARCHAR(2048) NOT NULL,
                price NUMERIC(8,2) NOT NULL,
                img_alt VARCHAR(75),
                img VARCHAR(50) NOT NULL
            )",
            FIRST_ITEM_ID
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
            .to_string(PostgresQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| record_from_row(&r)))
    }

    async fn page(&self, request: PageRequest) -> Result<Vec<ItemRecord>> {
        let query = Query::select()
            .columns(ITEM_COLUMNS)
            .from(Items::Table)
            .order_by(Items::Id, Order::Asc)
            .limit(request.size)
            .offset(request.offset())
            .to_string(PostgresQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn count(&self) -> Result<u64> {
        let query = Query::select()
            .expr(Expr::col(Items::Id).count())
            .from(Items::Table)
            .to_string(PostgresQueryBuilder);

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
                draft.price.into(),
                draft.img_alt.clone().into(),
                draft.img.clone().into(),
            ])
            .returning_col(Items::Id)
            .to_string(PostgresQueryBuilder);

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
                (Items::Price, record.price.into()),
                (Items::ImgAlt, record.img_alt.clone().into()),
                (Items::Img, record.img.clone().into()),
            ])
            .and_where(Expr::col(Items::Id).eq(record.id))
            .to_string(PostgresQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let query = Query::delete()
            .from_table(Items::Table)
            .and_where(Expr::col(Items::Id).eq(id))
            .to_string(PostgresQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn deduct_stock(&self, id: i64, count: i64) -> Result<Option<i64>> {
        let query = Query::update()
            .table(Items::Table)
            .value(Items::Stock, Expr::col(Items::Stock).sub(count))
            .and_where(Expr::col(Items::Id).eq(id))
            .returning_col(Items::Stock)
            .to_string(PostgresQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| r.get::<i64, _>("stock")))
    }
}
