//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Items table schema.
#[derive(Iden)]
pub enum Items {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "stock"]
    Stock,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
    #[iden = "price"]
    Price,
    #[iden = "img_alt"]
    ImgAlt,
    #[iden = "img"]
    Img,
}
