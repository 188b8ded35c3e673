//! The `counters` table holds both the singleton `global` document and one
//! `country_<CODE>` document per observed country, per `spec.md §3`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    /// `"global"` or `"country_<CODE>"`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub doc_id: String,
    /// `None` for the global document, the ISO country label otherwise.
    pub country: Option<String>,
    pub count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const GLOBAL_DOC_ID: &str = "global";

pub fn country_doc_id(country_code: &str) -> String {
    format!("country_{country_code}")
}
