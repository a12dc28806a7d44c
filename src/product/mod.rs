//! 商品カード抽出モジュール
//!
//! レンダリング済みのカタログページから商品レコードを取り出す

mod parser;
mod types;

pub use parser::ProductParser;
pub use types::{ExtractionError, FieldRole, ProductRecord, MAX_RATING};
