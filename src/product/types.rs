//! 商品レコード関連の型定義

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// 評価の上限（星の数）
pub const MAX_RATING: u8 = 5;

/// 商品カード内の要素の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Title,
    Description,
    Price,
    ReviewCount,
    Rating,
}

impl FieldRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::ReviewCount => "review_count",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("セレクタが不正です: {selector}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("要素が見つかりません: {role} (商品 #{index})")]
    MissingRole { role: FieldRole, index: usize },

    #[error("値を解析できません: {role} = {value:?} (商品 #{index})")]
    InvalidValue {
        role: FieldRole,
        index: usize,
        value: String,
    },
}

/// 商品レコード
///
/// 抽出時に検証済みの値だけを保持する。生成後は変更できない。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    title: String,
    description: String,
    price: f64,
    rating: u8,
    #[serde(rename = "numOfReviews")]
    num_of_reviews: u32,
}

impl ProductRecord {
    pub(crate) fn new(
        title: String,
        description: String,
        price: f64,
        rating: u8,
        num_of_reviews: u32,
    ) -> Self {
        Self {
            title,
            description,
            price,
            rating,
            num_of_reviews,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn num_of_reviews(&self) -> u32 {
        self.num_of_reviews
    }
}
