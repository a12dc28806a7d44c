//! 商品カードのパーサー
//!
//! 商品カード（サムネイル）ごとに、要素の位置ではなく役割で各フィールドを取り出す。
//! 1件でも失敗した場合はドキュメント全体を失敗として扱う。

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::ProductSelectors;

use super::types::{ExtractionError, FieldRole, ProductRecord, MAX_RATING};

/// 評価の取得元（先に見つかったものを採用）
#[derive(Debug, Clone, Copy)]
enum RatingSource {
    /// `data-rating` 属性（カタログページ）
    Attribute,
    /// 星アイコンの数（カテゴリページ）
    StarIcons,
}

const RATING_CHAIN: [RatingSource; 2] = [RatingSource::Attribute, RatingSource::StarIcons];

fn compile(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// 商品パーサー
#[derive(Debug, Clone)]
pub struct ProductParser {
    thumbnail: Selector,
    title: Selector,
    description: Selector,
    price: Selector,
    review_count: Selector,
    rating_attribute: Selector,
    star_icon: Selector,
}

impl ProductParser {
    pub fn new(selectors: &ProductSelectors) -> Result<Self, ExtractionError> {
        Ok(Self {
            thumbnail: compile(&selectors.thumbnail)?,
            title: compile(&selectors.title)?,
            description: compile(&selectors.description)?,
            price: compile(&selectors.price)?,
            review_count: compile(&selectors.review_count)?,
            rating_attribute: compile(&selectors.rating_attribute)?,
            star_icon: compile(&selectors.star_icon)?,
        })
    }

    /// 既定のセレクタでパーサーを作成
    pub fn with_defaults() -> Result<Self, ExtractionError> {
        Self::new(&ProductSelectors::default())
    }

    /// HTML全体から商品レコードを文書順に抽出
    pub fn parse(&self, html: &str) -> Result<Vec<ProductRecord>, ExtractionError> {
        let document = Html::parse_document(html);
        let products = document
            .select(&self.thumbnail)
            .enumerate()
            .map(|(index, card)| self.parse_card(index, card))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("{}件の商品を解析", products.len());
        Ok(products)
    }

    /// 生のバイト列をUTF-8として解釈してから抽出
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<ProductRecord>, ExtractionError> {
        let html = String::from_utf8_lossy(bytes);
        self.parse(&html)
    }

    fn parse_card(
        &self,
        index: usize,
        card: ElementRef<'_>,
    ) -> Result<ProductRecord, ExtractionError> {
        let title = self.title(index, card)?;
        let description = self.description(index, card)?;
        let price = self.price(index, card)?;
        let num_of_reviews = self.review_count(index, card)?;
        let rating = self.rating(index, card)?;

        Ok(ProductRecord::new(
            title,
            description,
            price,
            rating,
            num_of_reviews,
        ))
    }

    fn title(&self, index: usize, card: ElementRef<'_>) -> Result<String, ExtractionError> {
        let title = card
            .select(&self.title)
            .next()
            .and_then(|node| node.value().attr("title"))
            .ok_or(ExtractionError::MissingRole {
                role: FieldRole::Title,
                index,
            })?;

        if title.trim().is_empty() {
            return Err(ExtractionError::InvalidValue {
                role: FieldRole::Title,
                index,
                value: title.to_string(),
            });
        }
        Ok(title.to_string())
    }

    fn description(&self, index: usize, card: ElementRef<'_>) -> Result<String, ExtractionError> {
        let text = text_of(card, &self.description, FieldRole::Description, index)?;
        Ok(text.trim().replace('\u{a0}', " "))
    }

    fn price(&self, index: usize, card: ElementRef<'_>) -> Result<f64, ExtractionError> {
        let text = text_of(card, &self.price, FieldRole::Price, index)?;

        // 先頭の通貨記号を落とす
        let mut chars = text.chars();
        chars.next();
        let amount = chars.as_str().trim();

        amount
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(|| ExtractionError::InvalidValue {
                role: FieldRole::Price,
                index,
                value: text.clone(),
            })
    }

    fn review_count(&self, index: usize, card: ElementRef<'_>) -> Result<u32, ExtractionError> {
        let text = text_of(card, &self.review_count, FieldRole::ReviewCount, index)?;
        let text = text.trim();

        text.split_whitespace()
            .next()
            .and_then(|token| token.parse::<u32>().ok())
            .ok_or_else(|| ExtractionError::InvalidValue {
                role: FieldRole::ReviewCount,
                index,
                value: text.to_string(),
            })
    }

    fn rating(&self, index: usize, card: ElementRef<'_>) -> Result<u8, ExtractionError> {
        for source in RATING_CHAIN {
            if let Some(rating) = self.rating_from(source, index, card)? {
                return Ok(rating);
            }
        }
        Ok(0)
    }

    fn rating_from(
        &self,
        source: RatingSource,
        index: usize,
        card: ElementRef<'_>,
    ) -> Result<Option<u8>, ExtractionError> {
        match source {
            RatingSource::Attribute => {
                let Some(raw) = card
                    .select(&self.rating_attribute)
                    .next()
                    .and_then(|node| node.value().attr("data-rating"))
                else {
                    return Ok(None);
                };

                raw.trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|rating| *rating <= MAX_RATING)
                    .map(Some)
                    .ok_or_else(|| ExtractionError::InvalidValue {
                        role: FieldRole::Rating,
                        index,
                        value: raw.to_string(),
                    })
            }
            RatingSource::StarIcons => {
                let stars = card.select(&self.star_icon).count();
                if stars == 0 {
                    return Ok(None);
                }
                Ok(Some(stars.min(MAX_RATING as usize) as u8))
            }
        }
    }
}

fn text_of(
    card: ElementRef<'_>,
    selector: &Selector,
    role: FieldRole,
    index: usize,
) -> Result<String, ExtractionError> {
    card.select(selector)
        .next()
        .map(|node| node.text().collect())
        .ok_or(ExtractionError::MissingRole { role, index })
}
