//! Scrap metal prices and the value calculator.
//!
//! Live prices come from a loosely shaped JSON feed. Every record is parsed
//! explicitly and anything unusable falls back to the static table below.

use crate::error::PriceParseError;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GBP per kg used when the feed is unavailable.
pub const DEFAULT_PRICES: [(&str, f64); 8] = [
    ("Bright Copper", 6.80),
    ("Mixed Copper", 5.90),
    ("Insulated Copper Cable", 2.40),
    ("Brass", 4.10),
    ("Aluminium", 1.05),
    ("Lead", 1.60),
    ("Stainless Steel", 0.95),
    ("Steel", 0.18),
];

const NAME_FIELDS: [&str; 3] = ["name", "metal", "type"];
const PRICE_FIELDS: [&str; 3] = ["value", "pricePerKg", "price"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Clean,
    Mixed,
    Contaminated,
}

impl Grade {
    pub fn multiplier(&self) -> f64 {
        match self {
            Grade::Clean => 1.0,
            Grade::Mixed => 0.85,
            Grade::Contaminated => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPrice {
    pub name: String,
    pub price_per_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceSource {
    Live,
    Partial,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    pub prices: Vec<ParsedPrice>,
    pub source: PriceSource,
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable {
            prices: DEFAULT_PRICES
                .iter()
                .map(|(name, price)| ParsedPrice {
                    name: name.to_string(),
                    price_per_kg: *price,
                })
                .collect(),
            source: PriceSource::Default,
        }
    }
}

impl PriceTable {
    pub fn price_for(&self, metal: &str) -> Option<f64> {
        self.prices
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(metal.trim()))
            .map(|p| p.price_per_kg)
    }

    fn upsert(&mut self, parsed: ParsedPrice) {
        match self
            .prices
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&parsed.name))
        {
            Some(existing) => existing.price_per_kg = parsed.price_per_kg,
            None => self.prices.push(parsed),
        }
    }
}

fn number_from(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s
            .trim()
            .trim_start_matches('£')
            .trim_end_matches("/kg")
            .trim()
            .parse::<f64>()
            .ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0).then_some(number)
}

/// Reads one metal record, trying each known price field in priority order.
pub fn parse_metal_price(record: &Value) -> Result<ParsedPrice, PriceParseError> {
    let object = record.as_object().ok_or(PriceParseError::NotAnObject)?;

    let name = NAME_FIELDS
        .iter()
        .filter_map(|field| object.get(*field)?.as_str())
        .map(str::trim)
        .find(|name| !name.is_empty())
        .ok_or(PriceParseError::MissingName)?
        .to_string();

    let mut first_invalid = None;
    for field in PRICE_FIELDS {
        let Some(raw) = object.get(field) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }
        match number_from(raw) {
            Some(price_per_kg) => return Ok(ParsedPrice { name, price_per_kg }),
            None => {
                first_invalid.get_or_insert_with(|| raw.to_string());
            }
        }
    }

    Err(match first_invalid {
        Some(raw) => PriceParseError::InvalidPrice { metal: name, raw },
        None => PriceParseError::MissingPrice(name),
    })
}

/// Merges whatever parses from `feed` over the default table.
pub fn parse_price_feed(feed: &Value) -> PriceTable {
    let records = match feed {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match ["metals", "prices", "data"]
            .iter()
            .find_map(|key| map.get(*key)?.as_array())
        {
            Some(items) => items.as_slice(),
            None => {
                log::warn!("price feed has no metal list, using defaults");
                return PriceTable::default();
            }
        },
        _ => {
            log::warn!("price feed is not JSON object or array, using defaults");
            return PriceTable::default();
        }
    };

    let mut table = PriceTable::default();
    let mut parsed = 0;
    let mut rejected = 0;
    for record in records {
        match parse_metal_price(record) {
            Ok(price) => {
                table.upsert(price);
                parsed += 1;
            }
            Err(e) => {
                log::warn!("skipping price record: {}", e);
                rejected += 1;
            }
        }
    }

    table.source = match (parsed, rejected) {
        (0, _) => PriceSource::Default,
        (_, 0) => PriceSource::Live,
        _ => PriceSource::Partial,
    };
    table
}

async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Value> {
    let feed = client
        .get(url)
        .send()
        .await
        .wrap_err("Failed to reach price feed")?
        .error_for_status()?
        .json::<Value>()
        .await
        .wrap_err("Price feed returned invalid JSON")?;
    Ok(feed)
}

/// Never fails: network or decoding problems yield the default table.
pub async fn fetch_price_table(client: &reqwest::Client, url: &str) -> PriceTable {
    match fetch_feed(client, url).await {
        Ok(feed) => parse_price_feed(&feed),
        Err(e) => {
            log::warn!("price feed unavailable, using defaults: {:#}", e);
            PriceTable::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapValuation {
    pub metal: String,
    pub weight_kg: f64,
    pub grade: Grade,
    pub price_per_kg: f64,
    pub value: f64,
}

/// weight x price x grade multiplier, rounded to the penny.
pub fn scrap_value(weight_kg: f64, price_per_kg: f64, grade: Grade) -> f64 {
    let raw = weight_kg * price_per_kg * grade.multiplier();
    (raw * 100.0).round() / 100.0
}

pub fn value_scrap(
    table: &PriceTable,
    metal: &str,
    weight_kg: f64,
    grade: Grade,
) -> Option<ScrapValuation> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        return None;
    }
    let price_per_kg = table.price_for(metal)?;
    Some(ScrapValuation {
        metal: metal.trim().to_string(),
        weight_kg,
        grade,
        price_per_kg,
        value: scrap_value(weight_kg, price_per_kg, grade),
    })
}
