//! Daily rate source.
//!
//! The central-bank endpoint publishes one XML document per day quoting
//! every currency against the base currency, with decimal commas and a
//! per-`Nominal` value (e.g. 100 units of a small currency).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{RateError, RateResult};

pub const DEFAULT_ENDPOINT: &str = "https://www.cbr.ru/scripts/XML_daily.asp";

static VALUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Valute[^>]*>(.*?)</Valute>").unwrap());

static CHAR_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<CharCode>\s*([A-Za-z]{3})\s*</CharCode>").unwrap());

static NOMINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Nominal>\s*(\d+)\s*</Nominal>").unwrap());

static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Value>\s*([\d.,]+)\s*</Value>").unwrap());

/// One day's rate table: base-currency value of one unit of each quoted
/// currency.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRates {
    pub as_of: DateTime<Utc>,
    rates: HashMap<String, Decimal>,
}

impl DailyRates {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, code: impl Into<String>, per_unit: Decimal) -> Self {
        self.rates.insert(code.into().to_ascii_uppercase(), per_unit);
        self
    }

    /// Base-currency value of one unit of `code`.
    pub fn per_unit(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Fetches the daily rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_daily(&self) -> RateResult<DailyRates>;
}

/// Production source over the central-bank XML endpoint.
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_daily(&self) -> RateResult<DailyRates> {
        debug!(endpoint = %self.endpoint, "fetching daily rates");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| RateError::Http(Box::new(e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| RateError::Http(Box::new(e)))?;

        parse_daily(&body, Utc::now())
    }
}

/// Parse the daily XML payload. Individual malformed entries are skipped; a
/// payload yielding no entries at all is unparsable.
pub fn parse_daily(xml: &str, as_of: DateTime<Utc>) -> RateResult<DailyRates> {
    let mut rates = DailyRates::new(as_of);

    for valute in VALUTE_RE.captures_iter(xml) {
        let block = &valute[1];

        let Some(code) = CHAR_CODE_RE.captures(block).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(nominal) = NOMINAL_RE
            .captures(block)
            .and_then(|c| c[1].parse::<Decimal>().ok())
            .filter(|n| !n.is_zero())
        else {
            continue;
        };
        // Decimal comma in the source format.
        let Some(value) = VALUE_RE
            .captures(block)
            .and_then(|c| c[1].replace(',', ".").parse::<Decimal>().ok())
        else {
            continue;
        };

        rates = rates.with_rate(code, value / nominal);
    }

    if rates.is_empty() {
        return Err(RateError::Unparsable);
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
        <ValCurs Date="02.06.2025" name="Foreign Currency Market">
            <Valute ID="R01235">
                <NumCode>840</NumCode>
                <CharCode>USD</CharCode>
                <Nominal>1</Nominal>
                <Name>Доллар США</Name>
                <Value>78,5012</Value>
            </Valute>
            <Valute ID="R01239">
                <NumCode>978</NumCode>
                <CharCode>EUR</CharCode>
                <Nominal>1</Nominal>
                <Name>Евро</Name>
                <Value>89,2170</Value>
            </Valute>
            <Valute ID="R01820">
                <NumCode>392</NumCode>
                <CharCode>JPY</CharCode>
                <Nominal>100</Nominal>
                <Name>Иен</Name>
                <Value>54,5239</Value>
            </Valute>
        </ValCurs>"#;

    #[test]
    fn test_parse_daily_rates() {
        let rates = parse_daily(SAMPLE, Utc::now()).unwrap();
        assert_eq!(rates.per_unit("USD"), Some(Decimal::new(785012, 4)));
        assert_eq!(rates.per_unit("EUR"), Some(Decimal::new(892170, 4)));
    }

    #[test]
    fn test_nominal_divides_value() {
        let rates = parse_daily(SAMPLE, Utc::now()).unwrap();
        // 54.5239 per 100 units.
        assert_eq!(
            rates.per_unit("JPY"),
            Some(Decimal::new(545239, 4) / Decimal::new(100, 0))
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rates = parse_daily(SAMPLE, Utc::now()).unwrap();
        assert_eq!(rates.per_unit("usd"), rates.per_unit("USD"));
    }

    #[test]
    fn test_garbage_payload_is_unparsable() {
        assert!(matches!(
            parse_daily("<html>error page</html>", Utc::now()),
            Err(RateError::Unparsable)
        ));
        assert!(matches!(
            parse_daily("", Utc::now()),
            Err(RateError::Unparsable)
        ));
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let xml = r#"<ValCurs>
            <Valute><CharCode>BAD</CharCode><Nominal>1</Nominal><Value>not,a,number</Value></Valute>
            <Valute><CharCode>USD</CharCode><Nominal>1</Nominal><Value>80,00</Value></Valute>
        </ValCurs>"#;
        let rates = parse_daily(xml, Utc::now()).unwrap();
        assert_eq!(rates.per_unit("BAD"), None);
        assert_eq!(rates.per_unit("USD"), Some(Decimal::new(80, 0)));
    }
}
