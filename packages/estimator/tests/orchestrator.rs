//! End-to-end batch scenarios over mocked network, rates, and browser.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use estimator::browser::BrowserPool;
use estimator::orchestrator::Orchestrator;
use estimator::rates::RateProvider;
use estimator::reliability::advisory::Advisory;
use estimator::testing::{MockBrowser, MockFetcher, MockRateSource};
use estimator::types::{CurrencyConfig, OrchestratorConfig, PricingConfig, UrlKind};
use estimator::{CommissionKind, ErrorKind, PricingEngine, ReliabilityCategory};

fn ebay_listing_html(price: &str, shipping: &str) -> String {
    format!(
        r#"<html><head><meta property="og:title" content="Heavy wool coat" /></head>
        <body>
        <span id="prcIsum">US ${price}</span>
        <span id="fshippingCost">${shipping}</span>
        </body></html>"#
    )
}

fn grailed_listing_html(price: &str, username: &str) -> String {
    format!(
        r#"<html><head><meta property="og:title" content="Archive bomber jacket" /></head>
        <body>
        <span class="ListingPrice">${price}</span>
        <script>{{"listing": {{"buyNow": true, "seller": {{"username": "{username}"}}}}}}</script>
        </body></html>"#
    )
}

fn rates() -> MockRateSource {
    MockRateSource::new()
        .with_rate("USD", Decimal::new(80, 0))
        .with_rate("EUR", Decimal::new(90, 0))
}

fn orchestrator(fetcher: MockFetcher, source: MockRateSource, browser: MockBrowser) -> Orchestrator {
    let provider = Arc::new(RateProvider::new(
        Box::new(source),
        CurrencyConfig::default(),
    ));
    let engine = Arc::new(PricingEngine::new(PricingConfig::default(), provider));
    let pool = Arc::new(BrowserPool::new(
        Box::new(browser),
        2,
        Duration::from_millis(200),
    ));
    Orchestrator::new(
        Arc::new(fetcher),
        pool,
        engine,
        OrchestratorConfig::default(),
    )
}

#[tokio::test]
async fn batch_keeps_order_and_isolates_failures() {
    let fetcher = MockFetcher::new()
        .with_html("https://www.ebay.com/itm/1", ebay_listing_html("120.00", "40.00"))
        .with_html("https://www.ebay.com/itm/2", r#"{"error": "bot check"}"#)
        .with_html("https://www.ebay.com/itm/3", ebay_listing_html("300.00", "15.00"));

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let urls: Vec<String> = (1..=3)
        .map(|i| format!("https://www.ebay.com/itm/{i}"))
        .collect();

    let outcomes = orchestrator.process_batch(&urls).await;

    assert_eq!(outcomes.len(), 3);
    for (outcome, url) in outcomes.iter().zip(&urls) {
        assert_eq!(&outcome.url, url);
    }

    assert!(outcomes[0].is_success());
    assert!(outcomes[2].is_success());

    let failed = &outcomes[1];
    assert!(!failed.is_success());
    assert_eq!(failed.error.as_ref().unwrap().kind, ErrorKind::Parse);
    assert!(failed.item.is_none());
    assert!(failed.breakdown.is_none());
}

#[tokio::test]
async fn listing_breakdown_matches_pricing_rules() {
    let fetcher = MockFetcher::new()
        .with_html("https://www.ebay.com/itm/1", ebay_listing_html("120.00", "40.00"));

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let outcomes = orchestrator
        .process_batch(&["https://www.ebay.com/itm/1".to_string()])
        .await;

    let breakdown = outcomes[0].breakdown.as_ref().unwrap();
    // Basis $160 crosses the $150 threshold, so 10% commission.
    assert_eq!(breakdown.commission, Decimal::new(1600, 2));
    assert_eq!(breakdown.commission_kind, CommissionKind::Percentage);
    // Wool coat weight 1.3kg stays in the light handling band.
    assert_eq!(breakdown.weight_kg, Decimal::new(130, 2));
    assert!(breakdown.weight_matched);

    let converted = breakdown.converted.as_ref().unwrap();
    assert_eq!(converted.currency, "RUB");
    assert_eq!(converted.rate, Decimal::new(8400, 2));
}

#[tokio::test]
async fn outcomes_serialize_for_downstream_consumers() {
    let fetcher = MockFetcher::new()
        .with_html("https://www.ebay.com/itm/1", ebay_listing_html("120.00", "40.00"));

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let outcomes = orchestrator
        .process_batch(&["https://www.ebay.com/itm/1".to_string()])
        .await;

    let json = serde_json::to_value(&outcomes[0]).unwrap();
    assert_eq!(json["url"], "https://www.ebay.com/itm/1");
    assert_eq!(json["kind"], "item_listing");
    assert_eq!(json["breakdown"]["commission"], "16.00");
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn rate_outage_flags_outcome_but_keeps_source_breakdown() {
    let fetcher = MockFetcher::new()
        .with_html("https://www.ebay.com/itm/1", ebay_listing_html("120.00", "40.00"));

    let orchestrator = orchestrator(fetcher, MockRateSource::failing(), MockBrowser::new());
    let outcomes = orchestrator
        .process_batch(&["https://www.ebay.com/itm/1".to_string()])
        .await;

    let outcome = &outcomes[0];
    assert_eq!(
        outcome.error.as_ref().unwrap().kind,
        ErrorKind::RateUnavailable
    );

    // Source-currency fields are still fully populated.
    let breakdown = outcome.breakdown.as_ref().unwrap();
    assert_eq!(breakdown.item_price, Decimal::new(12000, 2));
    assert_eq!(breakdown.commission, Decimal::new(1600, 2));
    assert!(breakdown.total > Decimal::ZERO);
    assert!(breakdown.converted.is_none());
    assert_eq!(breakdown.customs_duty, Decimal::ZERO);
}

#[tokio::test]
async fn grailed_listing_scores_its_seller() {
    let fetcher = MockFetcher::new().with_html(
        "https://www.grailed.com/listings/42-bomber",
        grailed_listing_html("250.00", "vintagehound"),
    );
    let browser = MockBrowser::new()
        .with_texts(".rating", vec!["4.95".to_string()])
        .with_texts(".review-count", vec!["230 reviews".to_string()])
        .with_texts(".trusted-badge", vec!["Trusted".to_string()])
        .with_body_text("updated 1 day ago");

    let orchestrator = orchestrator(fetcher, rates(), browser);
    let outcomes = orchestrator
        .process_batch(&["https://www.grailed.com/listings/42-bomber".to_string()])
        .await;

    let outcome = &outcomes[0];
    assert!(outcome.is_success());

    let reliability = outcome.reliability.as_ref().unwrap();
    assert_eq!(reliability.category, ReliabilityCategory::Diamond);
    assert_eq!(reliability.total, 100);
    assert_eq!(outcome.advisory, None);
}

#[tokio::test]
async fn unreachable_seller_profile_degrades_to_no_data() {
    let fetcher = MockFetcher::new().with_html(
        "https://www.grailed.com/listings/42-bomber",
        grailed_listing_html("250.00", "vintagehound"),
    );
    let browser = MockBrowser::new().with_failing_navigation();

    let orchestrator = orchestrator(fetcher, rates(), browser);
    let outcomes = orchestrator
        .process_batch(&["https://www.grailed.com/listings/42-bomber".to_string()])
        .await;

    let outcome = &outcomes[0];
    // Listing itself still succeeds.
    assert!(outcome.is_success());
    assert!(outcome.breakdown.is_some());

    let reliability = outcome.reliability.as_ref().unwrap();
    assert_eq!(reliability.category, ReliabilityCategory::NoData);
    assert_eq!(outcome.advisory, Some(Advisory::NoSellerData));
}

#[tokio::test]
async fn seller_profile_url_scores_directly() {
    let browser = MockBrowser::new()
        .with_texts(".rating", vec!["4.40".to_string()])
        .with_texts(".review-count", vec!["12 reviews".to_string()])
        .with_body_text("listed 10 days ago");

    let orchestrator = orchestrator(MockFetcher::new(), rates(), browser);
    let outcomes = orchestrator
        .process_batch(&["https://www.grailed.com/users/vintagehound".to_string()])
        .await;

    let outcome = &outcomes[0];
    assert_eq!(outcome.kind, Some(UrlKind::SellerProfile));
    assert!(outcome.breakdown.is_none());

    let reliability = outcome.reliability.as_ref().unwrap();
    // 12 activity + 12 rating + 15 reviews + 0 badge = 39.
    assert_eq!(reliability.total, 39);
    assert_eq!(reliability.category, ReliabilityCategory::Ghost);
    assert_eq!(outcome.advisory, Some(Advisory::LowRating));
}

#[tokio::test]
async fn shortlink_resolves_to_listing() {
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;

    let payload =
        URL_SAFE.encode(r#"{"$canonical_url": "https://www.grailed.com/listings/7-parka"}"#);
    let shortlink = format!(
        "https://grailed.app.link/AbCdEf?data={}",
        payload.trim_end_matches('=')
    );

    let fetcher = MockFetcher::new().with_html(
        "https://www.grailed.com/listings/7-parka",
        grailed_listing_html("500.00", "parkaseller"),
    );

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let outcomes = orchestrator.process_batch(&[shortlink]).await;

    let outcome = &outcomes[0];
    assert!(outcome.is_success(), "error: {:?}", outcome.error);
    assert_eq!(outcome.kind, Some(UrlKind::ItemListing));
    assert_eq!(
        outcome.item.as_ref().unwrap().price,
        Decimal::new(50000, 2)
    );
}

#[tokio::test]
async fn unsupported_and_invalid_urls() {
    let fetcher = MockFetcher::new()
        .with_html("https://www.ebay.com/itm/1", ebay_listing_html("50.00", "5.00"));

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let urls = vec![
        "https://www.grailed.com/designers".to_string(),
        "https://www.ebay.com/itm/1".to_string(),
        "not even a url".to_string(),
    ];

    let outcomes = orchestrator.process_batch(&urls).await;

    // The unsupported page type is dropped; the invalid URL surfaces as an
    // error outcome.
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].url, "https://www.ebay.com/itm/1");
    assert!(outcomes[0].is_success());
    assert_eq!(outcomes[1].url, "not even a url");
    assert_eq!(outcomes[1].error.as_ref().unwrap().kind, ErrorKind::Parse);
}

#[tokio::test]
async fn network_failure_is_isolated() {
    let fetcher = MockFetcher::new()
        .with_network_error("https://www.ebay.com/itm/1")
        .with_html("https://www.ebay.com/itm/2", ebay_listing_html("75.00", "0.00"));

    let orchestrator = orchestrator(fetcher, rates(), MockBrowser::new());
    let outcomes = orchestrator
        .process_batch(&[
            "https://www.ebay.com/itm/1".to_string(),
            "https://www.ebay.com/itm/2".to_string(),
        ])
        .await;

    assert_eq!(outcomes[0].error.as_ref().unwrap().kind, ErrorKind::Network);
    assert!(outcomes[1].is_success());
}

#[tokio::test]
async fn delisted_item_reports_not_found() {
    let orchestrator = orchestrator(MockFetcher::new(), rates(), MockBrowser::new());
    let outcomes = orchestrator
        .process_batch(&["https://www.ebay.com/itm/404".to_string()])
        .await;

    assert_eq!(
        outcomes[0].error.as_ref().unwrap().kind,
        ErrorKind::NotFound
    );
}
