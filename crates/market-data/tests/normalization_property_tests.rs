//! Property-based integration tests for vendor payload normalization.
//!
//! These tests feed generated raw vendor payloads through the adapters'
//! normalization step, using the `proptest` crate for random test case
//! generation. No network calls are made.

use std::sync::Arc;

use chrono::Utc;
use finledger_market_data::{
    AlphaVantageProvider, CompanySnapshot, IndianApiProvider, MemoryAuditSink, VendorSettings,
    NSE,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

// =============================================================================
// Generators
// =============================================================================

/// Generates a company name with no leading or trailing whitespace.
fn arb_company_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z&]{2,12}( [A-Z][a-z]{2,10}){0,3}"
}

/// Generates a price in the accepted range as integer paise.
fn arb_paise() -> impl Strategy<Value = i64> {
    1i64..100_000_000
}

/// Renders paise as vendor text, with 2 to 4 decimal places.
fn render_price(paise: i64, extra_zeros: usize) -> String {
    let text = Decimal::new(paise, 2).to_string();
    format!("{}{}", text, "0".repeat(extra_zeros))
}

fn indian_api() -> IndianApiProvider {
    IndianApiProvider::new(
        VendorSettings::new("indian_api", "http://localhost/stock", "k"),
        Arc::new(MemoryAuditSink::new()),
    )
    .unwrap()
}

fn alpha_vantage() -> AlphaVantageProvider {
    AlphaVantageProvider::new(
        VendorSettings::new("alpha_vantage", "http://localhost/query", "k"),
        Arc::new(MemoryAuditSink::new()),
    )
    .unwrap()
}

fn indian_payload(name: &str, nse: &str, peer_cap: Option<&str>) -> String {
    json!({
        "companyName": name,
        "industry": "Software",
        "companyProfile": {
            "companyDescription": format!("{} description", name),
            "mgIndustry": "Software & Programming",
            "peerCompanyList": [
                { "tickerId": "PEER", "companyName": "Peer Ltd", "marketCap": peer_cap }
            ]
        },
        "currentPrice": { "NSE": nse, "BSE": null }
    })
    .to_string()
}

fn shared_fields(snapshot: &CompanySnapshot) -> (String, Option<Decimal>) {
    (snapshot.company_name.clone(), snapshot.price_on(NSE))
}

proptest! {
    /// Normalizing the same payload twice gives bit-identical responses.
    #[test]
    fn prop_normalization_is_idempotent(
        name in arb_company_name(),
        paise in arb_paise(),
        extra_zeros in 0usize..3,
        peer_cap in proptest::option::of("[0-9]{1,7}(\\.[0-9]{1,2})?|None|-"),
    ) {
        let provider = indian_api();
        let body = indian_payload(&name, &render_price(paise, extra_zeros), peer_cap.as_deref());

        let first = provider.normalize("TCS", &body).unwrap();
        let second = provider.normalize("TCS", &body).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    /// Trailing zeros in vendor text never change the normalized price.
    #[test]
    fn prop_price_text_formatting_is_irrelevant(
        name in arb_company_name(),
        paise in arb_paise(),
        extra_zeros in 0usize..3,
    ) {
        let provider = indian_api();
        let plain = provider
            .normalize("TCS", &indian_payload(&name, &render_price(paise, 0), None))
            .unwrap();
        let padded = provider
            .normalize("TCS", &indian_payload(&name, &render_price(paise, extra_zeros), None))
            .unwrap();

        prop_assert_eq!(plain, padded);
    }

    /// A nested per-exchange price and a flat price on an NSE symbol normalize
    /// to the same shared fields.
    #[test]
    fn prop_nested_and_flat_shapes_agree(
        name in arb_company_name(),
        paise in arb_paise(),
        nested_zeros in 0usize..3,
        flat_zeros in 0usize..3,
    ) {
        let nested = indian_api()
            .normalize("TCS.NS", &indian_payload(&name, &render_price(paise, nested_zeros), None))
            .unwrap();

        let overview = json!({ "Name": name, "Industry": "Software" }).to_string();
        let quote = json!({
            "Global Quote": {
                "05. price": render_price(paise, flat_zeros),
                "07. latest trading day": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
                "10. change percent": "0.5%"
            }
        })
        .to_string();
        let flat = alpha_vantage()
            .normalize("TCS.NS", &overview, Some(&quote))
            .unwrap();

        prop_assert_eq!(shared_fields(&nested), shared_fields(&flat));
        prop_assert_eq!(nested.price_by_exchange.len(), 1);
        prop_assert_eq!(flat.price_by_exchange.len(), 1);
        prop_assert_eq!(nested.industry, flat.industry);
    }

    /// Placeholder or garbage price text leaves the exchange absent and
    /// never fails the response.
    #[test]
    fn prop_unparsable_price_degrades_to_absent(
        name in arb_company_name(),
        junk in prop_oneof![
            Just(String::new()),
            Just("None".to_string()),
            Just("N/A".to_string()),
            Just("-".to_string()),
            "[a-z]{1,6}",
        ],
    ) {
        let snapshot = indian_api()
            .normalize("TCS", &indian_payload(&name, &junk, None))
            .unwrap();

        prop_assert_eq!(&snapshot.company_name, &name);
        prop_assert!(snapshot.price_on(NSE).is_none());
    }
}
