use std::borrow::Cow;

/// Exchange (listing venue) identifier - mostly static
pub type ExchangeId = Cow<'static, str>;

/// National Stock Exchange of India
pub const NSE: &str = "NSE";

/// Bombay Stock Exchange
pub const BSE: &str = "BSE";

/// Derive the listing exchange from a vendor symbol suffix.
///
/// `RELIANCE.BSE` / `RELIANCE.BO` map to BSE, `TCS.NS` / `TCS.NSE` to NSE. Symbols without a
/// recognized suffix return `None`.
pub fn exchange_from_symbol(symbol: &str) -> Option<ExchangeId> {
    let (_, suffix) = symbol.rsplit_once('.')?;
    match suffix.to_ascii_uppercase().as_str() {
        "BSE" | "BO" => Some(Cow::Borrowed(BSE)),
        "NS" | "NSE" => Some(Cow::Borrowed(NSE)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_from_symbol() {
        assert_eq!(exchange_from_symbol("RELIANCE.BSE").as_deref(), Some(BSE));
        assert_eq!(exchange_from_symbol("RELIANCE.BO").as_deref(), Some(BSE));
        assert_eq!(exchange_from_symbol("TCS.NS").as_deref(), Some(NSE));
        assert_eq!(exchange_from_symbol("tcs.nse").as_deref(), Some(NSE));
        assert_eq!(exchange_from_symbol("TCS"), None);
        assert_eq!(exchange_from_symbol("BRK.B"), None);
    }
}
