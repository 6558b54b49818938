//! Snapshot endpoint URL construction.

use barwatch_types::Symbol;
use reqwest::Url;

/// Default base URL of the snapshot provider.
pub const BASE_URL: &str = "https://api.polygon.io";

/// Path of the full-market stocks snapshot endpoint.
pub const SNAPSHOT_PATH: &str = "/v2/snapshot/locale/us/markets/stocks/tickers";

/// Builds the URL for one batch of tickers.
///
/// The `_` parameter carries `cache_buster` so that intermediaries never
/// serve a stale snapshot.
///
/// # Errors
///
/// Returns an error if `base_url` is not a valid absolute URL.
///
/// # Example
///
/// ```
/// use barwatch_fetch::url::snapshot_url;
/// use barwatch_types::Symbol;
///
/// let symbols = [Symbol::from("AAPL"), Symbol::from("MSFT")];
/// let url = snapshot_url("https://api.polygon.io", &symbols, "KEY", 1_700_000_000).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://api.polygon.io/v2/snapshot/locale/us/markets/stocks/tickers?tickers=AAPL%2CMSFT&apiKey=KEY&_=1700000000"
/// );
/// ```
pub fn snapshot_url(
    base_url: &str,
    symbols: &[Symbol],
    api_key: &str,
    cache_buster: i64,
) -> Result<Url, String> {
    let mut url = Url::parse(base_url).map_err(|e| format!("{base_url}: {e}"))?;
    url.set_path(SNAPSHOT_PATH);

    let tickers = symbols
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",");

    url.query_pairs_mut()
        .append_pair("tickers", &tickers)
        .append_pair("apiKey", api_key)
        .append_pair("_", &cache_buster.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_url_single_ticker() {
        let url = snapshot_url(BASE_URL, &[Symbol::from("F")], "k", 42).unwrap();
        assert_eq!(url.path(), SNAPSHOT_PATH);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("tickers".to_string(), "F".to_string()),
                ("apiKey".to_string(), "k".to_string()),
                ("_".to_string(), "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_snapshot_url_keeps_case() {
        let url = snapshot_url(BASE_URL, &[Symbol::from("BRK.b")], "k", 1).unwrap();
        assert!(url.as_str().contains("tickers=BRK.b"));
    }

    #[test]
    fn test_snapshot_url_invalid_base() {
        assert!(snapshot_url("not a url", &[Symbol::from("F")], "k", 1).is_err());
    }
}
