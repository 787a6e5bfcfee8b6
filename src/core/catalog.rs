//! The fixed list of ETFs the tool knows about.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Etf {
    pub ticker: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_SELECTION: [&str; 2] = ["FXI", "SPY"];

pub const CATALOG: &[Etf] = &[
    Etf { ticker: "FXI", description: "iShares China Large-Cap ETF (large Chinese companies)" },
    Etf { ticker: "EWT", description: "iShares MSCI Taiwan ETF (Taiwanese market)" },
    Etf { ticker: "IWM", description: "iShares Russell 2000 ETF (US small caps)" },
    Etf { ticker: "EWZ", description: "iShares MSCI Brazil ETF (Brazilian market)" },
    Etf { ticker: "EWU", description: "iShares MSCI United Kingdom ETF (UK market)" },
    Etf { ticker: "XLF", description: "Financial Select Sector SPDR Fund (US financials)" },
    Etf { ticker: "BKF", description: "iShares MSCI BRIC ETF (Brazil, Russia, India, China)" },
    Etf { ticker: "EWY", description: "iShares MSCI South Korea ETF (South Korean market)" },
    Etf { ticker: "AGG", description: "iShares Core U.S. Aggregate Bond ETF (US aggregate bonds)" },
    Etf { ticker: "EEM", description: "iShares MSCI Emerging Markets ETF (emerging markets)" },
    Etf { ticker: "EZU", description: "iShares MSCI Eurozone ETF (Eurozone)" },
    Etf { ticker: "GLD", description: "SPDR Gold Trust (gold)" },
    Etf { ticker: "QQQ", description: "Invesco QQQ Trust (NASDAQ 100, US technology)" },
    Etf { ticker: "AAXJ", description: "iShares MSCI All Country Asia ex Japan ETF (Asia excluding Japan)" },
    Etf { ticker: "SHY", description: "iShares 1-3 Year Treasury Bond ETF (short-term Treasuries)" },
    Etf { ticker: "ACWI", description: "iShares MSCI ACWI ETF (global developed and emerging markets)" },
    Etf { ticker: "SLV", description: "iShares Silver Trust (silver)" },
    Etf { ticker: "EWH", description: "iShares MSCI Hong Kong ETF (Hong Kong market)" },
    Etf { ticker: "SPY", description: "SPDR S&P 500 ETF Trust (S&P 500, US market)" },
    Etf { ticker: "EWJ", description: "iShares MSCI Japan ETF (Japanese market)" },
    Etf { ticker: "IBGL", description: "iShares International Treasury Bond ETF (international bonds)" },
    Etf { ticker: "DIA", description: "SPDR Dow Jones Industrial Average ETF Trust (Dow Jones)" },
    Etf { ticker: "EWQ", description: "iShares MSCI France ETF (French market)" },
    Etf { ticker: "XOP", description: "SPDR S&P Oil & Gas Exploration & Production ETF (oil and gas E&P)" },
    Etf { ticker: "VWO", description: "Vanguard FTSE Emerging Markets ETF (emerging markets)" },
    Etf { ticker: "EWA", description: "iShares MSCI Australia ETF (Australian market)" },
    Etf { ticker: "EWC", description: "iShares MSCI Canada ETF (Canadian market)" },
    Etf { ticker: "ILF", description: "iShares Latin America 40 ETF (Latin American market)" },
    Etf { ticker: "XLV", description: "Health Care Select Sector SPDR Fund (US health care)" },
    Etf { ticker: "EWG", description: "iShares MSCI Germany ETF (German market)" },
    Etf { ticker: "ITB", description: "iShares U.S. Home Construction ETF (US home construction)" },
];

pub fn lookup(ticker: &str) -> Option<&'static Etf> {
    CATALOG
        .iter()
        .find(|etf| etf.ticker.eq_ignore_ascii_case(ticker))
}

pub fn is_supported(ticker: &str) -> bool {
    lookup(ticker).is_some()
}

pub fn default_selection() -> Vec<String> {
    DEFAULT_SELECTION.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_unique_tickers() {
        let unique: HashSet<&str> = CATALOG.iter().map(|e| e.ticker).collect();
        assert_eq!(unique.len(), CATALOG.len());
        assert_eq!(CATALOG.len(), 31);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("spy").unwrap().ticker, "SPY");
        assert!(is_supported("GLD"));
        assert!(!is_supported("AAPL"));
    }

    #[test]
    fn test_default_selection_is_in_catalog() {
        assert!(default_selection().iter().all(|t| is_supported(t)));
    }
}
