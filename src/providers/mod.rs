pub mod caching;
pub mod util;
pub mod yahoo_finance;

pub use caching::CachingSeriesFetcher;
pub use yahoo_finance::YahooFinanceProvider;
