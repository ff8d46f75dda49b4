pub mod cache;
pub mod error;
pub mod gateway;
mod harvester;
mod serp;
mod site;

pub use cache::{CacheScope, CacheStore, FingerprintCache, MemoryCacheStore, PgCacheStore};
pub use error::{CacheError, HarvestError, Result};
pub use gateway::{BrowserGateway, CaptchaGuard, ConcurrencyLimit, Fetchers, PageFetcher};
pub use harvester::{Harvester, PageContent, PageSeo};
