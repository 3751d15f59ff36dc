pub mod config;
pub mod crawl;
pub mod error;
pub mod export;
pub mod models;
pub mod reporter;
pub mod throttle;
pub mod traits;


pub use config::CrawlConfig;
pub use crawl::CrawlService;
pub use error::AppError;
pub use models::{CourseKey, CourseOfferings, CrawlReport, DepartmentScan};
pub use reporter::{CrawlEvent, CrawlReporter, TracingCrawlReporter};
pub use throttle::{ThrottleConfig, ThrottledFetcher};
pub use traits::{Fetcher, ScheduleParser};
