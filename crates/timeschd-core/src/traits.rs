use std::future::Future;

use crate::error::AppError;
use crate::models::DepartmentScan;

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns time-schedule pages into links and course offerings.
pub trait ScheduleParser: Send + Sync + Clone {
    /// Relative links to the department pages listed on the schedule root page.
    fn department_links(&self, root_html: &str) -> Vec<String>;

    /// Scan one department's schedule page, resolving credits against its
    /// catalog page. Courses whose level exceeds `level_limit` end the scan.
    fn scan_department(
        &self,
        link: &str,
        schedule_html: &str,
        catalog_html: &str,
        level_limit: u32,
    ) -> Result<DepartmentScan, AppError>;
}
