use crate::config::CrawlConfig;
use crate::error::AppError;
use crate::models::{CrawlReport, DepartmentScan, FailedDepartment};
use crate::reporter::{CrawlEvent, CrawlReporter};
use crate::traits::{Fetcher, ScheduleParser};

/// Orchestrates the crawl: discover departments → fetch schedule + catalog
/// → scan → merge.
///
/// Generic over the fetcher and the parser, so the pipeline can be driven
/// by fixtures instead of the live site.
pub struct CrawlService<F, P>
where
    F: Fetcher,
    P: ScheduleParser,
{
    fetcher: F,
    parser: P,
    config: CrawlConfig,
}

impl<F, P> CrawlService<F, P>
where
    F: Fetcher,
    P: ScheduleParser,
{
    pub fn new(fetcher: F, parser: P, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            parser,
            config,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Fetch the schedule root page and return the department links on it.
    pub async fn discover_departments(&self) -> Result<Vec<String>, AppError> {
        tracing::debug!(url = %self.config.root_url, "Fetching schedule root");
        let html = self.fetcher.fetch(&self.config.root_url).await?;
        Ok(self.parser.department_links(&html))
    }

    /// Fetch and scan a single department.
    pub async fn scan_department(&self, link: &str) -> Result<DepartmentScan, AppError> {
        let schedule_url = self.config.schedule_url(link)?;
        let catalog_url = self.config.catalog_url_for(link)?;

        let schedule_html = self.fetcher.fetch(&schedule_url).await?;
        tracing::debug!(%schedule_url, bytes = schedule_html.len(), "Fetched schedule page");
        let catalog_html = self.fetcher.fetch(&catalog_url).await?;
        tracing::debug!(%catalog_url, bytes = catalog_html.len(), "Fetched catalog page");

        self.parser.scan_department(
            link,
            &schedule_html,
            &catalog_html,
            self.config.level_limit,
        )
    }

    /// Run the full crawl.
    ///
    /// A failing root page aborts the crawl. A failing department is reported
    /// and skipped, unless `strict` is set, in which case its error is returned.
    pub async fn crawl<R: CrawlReporter>(&self, reporter: &R) -> Result<CrawlReport, AppError> {
        let links = self.discover_departments().await?;
        reporter.report(CrawlEvent::LinksDiscovered { count: links.len() });

        let mut report = CrawlReport {
            departments_found: links.len(),
            ..CrawlReport::default()
        };

        for (index, link) in links.iter().enumerate() {
            reporter.report(CrawlEvent::DepartmentStarted {
                link,
                index,
                total: links.len(),
            });

            let scan = match self.scan_department(link).await {
                Ok(scan) => scan,
                Err(e) => {
                    let error = e.to_string();
                    reporter.report(CrawlEvent::DepartmentFailed {
                        link,
                        error: &error,
                    });
                    if self.config.strict {
                        return Err(e);
                    }
                    report.failed.push(FailedDepartment {
                        link: link.clone(),
                        error,
                    });
                    continue;
                }
            };

            reporter.report(CrawlEvent::DepartmentScanned { scan: &scan });
            report.departments_scanned += 1;

            for key in report.offerings.merge(scan.offerings) {
                reporter.report(CrawlEvent::KeyOverwritten { link, key: &key });
            }
        }

        reporter.report(CrawlEvent::Finished { report: &report });
        Ok(report)
    }
}
