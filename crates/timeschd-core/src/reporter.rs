use crate::models::{CourseKey, CrawlReport, DepartmentScan};

/// Events emitted by the crawl for progress reporting.
#[derive(Debug, Clone)]
pub enum CrawlEvent<'a> {
    LinksDiscovered {
        count: usize,
    },
    DepartmentStarted {
        link: &'a str,
        index: usize,
        total: usize,
    },
    DepartmentScanned {
        scan: &'a DepartmentScan,
    },
    DepartmentFailed {
        link: &'a str,
        error: &'a str,
    },
    KeyOverwritten {
        link: &'a str,
        key: &'a CourseKey,
    },
    Finished {
        report: &'a CrawlReport,
    },
}

/// Trait for receiving crawl events (decoupled logging).
pub trait CrawlReporter: Send + Sync {
    fn report(&self, event: CrawlEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCrawlReporter;

impl CrawlReporter for TracingCrawlReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::LinksDiscovered { count } => {
                tracing::info!(%count, "Discovered department links");
            }
            CrawlEvent::DepartmentStarted { link, index, total } => {
                tracing::info!(%link, "Scanning department {}/{}", index + 1, total);
            }
            CrawlEvent::DepartmentScanned { scan } => {
                tracing::info!(
                    link = %scan.link,
                    courses = scan.offerings.len(),
                    sections = scan.offerings.section_count(),
                    stopped_at = ?scan.stopped_at,
                    "Department scanned"
                );
                if scan.orphan_sections > 0 {
                    tracing::warn!(
                        link = %scan.link,
                        orphans = scan.orphan_sections,
                        "Dropped section blocks without a course header"
                    );
                }
            }
            CrawlEvent::DepartmentFailed { link, error } => {
                tracing::warn!(%link, %error, "Department skipped");
            }
            CrawlEvent::KeyOverwritten { link, key } => {
                tracing::warn!(%link, %key, "Course key overwritten by later department");
            }
            CrawlEvent::Finished { report } => {
                tracing::info!(
                    scanned = report.departments_scanned,
                    failed = report.failed.len(),
                    courses = report.offerings.len(),
                    sections = report.offerings.section_count(),
                    "Crawl finished"
                );
            }
        }
    }
}
