use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use timeschd_core::error::AppError;
use timeschd_core::reporter::{CrawlEvent, CrawlReporter};
use timeschd_core::traits::Fetcher;

pub const ROOT: &str = "https://www.washington.edu/students/timeschd/AUT2020/";
pub const CATALOG: &str = "http://www.washington.edu/students/crscat/";

/// Fetcher serving a fixed site from memory; unknown URLs are 404s.
#[derive(Clone)]
pub struct FixtureSite {
    pages: Arc<HashMap<String, String>>,
}

impl FixtureSite {
    pub fn new(pages: &[(String, String)]) -> Self {
        Self {
            pages: Arc::new(pages.iter().cloned().collect()),
        }
    }
}

impl Fetcher for FixtureSite {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

/// Reporter collecting the links of failed departments.
#[derive(Default)]
pub struct FailureLog {
    pub failed: Mutex<Vec<String>>,
}

impl CrawlReporter for FailureLog {
    fn report(&self, event: CrawlEvent<'_>) {
        if let CrawlEvent::DepartmentFailed { link, .. } = event {
            self.failed.lock().unwrap().push(link.to_string());
        }
    }
}

pub fn root_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<li><a href="{l}">{l}</a></li>"#))
        .collect();
    format!(
        r#"<html><body><h1>Autumn Quarter 2020 Time Schedule</h1>
        <a href="/students/timeschd/">Time Schedule home</a>
        <a href="help.php">Help</a>
        <ul>{anchors}</ul></body></html>"#
    )
}

pub fn header(course: &str, title: &str, category: Option<&str>) -> String {
    let category = category
        .map(|c| format!("<td width=\"15%\"><b>({c})</b></td>"))
        .unwrap_or_default();
    format!(
        r##"<table bgcolor="#ffcccc" width="100%"><tr>
        <td width="50%"><b><a name="{course}">{course}</a>&nbsp;<a href="/students/crscat/dept.html#{course}">{title}</a></b></td>
        {category}
        </tr></table>"##
    )
}

/// A section block. `remote` puts the remote marker after the SLN anchor.
pub fn section(sln: &str, remote: bool) -> String {
    let days = if remote { "VIA REMOTE" } else { "MWF 1030-1120" };
    format!(
        r#"<table width="100%"><tr><td><pre>
       <a href="https://sdb.admin.uw.edu/timeschd/uwnetid/sln.asp?QTRYR=AUT+2020&SLN={sln}">{sln}</a> A  5      {days}  <a href="http://www.washington.edu/students/maps/map.cgi?KNE">KNE</a> 120      Doe,Jane  Open      0/ 200
</pre></td></tr></table>"#
    )
}

pub fn schedule_page(blocks: &[String]) -> String {
    format!(
        r#"<html><body>
        <table width="100%"><tr><td>Autumn 2020</td></tr></table>
        <table width="100%"><tr><td>Enrl Restrictions legend</td></tr></table>
        {}
        </body></html>"#,
        blocks.concat()
    )
}

pub fn catalog_page(entries: &[(&str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(course, title)| format!(r#"<a name="{course}"><p><b>{title}</b><br>Description.</p></a>"#))
        .collect();
    format!("<html><body>{body}</body></html>")
}
