//! Time-schedule HTML parsing.
//!
//! A department schedule page is a flat run of `<table width="100%">`
//! blocks. Pink (`bgcolor="#ffcccc"`) blocks are course headers; every
//! other block is a section of the last header seen. Credits are not on the
//! schedule page and come from the department's course catalog page.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use timeschd_core::error::AppError;
use timeschd_core::models::{CourseKey, DepartmentScan};
use timeschd_core::traits::ScheduleParser;

/// Leading blocks of a schedule page that precede the course listing.
const SKIPPED_BLOCKS: usize = 2;
const HEADER_BGCOLOR: &str = "#ffcccc";
const REMOTE_MARKER: &str = "VIA REMOTE";
const UNKNOWN_CREDIT: &str = "0";
const UNKNOWN_CATEGORY: &str = "N/A";

static DEPARTMENT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]*\.html").unwrap());
static CREDIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d).*\)").unwrap());

static BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"table[width="100%"]"#).unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static HREF_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static NAMED_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[name]").unwrap());
static MAP_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="maps"]"#).unwrap());
static BOLD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b").unwrap());
static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").unwrap());

/// [`ScheduleParser`] backed by the `scraper` HTML parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlScheduleParser;

impl HtmlScheduleParser {
    pub fn new() -> Self {
        Self
    }
}

impl ScheduleParser for HtmlScheduleParser {
    fn department_links(&self, root_html: &str) -> Vec<String> {
        department_links(root_html)
    }

    fn scan_department(
        &self,
        link: &str,
        schedule_html: &str,
        catalog_html: &str,
        level_limit: u32,
    ) -> Result<DepartmentScan, AppError> {
        scan_department(link, schedule_html, catalog_html, level_limit)
    }
}

/// Links to department pages (`math.html`, `cse.html`, ...) in the order
/// they first appear on the root page.
pub fn department_links(root_html: &str) -> Vec<String> {
    let root = Html::parse_document(root_html);
    let mut seen = HashSet::new();

    root.select(&HREF_ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| DEPARTMENT_LINK_RE.is_match(href))
        .filter(|href| seen.insert(*href))
        .map(str::to_string)
        .collect()
}

/// Walk a department's schedule page and collect its in-person sections.
pub fn scan_department(
    link: &str,
    schedule_html: &str,
    catalog_html: &str,
    level_limit: u32,
) -> Result<DepartmentScan, AppError> {
    let schedule = Html::parse_document(schedule_html);
    let catalog = Html::parse_document(catalog_html);

    let mut scan = DepartmentScan {
        link: link.to_string(),
        ..DepartmentScan::default()
    };
    let mut current: Option<CourseKey> = None;

    for block in schedule.select(&BLOCK).skip(SKIPPED_BLOCKS) {
        if is_course_header(block) {
            let course = course_id(block).ok_or_else(|| {
                AppError::ParseError(format!("{link}: course header without a named anchor"))
            })?;
            let level = course_level(&course).ok_or_else(|| {
                AppError::ParseError(format!("{link}: no numeric level in course id '{course}'"))
            })?;

            tracing::debug!(%course, "Current course");
            // Courses are listed in ascending order
            if level > level_limit {
                scan.stopped_at = Some(course);
                break;
            }

            scan.courses_seen += 1;
            let credit = credit_for(&catalog, &course);
            let category = category_for(block);
            current = Some(CourseKey::new(course, credit, category));
        } else if is_in_person(block) {
            let Some(key) = &current else {
                scan.orphan_sections += 1;
                continue;
            };
            match section_number(block) {
                Some(sln) => scan.offerings.push_section(key, sln),
                None => tracing::debug!(course = %key.course, "In-person section without SLN"),
            }
        }
    }

    Ok(scan)
}

fn is_course_header(block: ElementRef<'_>) -> bool {
    block
        .value()
        .attr("bgcolor")
        .is_some_and(|color| color.eq_ignore_ascii_case(HEADER_BGCOLOR))
}

fn course_id(header: ElementRef<'_>) -> Option<String> {
    header
        .select(&NAMED_ANCHOR)
        .next()
        .and_then(|a| a.value().attr("name"))
        .map(str::to_string)
}

/// Level of a course id: its last three characters, e.g. `"math124"` → 124.
fn course_level(course: &str) -> Option<u32> {
    let start = course.char_indices().rev().nth(2).map_or(0, |(i, _)| i);
    course[start..].parse().ok()
}

fn section_number(section: ElementRef<'_>) -> Option<String> {
    let sln = section.select(&ANCHOR).next()?.text().collect::<String>();
    let sln = sln.trim();
    (!sln.is_empty()).then(|| sln.to_string())
}

/// Credit of `course` from its catalog entry: the first digit of the
/// parenthesised part of the entry's bold title, `"0"` when not found.
///
/// `MATH 124 Calculus with Analytic Geometry I (5) NW` → `"5"`.
pub fn credit_for(catalog: &Html, course: &str) -> String {
    catalog
        .select(&NAMED_ANCHOR)
        .find(|a| a.value().attr("name") == Some(course))
        .and_then(|a| a.select(&BOLD).next())
        .and_then(|b| {
            let title = b.text().collect::<String>();
            CREDIT_RE.captures(&title).map(|caps| caps[1].to_string())
        })
        .unwrap_or_else(|| UNKNOWN_CREDIT.to_string())
}

/// Category label of a course header: the second bold element without its
/// enclosing characters, `(NW)` → `NW`. `"N/A"` when there is none.
pub fn category_for(header: ElementRef<'_>) -> String {
    let Some(bold) = header.select(&BOLD).nth(1) else {
        return UNKNOWN_CATEGORY.to_string();
    };
    let text = bold.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        return UNKNOWN_CATEGORY.to_string();
    }

    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// A section is in person when it links to a campus map and its `<pre>`
/// has no remote marker in the 3rd or 5th content position.
pub fn is_in_person(section: ElementRef<'_>) -> bool {
    if section.select(&MAP_ANCHOR).next().is_none() {
        return false;
    }
    let Some(pre) = section.select(&PRE).next() else {
        return false;
    };

    let contents = pre_contents(pre);
    let remote_at = |i: usize| contents.get(i).is_some_and(|c| c.contains(REMOTE_MARKER));
    !(remote_at(2) || remote_at(4))
}

/// Child nodes of a `<pre>` as text, elements contributing their inner text.
///
/// The parser drops the newline that may open a `<pre>`, which would leave a
/// line starting with an anchor without its leading text node. An empty one
/// is put back so positions always alternate text, element, text, ...
fn pre_contents(pre: ElementRef<'_>) -> Vec<String> {
    let mut contents: Vec<String> = pre
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(String::from(&**text)),
            Node::Element(_) => ElementRef::wrap(child).map(|el| el.text().collect()),
            Node::Comment(_) => Some(String::new()),
            _ => None,
        })
        .collect();

    if pre.first_child().is_some_and(|child| child.value().is_element()) {
        contents.insert(0, String::new());
    }
    contents
}
