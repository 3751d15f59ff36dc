use std::collections::BTreeMap;
use std::fmt;

/// Identity of a course offering: course id, credit and category.
///
/// Renders as `"{course} {credit} {category}"`, which is the key used in
/// the JSON output (e.g. `"math124 5 NW"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseKey {
    /// Course id as found in the schedule page anchor (e.g. "math124")
    pub course: String,
    /// Credit digit from the catalog, "0" when unknown
    pub credit: String,
    /// Category label from the header block, "N/A" when absent
    pub category: String,
}

impl CourseKey {
    pub fn new(
        course: impl Into<String>,
        credit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            course: course.into(),
            credit: credit.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.course, self.credit, self.category)
    }
}

/// In-person sections grouped by course.
///
/// Section lists keep the order in which sections were encountered and are
/// not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseOfferings {
    courses: BTreeMap<CourseKey, Vec<String>>,
}

impl CourseOfferings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section number to a course, creating the course entry on first use.
    pub fn push_section(&mut self, key: &CourseKey, sln: impl Into<String>) {
        self.courses.entry(key.clone()).or_default().push(sln.into());
    }

    /// Merge another set of offerings into this one.
    ///
    /// Colliding keys are overwritten by `other` (last writer wins). Returns the
    /// keys that were overwritten.
    pub fn merge(&mut self, other: CourseOfferings) -> Vec<CourseKey> {
        let mut overwritten = Vec::new();
        for (key, sections) in other.courses {
            if self.courses.contains_key(&key) {
                overwritten.push(key.clone());
            }
            self.courses.insert(key, sections);
        }
        overwritten
    }

    pub fn sections(&self, key: &CourseKey) -> Option<&[String]> {
        self.courses.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CourseKey, &[String])> {
        self.courses.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Total number of sections across all courses.
    pub fn section_count(&self) -> usize {
        self.courses.values().map(Vec::len).sum()
    }
}

/// Result of scanning a single department.
#[derive(Debug, Clone, Default)]
pub struct DepartmentScan {
    /// Department link relative to the schedule root (e.g. "math.html")
    pub link: String,
    pub offerings: CourseOfferings,
    /// Number of course header blocks processed
    pub courses_seen: usize,
    /// Course id whose level exceeded the ceiling and ended the scan
    pub stopped_at: Option<String>,
    /// Section blocks dropped because no course header preceded them
    pub orphan_sections: usize,
}

/// A department that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDepartment {
    pub link: String,
    pub error: String,
}

/// Outcome of a full crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub offerings: CourseOfferings,
    pub departments_found: usize,
    pub departments_scanned: usize,
    pub failed: Vec<FailedDepartment>,
}
