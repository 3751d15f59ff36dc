use timeschd_client::HtmlScheduleParser;
use timeschd_core::config::CrawlConfig;
use timeschd_core::crawl::CrawlService;
use timeschd_core::error::AppError;
use timeschd_core::export;
use timeschd_core::models::CourseKey;
use timeschd_core::reporter::TracingCrawlReporter;

use crate::common::*;

fn site() -> FixtureSite {
    let math = schedule_page(&[
        header("math124", "CALC ANALYT GEOM I", Some("NW")),
        section("18000", false),
        section("18001", true),
        section("18002", false),
        header("math126", "CALC ANALYT GEOM III", Some("NW")),
        section("18100", true),
        header("math581", "SEMINAR", None),
        section("18900", false),
    ]);
    let math_catalog = catalog_page(&[
        ("math124", "MATH 124 Calculus with Analytic Geometry I (5) NW"),
        ("math126", "MATH 126 Calculus with Analytic Geometry III (5) NW"),
    ]);

    let cse = schedule_page(&[
        header("cse142", "COMPUTER PRGRMNG I", Some("NW")),
        section("12345", false),
        header("cse190", "CURRENT TOPICS", None),
        section("12400", false),
    ]);
    let cse_catalog = catalog_page(&[("cse142", "CSE 142 Computer Programming I (4) NW, QSR")]);

    FixtureSite::new(&[
        (ROOT.to_string(), root_page(&["math.html", "cse.html", "phil.html"])),
        (format!("{ROOT}math.html"), math),
        (format!("{CATALOG}math.html"), math_catalog),
        (format!("{ROOT}cse.html"), cse),
        (format!("{CATALOG}cse.html"), cse_catalog),
        // phil.html is missing from the site and fails with a 404
    ])
}

#[tokio::test]
async fn crawl_collects_in_person_sections_across_departments() {
    let svc = CrawlService::new(site(), HtmlScheduleParser::new(), CrawlConfig::default());
    let reporter = FailureLog::default();

    let report = svc.crawl(&reporter).await.unwrap();

    assert_eq!(report.departments_found, 3);
    assert_eq!(report.departments_scanned, 2);
    assert_eq!(*reporter.failed.lock().unwrap(), vec!["phil.html"]);

    let offerings = &report.offerings;
    assert_eq!(
        offerings
            .sections(&CourseKey::new("math124", "5", "NW"))
            .unwrap(),
        &["18000", "18002"]
    );
    // math126 only has a remote section, math581 is above the level ceiling
    assert_eq!(offerings.len(), 3);
    assert_eq!(
        offerings.sections(&CourseKey::new("cse142", "4", "NW")).unwrap(),
        &["12345"]
    );
    assert_eq!(
        offerings.sections(&CourseKey::new("cse190", "0", "N/A")).unwrap(),
        &["12400"]
    );
}

#[tokio::test]
async fn crawl_writes_json_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = CrawlConfig {
        json_path: dir.path().join("data.json"),
        csv_path: dir.path().join("data.csv"),
        ..CrawlConfig::default()
    };
    let svc = CrawlService::new(site(), HtmlScheduleParser::new(), config.clone());

    let report = svc.crawl(&TracingCrawlReporter).await.unwrap();
    export::write_outputs(&report.offerings, &config.json_path, &config.csv_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.json_path).unwrap()).unwrap();
    assert_eq!(
        json["math124 5 NW"],
        serde_json::json!(["18000", "18002"])
    );
    assert_eq!(json["cse190 0 N/A"], serde_json::json!(["12400"]));

    let csv = std::fs::read_to_string(&config.csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert!(csv.starts_with("course_num,credits,type,SLN\r\n"));
    assert_eq!(lines[0], "course_num,credits,type,SLN");
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines.contains(&"math124,5,NW,18002"));
    assert!(lines.contains(&"cse190,0,N/A,12400"));
}

#[tokio::test]
async fn lower_level_limit_drops_upper_division() {
    let config = CrawlConfig {
        level_limit: 140,
        ..CrawlConfig::default()
    };
    let svc = CrawlService::new(site(), HtmlScheduleParser::new(), config);

    let report = svc.crawl(&FailureLog::default()).await.unwrap();

    assert!(report
        .offerings
        .sections(&CourseKey::new("cse190", "0", "N/A"))
        .is_none());
    assert!(report
        .offerings
        .sections(&CourseKey::new("math124", "5", "NW"))
        .is_some());
}

#[tokio::test]
async fn strict_crawl_fails_on_missing_department() {
    let config = CrawlConfig {
        strict: true,
        ..CrawlConfig::default()
    };
    let svc = CrawlService::new(site(), HtmlScheduleParser::new(), config);

    let err = svc.crawl(&FailureLog::default()).await.unwrap_err();

    assert!(matches!(err, AppError::HttpError(_)));
    assert!(err.to_string().contains("phil.html"));
}

#[tokio::test]
async fn single_department_scan() {
    let svc = CrawlService::new(site(), HtmlScheduleParser::new(), CrawlConfig::default());

    let scan = svc.scan_department("math.html").await.unwrap();

    assert_eq!(scan.courses_seen, 2);
    assert_eq!(scan.stopped_at.as_deref(), Some("math581"));
    assert_eq!(scan.offerings.section_count(), 2);
}
