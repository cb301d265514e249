//! Pipeline-level integration tests
//!
//! Drives the full orchestrator against a local stub of the upstream
//! sources. The stub intentionally fails one source to exercise the
//! degrade-don't-abort contract: a broken source fails its own phase
//! and nothing else.

use axum::routing::get;
use axum::Router;
use springdex_common::config::SourceEndpoints;
use springdex_common::events::EventBus;
use springdex_sync::db::schema::initialize_schema;
use springdex_sync::db::{compatibility, projects, versions};
use springdex_sync::sync::ComprehensiveSync;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const METADATA: &str = r#"{
    "bootVersion": {
        "default": "3.5.0",
        "values": [
            {"id": "4.0.0-SNAPSHOT", "name": "4.0.0 (SNAPSHOT)"},
            {"id": "3.5.0", "name": "3.5.0"},
            {"id": "3.4.6", "name": "3.4.6"}
        ]
    }
}"#;

const PROJECT_INDEX: &str = r#"{
    "projects": [
        {"slug": "spring-data", "name": "Spring Data",
         "description": "Data access family", "versions": []},
        {"slug": "spring-data-jpa", "name": "Spring Data JPA",
         "versions": ["3.6.0", "3.6.1"]}
    ]
}"#;

const BOOT_PAGE: &str = r#"{
    "documentation": [
        {"version": "3.5.0", "refDocUrl": "https://docs.spring.io/spring-boot/3.5.0/reference",
         "apiDocUrl": "https://docs.spring.io/spring-boot/3.5.0/api",
         "current": true, "status": "GENERAL_AVAILABILITY"}
    ],
    "support": {
        "generations": [
            {"generation": "3.5.x", "initialRelease": "2025-05",
             "ossSupportEnd": "2026-06", "enterpriseSupportEnd": "2027-08"}
        ]
    }
}"#;

const EMPTY_PAGE: &str = r#"{"documentation": [], "support": {"generations": []}}"#;

const NAV_HTML: &str = r#"
    <nav class="projects-nav">
      <li class="has-children">
        <a href="/projects/spring-data">Spring Data</a>
        <ul><li><a href="/projects/spring-data-jpa">Spring Data JPA</a></li></ul>
      </li>
    </nav>
"#;

const GUIDES: &str = r#"{
    "guides": [
        {"title": "Building a RESTful Web Service",
         "url": "https://spring.io/guides/gs/rest-service",
         "project": "spring-boot",
         "description": "REST with Spring Boot"}
    ]
}"#;

const REPOS: &str = r#"[
    {"name": "gs-rest-service", "html_url": "https://github.com/spring-guides/gs-rest-service",
     "description": "REST service sample", "archived": false}
]"#;

/// Serve stub payloads for every source except generations, which
/// always answers 500
async fn spawn_stub_sources() -> SocketAddr {
    async fn project_file(
        axum::extract::Path(file): axum::extract::Path<String>,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;
        match file.as_str() {
            "index.json" => PROJECT_INDEX.into_response(),
            "spring-boot.json" => BOOT_PAGE.into_response(),
            _ => EMPTY_PAGE.into_response(),
        }
    }

    let app = Router::new()
        .route("/metadata/client", get(|| async { METADATA }))
        .route(
            "/generations",
            get(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "generations source is down",
                )
            }),
        )
        .route("/projects", get(|| async { axum::response::Html(NAV_HTML) }))
        .route("/projects/:file", get(project_file))
        .route("/guides/index.json", get(|| async { GUIDES }))
        .route("/repos", get(|| async { REPOS }))
        .route(
            "/docs/:slug/index.html",
            get(|axum::extract::Path(slug): axum::extract::Path<String>| async move {
                format!("<html>documentation for {}</html>", slug)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    addr
}

fn endpoints_for(addr: SocketAddr) -> SourceEndpoints {
    let base = format!("http://{}", addr);
    SourceEndpoints {
        metadata_url: format!("{}/metadata/client", base),
        generations_url: format!("{}/generations", base),
        project_page_url: format!("{}/projects", base),
        navigation_url: format!("{}/projects", base),
        guides_url: format!("{}/guides/index.json", base),
        repos_url: format!("{}/repos", base),
        docs_url: format!("{}/docs", base),
        fetch_timeout_secs: 5,
    }
}

fn unreachable_endpoints() -> SourceEndpoints {
    // Port 1 refuses connections immediately
    SourceEndpoints {
        metadata_url: "http://127.0.0.1:1/metadata/client".to_string(),
        generations_url: "http://127.0.0.1:1/generations".to_string(),
        project_page_url: "http://127.0.0.1:1/projects".to_string(),
        navigation_url: "http://127.0.0.1:1/projects".to_string(),
        guides_url: "http://127.0.0.1:1/guides/index.json".to_string(),
        repos_url: "http://127.0.0.1:1/repos".to_string(),
        docs_url: "http://127.0.0.1:1/docs".to_string(),
        fetch_timeout_secs: 5,
    }
}

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    initialize_schema(&pool).await.expect("schema init");
    pool
}

#[tokio::test]
async fn failing_source_fails_only_its_own_phase() {
    let addr = spawn_stub_sources().await;
    let pool = memory_pool().await;

    let sync = ComprehensiveSync::new(pool.clone(), EventBus::new(100), &endpoints_for(addr))
        .expect("sync init");

    let result = sync.run(Uuid::new_v4(), CancellationToken::new()).await;

    assert_eq!(result.phases.len(), 7);
    assert!(result.phases[0].success, "anchor phase should succeed");
    assert!(!result.phases[1].success, "generations phase must fail");
    for phase in &result.phases[2..] {
        assert!(phase.success, "phase {} should succeed", phase.phase);
    }

    // Overall success is the AND of phase successes
    assert!(!result.success);

    // The healthy sources still landed their data
    assert!(projects::project_exists(&pool, "spring-boot").await.unwrap());
    assert!(projects::project_exists(&pool, "spring-data-jpa").await.unwrap());

    let boot_latest = versions::load_version(&pool, "spring-boot", "3.5.0")
        .await
        .unwrap()
        .unwrap();
    assert!(boot_latest.is_latest);
    assert!(boot_latest.is_default);
    assert_eq!(boot_latest.release_date.as_deref(), Some("2025-05"));
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let addr = spawn_stub_sources().await;
    let pool = memory_pool().await;

    let sync = ComprehensiveSync::new(pool.clone(), EventBus::new(100), &endpoints_for(addr))
        .expect("sync init");

    let first = sync.run(Uuid::new_v4(), CancellationToken::new()).await;
    assert!(first.created > 0, "first run must create rows");

    let second = sync.run(Uuid::new_v4(), CancellationToken::new()).await;
    assert_eq!(
        second.created, 0,
        "unchanged upstream data must not create anything on re-run"
    );
    assert_eq!(second.phases.len(), 7);
}

#[tokio::test]
async fn every_source_down_still_produces_full_result() {
    let pool = memory_pool().await;

    let sync = ComprehensiveSync::new(pool.clone(), EventBus::new(100), &unreachable_endpoints())
        .expect("sync init");

    let result = sync.run(Uuid::new_v4(), CancellationToken::new()).await;

    // Degrade, don't abort: all seven phases ran and reported
    assert_eq!(result.phases.len(), 7);
    assert!(!result.success);

    // Fetch-driven phases fail; the crawl phases over an empty registry
    // legitimately succeed with zero work
    assert!(!result.phases[0].success);
    assert!(!result.phases[1].success);
    assert!(!result.phases[2].success);
    assert!(result.phases[3].success);
    assert!(!result.phases[4].success);
    assert!(result.phases[5].success);
    assert!(!result.phases[6].success);

    assert_eq!(compatibility::count_links(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn cancellation_stops_at_phase_boundary() {
    let addr = spawn_stub_sources().await;
    let pool = memory_pool().await;

    let sync = ComprehensiveSync::new(pool.clone(), EventBus::new(100), &endpoints_for(addr))
        .expect("sync init");

    let token = CancellationToken::new();
    token.cancel();

    let result = sync.run(Uuid::new_v4(), token).await;

    assert!(result.cancelled);
    assert!(!result.success);
    assert!(result.phases.is_empty());
    assert!(!projects::project_exists(&pool, "spring-boot").await.unwrap());
}

#[tokio::test]
async fn progress_events_reach_subscribers() {
    use springdex_common::events::SyncEvent;

    let addr = spawn_stub_sources().await;
    let pool = memory_pool().await;

    let bus = EventBus::new(500);
    let mut rx = bus.subscribe();

    let sync =
        ComprehensiveSync::new(pool, bus, &endpoints_for(addr)).expect("sync init");
    let run_id = Uuid::new_v4();
    let result = sync.run(run_id, CancellationToken::new()).await;
    assert_eq!(result.phases.len(), 7);

    // First event announces the run, then phases alternate start/complete,
    // then the run completes: 1 + 7*2 + 1 events
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 16);

    assert!(matches!(events[0], SyncEvent::SyncStarted { run_id: id, .. } if id == run_id));
    assert!(matches!(events[15], SyncEvent::SyncCompleted { success: false, .. }));

    let completed_phases = events
        .iter()
        .filter(|e| matches!(e, SyncEvent::PhaseCompleted { .. }))
        .count();
    assert_eq!(completed_phases, 7);
}
