use crate::application::orchestrator::{ChartOrchestrator, DashboardOptions, UpdateOutcome};
use crate::application::test_utils::{
    analytics, annotation, country, not_found, sample, series, server_error, Call, ScriptedApi,
};
use crate::domain::demography::GdpBucket;
use crate::domain::filter::{CaseType, FilterRequest, STANDARD_GROUP};
use crate::domain::health::{DataSourceHealth, HealthStatus, SourceHealth};
use crate::domain::metadata::CountryMetadata;
use crate::domain::panel::{EmptyReason, PanelError, PanelKind, PanelState, PanelStatus};
use crate::domain::types::DaysAhead;
use crate::domain::validation::ValidationError;
use std::sync::Arc;

fn orchestrator(api: ScriptedApi) -> (Arc<ScriptedApi>, Arc<ChartOrchestrator>) {
    let api = Arc::new(api);
    let orchestrator = Arc::new(ChartOrchestrator::new(api.clone(), DashboardOptions::default()));
    (api, orchestrator)
}

async fn run(orchestrator: &ChartOrchestrator, request: FilterRequest) -> UpdateOutcome {
    orchestrator.run_update_cycle(&request).await.unwrap()
}

#[tokio::test]
async fn test_empty_selection_requests_the_default_group() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let outcome = run(&orchestrator, FilterRequest::default()).await;

    let report = outcome.report().unwrap();
    assert_eq!(report.filter.countries().len(), STANDARD_GROUP.len());

    let calls = api.calls();
    for name in STANDARD_GROUP {
        assert!(calls.contains(&Call::DailyDeaths(name.to_string())));
        assert!(calls.contains(&Call::Summary {
            country: name.to_string(),
            case_type: CaseType::Deaths,
        }));
    }
    assert!(calls.contains(&Call::MortalityVsGdp(
        STANDARD_GROUP.iter().map(ToString::to_string).collect()
    )));
}

#[tokio::test]
async fn test_healthy_cycle_populates_every_cycle_panel() {
    let (_api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let outcome = run(&orchestrator, FilterRequest::for_year(2021)).await;

    let report = outcome.report().unwrap();
    for (kind, status) in &report.panels {
        assert_eq!(*status, PanelStatus::Populated, "{kind} was not populated");
    }
    assert_eq!(report.panels.len(), 5);
    assert!(!orchestrator.is_cycle_active());
}

#[tokio::test]
async fn test_failed_country_is_omitted_from_daily_chart() {
    let api = ScriptedApi::new()
        .with_daily("Germany", series("Germany", &[1, 2, 3]))
        .with_daily_error("France", server_error());
    let (_api, orchestrator) = orchestrator(api);

    run(
        &orchestrator,
        FilterRequest::default().with_countries(["Germany", "France"]),
    )
    .await;

    let state = orchestrator.view().daily_deaths.get();
    let chart = state.populated().unwrap();
    assert_eq!(chart.series().len(), 1);
    assert_eq!(chart.series()[0].country().as_ref(), "Germany");
}

#[tokio::test]
async fn test_every_country_failing_shows_no_data() {
    let api = ScriptedApi::new().with_daily_error("Germany", not_found("Country not found"));
    let (_api, orchestrator) = orchestrator(api);

    run(&orchestrator, FilterRequest::default().with_countries(["Germany"])).await;

    assert_eq!(
        orchestrator.view().daily_deaths.get(),
        PanelState::Empty(EmptyReason::NoData)
    );
}

#[tokio::test]
async fn test_unusable_mortality_blocks_dependants_only() {
    let samples = STANDARD_GROUP
        .iter()
        .map(|name| sample(name, None, Some(40_000.0), Some(50e6)))
        .collect();
    let api = ScriptedApi::healthy_defaults().with_mortality(Ok(analytics(samples)));
    let (api, orchestrator) = orchestrator(api);

    let outcome = run(&orchestrator, FilterRequest::default()).await;
    let report = outcome.report().unwrap();

    assert_eq!(report.status(PanelKind::MortalityAnalytics), Some(PanelStatus::Failed));
    assert_eq!(report.status(PanelKind::InfectionRate), Some(PanelStatus::Blocked));
    assert_eq!(report.status(PanelKind::Demographics), Some(PanelStatus::Blocked));
    assert_eq!(report.status(PanelKind::SummaryTable), Some(PanelStatus::Populated));
    assert_eq!(report.status(PanelKind::DailyDeaths), Some(PanelStatus::Populated));

    let blocked = orchestrator.view().infection_rate.get();
    assert_eq!(
        blocked.error(),
        Some(&PanelError::BlockedOnDependency {
            dependency: PanelKind::MortalityAnalytics
        })
    );

    // Derived panels never issued their own requests
    assert_eq!(
        api.count(|call| matches!(
            call,
            Call::Summary {
                case_type: CaseType::Confirmed,
                ..
            }
        )),
        0
    );
}

#[tokio::test]
async fn test_mortality_request_failure_blocks_dependants() {
    let api = ScriptedApi::healthy_defaults().with_mortality(Err(server_error()));
    let (_api, orchestrator) = orchestrator(api);

    run(&orchestrator, FilterRequest::default()).await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.mortality.message().unwrap(),
        "HTTP 500: Internal Server Error"
    );
    assert_eq!(snapshot.status(PanelKind::Demographics), PanelStatus::Blocked);
    assert_eq!(snapshot.status(PanelKind::InfectionRate), PanelStatus::Blocked);
}

#[tokio::test]
async fn test_demographics_always_has_three_buckets() {
    let (_api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    run(&orchestrator, FilterRequest::default()).await;

    let state = orchestrator.view().demographics.get();
    let breakdown = state.populated().unwrap();
    assert_eq!(breakdown.buckets().len(), 3);

    let low = breakdown.get(GdpBucket::Low);
    assert!(low.members.is_empty());
    assert_eq!(low.display_value(), "no data");

    let middle = breakdown.get(GdpBucket::Middle);
    assert_eq!(middle.members, vec![country("Spain")]);
    assert_eq!(middle.mean_deaths_per_100k, Some(103.0));

    assert_eq!(breakdown.get(GdpBucket::High).members.len(), 4);
}

#[tokio::test]
async fn test_infection_rate_uses_confirmed_totals_and_population() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    run(&orchestrator, FilterRequest::default()).await;

    let state = orchestrator.view().infection_rate.get();
    let chart = state.populated().unwrap();
    assert_eq!(chart.entries().len(), 5);

    let germany = chart
        .entries()
        .iter()
        .find(|entry| entry.country.as_ref() == "Germany")
        .unwrap();
    assert!((germany.per_100k - 1_000_000.0 / 83e6 * 100_000.0).abs() < 1e-9);

    assert_eq!(
        api.count(|call| matches!(
            call,
            Call::Summary {
                case_type: CaseType::Confirmed,
                ..
            }
        )),
        5
    );
}

#[tokio::test]
async fn test_countries_without_population_are_not_rated() {
    let samples = vec![
        sample("Germany", Some(100.0), Some(46_000.0), Some(83e6)),
        sample("France", Some(90.0), Some(40_000.0), None),
    ];
    let api = ScriptedApi::new()
        .with_mortality(Ok(analytics(samples)))
        .with_summary("Germany", CaseType::Confirmed, 830_000.0)
        .with_summary("France", CaseType::Confirmed, 670_000.0);
    let (api, orchestrator) = orchestrator(api);

    run(
        &orchestrator,
        FilterRequest::default().with_countries(["Germany", "France"]),
    )
    .await;

    let state = orchestrator.view().infection_rate.get();
    let chart = state.populated().unwrap();
    assert_eq!(chart.entries().len(), 1);
    assert_eq!(chart.entries()[0].country.as_ref(), "Germany");
    assert_eq!(
        api.count(|call| matches!(
            call,
            Call::Summary {
                case_type: CaseType::Confirmed,
                ..
            }
        )),
        1
    );
}

#[tokio::test]
async fn test_no_rows_anywhere_leaves_empty_states() {
    let samples = vec![sample("Germany", Some(100.0), Some(46_000.0), Some(83e6))];
    let api = ScriptedApi::new().with_mortality(Ok(analytics(samples)));
    let (_api, orchestrator) = orchestrator(api);

    run(&orchestrator, FilterRequest::default().with_countries(["Germany"])).await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.summary,
        PanelState::Empty(EmptyReason::NoSummaryRows)
    );
    assert_eq!(
        snapshot.infection_rate,
        PanelState::Empty(EmptyReason::NoValidRangeData)
    );
    assert_eq!(snapshot.status(PanelKind::MortalityAnalytics), PanelStatus::Populated);
}

#[tokio::test]
async fn test_summary_keeps_successful_rows() {
    let api = ScriptedApi::healthy_defaults().with_summary_error("Italy", CaseType::Deaths, server_error());
    let (_api, orchestrator) = orchestrator(api);

    run(&orchestrator, FilterRequest::default()).await;

    let state = orchestrator.view().summary.get();
    let table = state.populated().unwrap();
    assert_eq!(table.rows().len(), 4);
    assert!(table.row_for("Italy").is_none());
    assert!(table.row_for("germany").is_some());
}

#[tokio::test]
async fn test_invalid_filter_issues_no_requests_and_releases_the_cycle() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let error = orchestrator
        .run_update_cycle(&FilterRequest::for_year(1999))
        .await
        .unwrap_err();

    assert_eq!(error, ValidationError::YearOutOfRange(1999));
    assert_eq!(api.call_count(), 0);
    assert!(!orchestrator.is_cycle_active());

    let outcome = run(&orchestrator, FilterRequest::default()).await;
    assert!(!outcome.is_busy());
}

#[tokio::test]
async fn test_second_cycle_is_rejected_while_one_is_in_flight() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults().gated());

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run_update_cycle(&FilterRequest::default()).await })
    };

    // Five daily, one aggregate and five summary requests start together
    api.wait_for_calls(11).await;
    assert_eq!(api.in_flight(), 11);
    assert!(orchestrator.is_cycle_active());
    assert!(orchestrator.snapshot().daily_deaths.is_loading());

    let second = run(&orchestrator, FilterRequest::for_year(2022)).await;
    assert_eq!(second, UpdateOutcome::Busy);
    assert_eq!(api.call_count(), 11);

    api.open_gate();
    let first = first.await.unwrap().unwrap();
    assert!(!first.is_busy());
    assert!(api.max_in_flight() >= 11);
    assert_eq!(api.in_flight(), 0);

    let third = run(&orchestrator, FilterRequest::default()).await;
    assert!(!third.is_busy());
}

#[tokio::test]
async fn test_health_poll_is_idempotent() {
    let (_api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let first = orchestrator.poll_health().await;
    let before = orchestrator.snapshot();
    let second = orchestrator.poll_health().await;

    assert_eq!(first, second);
    assert_eq!(before, orchestrator.snapshot());
    assert!(first.populated().unwrap().is_healthy());
}

#[tokio::test]
async fn test_health_failure_only_touches_health_panel() {
    let api = ScriptedApi::healthy_defaults().with_health(Err(server_error()));
    let (_api, orchestrator) = orchestrator(api);
    run(&orchestrator, FilterRequest::default()).await;
    let before = orchestrator.snapshot();

    orchestrator.poll_health().await;

    let after = orchestrator.snapshot();
    assert_eq!(after.status(PanelKind::Health), PanelStatus::Failed);
    assert_eq!(after.daily_deaths, before.daily_deaths);
    assert_eq!(after.summary, before.summary);
}

#[tokio::test]
async fn test_degraded_health_is_still_shown() {
    let degraded = HealthStatus::new(
        SourceHealth::Up,
        SourceHealth::Down {
            reason: Some("connection refused".to_string()),
        },
    );
    let api = ScriptedApi::new().with_health(Ok(degraded.clone()));
    let (_api, orchestrator) = orchestrator(api);

    let state = orchestrator.poll_health().await;

    assert_eq!(state, PanelState::Populated(degraded));
    assert!(!state.populated().unwrap().is_healthy());
}

#[tokio::test]
async fn test_health_panel_shows_table_availability() {
    let verbose = HealthStatus::new(SourceHealth::Up, SourceHealth::Up)
        .with_data_source("ECDC_GLOBAL", DataSourceHealth::Available { row_count: 9_000 })
        .with_data_source(
            "WHO_SITUATION_REPORTS",
            DataSourceHealth::Unavailable { error: None },
        );
    let api = ScriptedApi::new().with_health(Ok(verbose));
    let (_api, orchestrator) = orchestrator(api);

    orchestrator.poll_health().await;

    let snapshot = orchestrator.snapshot();
    let health = snapshot.health.populated().unwrap();
    assert_eq!(health.data_sources.len(), 2);
    let missing: Vec<&str> = health.unavailable_data_sources().collect();
    assert_eq!(missing, vec!["WHO_SITUATION_REPORTS"]);
}

#[tokio::test]
async fn test_annotation_poll_is_idempotent_and_newest_first() {
    let api = ScriptedApi::new().with_annotations(Ok(vec![
        annotation("ada", "first wave", 9),
        annotation("grace", "second wave", 17),
    ]));
    let (_api, orchestrator) = orchestrator(api);

    let first = orchestrator.poll_annotations().await;
    let second = orchestrator.poll_annotations().await;

    assert_eq!(first, second);
    let feed = first.populated().unwrap();
    assert_eq!(feed.latest().unwrap().author.as_ref(), "grace");
}

#[tokio::test]
async fn test_no_annotations_is_an_empty_panel() {
    let (_api, orchestrator) = orchestrator(ScriptedApi::new());

    assert_eq!(
        orchestrator.poll_annotations().await,
        PanelState::Empty(EmptyReason::NoAnnotations)
    );
}

#[tokio::test]
async fn test_blank_author_is_rejected_without_a_request() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let error = orchestrator
        .submit_annotation("   ", "peak in March")
        .await
        .unwrap_err();

    assert!(error.is_validation());
    assert_eq!(error.to_string(), ValidationError::EmptyAuthor.to_string());
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_tag_is_rejected_without_a_request() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let error = orchestrator
        .submit_tagged_annotation("ada", "peak", ["second wave"])
        .await
        .unwrap_err();

    assert!(error.is_validation());
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_successful_submit_refreshes_annotations() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let id = orchestrator
        .submit_tagged_annotation("ada", "peak in March", ["wave-1", " "])
        .await
        .unwrap();

    assert_eq!(id.as_ref(), "65f0c0ffee");
    assert_eq!(api.calls(), vec![Call::CreateAnnotation, Call::ListAnnotations]);
    assert_eq!(orchestrator.snapshot().status(PanelKind::Annotations), PanelStatus::Populated);
}

#[tokio::test]
async fn test_failed_submit_is_reported_and_not_retried() {
    let api = ScriptedApi::healthy_defaults().with_create_result(Err(server_error()));
    let (api, orchestrator) = orchestrator(api);

    let error = orchestrator
        .submit_annotation("ada", "peak in March")
        .await
        .unwrap_err();

    assert!(!error.is_validation());
    assert_eq!(api.calls(), vec![Call::CreateAnnotation]);
}

#[tokio::test]
async fn test_forecast_is_populated_independently_of_cycles() {
    let (api, orchestrator) = orchestrator(ScriptedApi::healthy_defaults());

    let state = orchestrator
        .fetch_forecast(&country("Italy"), DaysAhead::parse(14).unwrap())
        .await;

    let prediction = state.populated().unwrap();
    assert_eq!(prediction.horizon(), 14);
    assert!(prediction.predictions().iter().all(|point| point.is_bracketed()));
    assert_eq!(api.forecast_calls(), vec![("Italy".to_string(), 14)]);
    assert_eq!(orchestrator.snapshot().status(PanelKind::DailyDeaths), PanelStatus::Loading);
}

#[tokio::test]
async fn test_forecast_failure_is_shown_on_the_panel() {
    let api = ScriptedApi::new().with_prediction(Err(not_found("Not enough data to forecast")));
    let (_api, orchestrator) = orchestrator(api);

    let state = orchestrator
        .fetch_forecast(&country("Germany"), DaysAhead::default())
        .await;

    assert_eq!(
        state.message().unwrap(),
        "HTTP 404: Not enough data to forecast"
    );
    assert_eq!(orchestrator.view().forecast.status(), PanelStatus::Failed);
}

#[tokio::test]
async fn test_metadata_upsert_passes_through() {
    let (api, orchestrator) = orchestrator(ScriptedApi::new());
    let metadata = CountryMetadata::new("Germany", 46_000.0, 83_000_000).unwrap();

    let outcome = orchestrator.upsert_country_metadata(&metadata).await.unwrap();

    assert!(outcome.was_inserted());
    assert_eq!(api.calls(), vec![Call::UpsertMetadata("Germany".to_string())]);
}
