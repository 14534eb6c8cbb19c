//! Query dispatch tests through the public service surface.
//!
//! Run: cargo nextest run --test query_dispatch_tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use plugin_services::dashboards::MemoryDashboardStore;
use plugin_services::prelude::*;
use plugin_services::query::DataSubQuery;
use serde_json::json;

/// Answers every sub-query with one frame tagged by `label`.
struct EchoHandler {
    label: &'static str,
}

#[async_trait]
impl QueryHandler for EchoHandler {
    async fn data_query(
        &self,
        ctx: &QueryContext,
        data_source: &DataSource,
        query: &DataQuery,
    ) -> std::result::Result<DataResponse, QueryError> {
        ctx.check()?;
        Ok(query
            .ref_ids()
            .map(|ref_id| {
                QueryResult::new(ref_id).with_frame(json!({
                    "handler": self.label,
                    "datasource": data_source.name,
                }))
            })
            .collect())
    }
}

/// Sleeps before answering, observing the caller's context.
struct SlowHandler(Duration);

#[async_trait]
impl QueryHandler for SlowHandler {
    async fn data_query(
        &self,
        ctx: &QueryContext,
        _data_source: &DataSource,
        _query: &DataQuery,
    ) -> std::result::Result<DataResponse, QueryError> {
        ctx.run(async {
            tokio::time::sleep(self.0).await;
            Ok(DataResponse::default())
        })
        .await
    }
}

fn query(ref_ids: &[&str]) -> DataQuery {
    DataQuery::new(
        ref_ids
            .iter()
            .map(|id| DataSubQuery::new(*id, json!({"expr": "up"})))
            .collect(),
    )
}

fn services(plugins: Arc<PluginManager>) -> PluginServices {
    PluginServices::builder()
        .plugins(plugins)
        .store(Arc::new(MemoryDashboardStore::new()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_live_handler_wins_over_factory() {
    let plugins = Arc::new(PluginManager::new());
    plugins.register_live_handler("prometheus", Arc::new(EchoHandler { label: "live" }));
    let services = services(Arc::clone(&plugins));
    services.register_query_handler("prometheus", |_| {
        panic!("factory consulted despite a live handler")
    });

    let ds = DataSource::new("Prod", "prometheus");
    let response = services
        .handle_request(&QueryContext::new(), &ds, &query(&["A", "B"]))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 2);
    let frame = &response.get("A").unwrap().frames[0];
    assert_eq!(frame["handler"], "live");
    assert_eq!(frame["datasource"], "Prod");
}

#[tokio::test]
async fn test_falls_back_to_factory_when_live_handler_stops() {
    let plugins = Arc::new(PluginManager::new());
    plugins.register_live_handler("loki", Arc::new(EchoHandler { label: "live" }));
    let services = services(Arc::clone(&plugins));
    services.register_query_handler("loki", |_| {
        Ok(Arc::new(EchoHandler { label: "factory" }) as Arc<dyn QueryHandler>)
    });

    let ds = DataSource::new("Logs", "loki");
    let ctx = QueryContext::new();

    let before = services.handle_request(&ctx, &ds, &query(&["A"])).await.unwrap();
    assert_eq!(before.get("A").unwrap().frames[0]["handler"], "live");

    assert!(plugins.remove_live_handler("loki").is_some());
    let after = services.handle_request(&ctx, &ds, &query(&["A"])).await.unwrap();
    assert_eq!(after.get("A").unwrap().frames[0]["handler"], "factory");

    let summary = services.metrics();
    assert_eq!(summary.live_dispatches, 1);
    assert_eq!(summary.factory_dispatches, 1);
}

#[tokio::test]
async fn test_unknown_type_builds_nothing() {
    let services = services(Arc::new(PluginManager::new()));
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    services.register_query_handler("graphite", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(EchoHandler { label: "graphite" }) as Arc<dyn QueryHandler>)
    });

    let err = services
        .handle_request(
            &QueryContext::new(),
            &DataSource::new("Influx", "influxdb"),
            &query(&["A"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownDataSourceType { ref ds_type } if ds_type == "influxdb"));
    assert!(err.is_configuration_error());
    assert!(!err.is_retryable());
    assert_eq!(builds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_factory_receives_data_source() {
    let services = services(Arc::new(PluginManager::new()));
    services.register_query_handler("postgres", |ds| {
        if ds.url.is_empty() {
            return Err(format!("data source {:?} has no url", ds.name).into());
        }
        Ok(Arc::new(EchoHandler { label: "pg" }) as Arc<dyn QueryHandler>)
    });
    let ctx = QueryContext::new();

    let err = services
        .handle_request(&ctx, &DataSource::new("PG", "postgres"), &query(&["A"]))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not instantiate endpoint for data plugin \"postgres\": data source \"PG\" has no url"
    );

    let ds = DataSource::new("PG", "postgres").with_url("localhost:5432");
    assert!(services.handle_request(&ctx, &ds, &query(&["A"])).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let plugins = Arc::new(PluginManager::new());
    plugins.register_live_handler("loki", Arc::new(EchoHandler { label: "live" }));
    let services = Arc::new(services(plugins));
    services.register_query_handler("graphite", |_| {
        Ok(Arc::new(EchoHandler { label: "factory" }) as Arc<dyn QueryHandler>)
    });

    let tasks = (0..32).map(|i| {
        let services = Arc::clone(&services);
        tokio::spawn(async move {
            let ds_type = if i % 2 == 0 { "loki" } else { "graphite" };
            let ds = DataSource::new(format!("ds-{i}"), ds_type);
            services
                .handle_request(&QueryContext::new(), &ds, &query(&["A"]))
                .await
        })
    });

    for joined in join_all(tasks).await {
        let response = joined.unwrap().unwrap();
        assert_eq!(response.results.len(), 1);
    }

    let summary = services.metrics();
    assert_eq!(summary.live_dispatches, 16);
    assert_eq!(summary.factory_dispatches, 16);
    assert_eq!(summary.dispatch_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn test_handler_observes_deadline() {
    let services = services(Arc::new(PluginManager::new()));
    services.register_query_handler("slow", |_| {
        Ok(Arc::new(SlowHandler(Duration::from_secs(30))) as Arc<dyn QueryHandler>)
    });

    let ctx = QueryContext::new().with_timeout(Duration::from_secs(1));
    let err = services
        .handle_request(&ctx, &DataSource::new("Slow", "slow"), &query(&["A"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Handler(QueryError::DeadlineExceeded)));
    assert_eq!(services.metrics().dispatch_errors, 1);
}

#[tokio::test]
async fn test_cancelled_context_passes_through() {
    let services = services(Arc::new(PluginManager::new()));
    services.register_query_handler("slow", |_| {
        Ok(Arc::new(SlowHandler(Duration::from_secs(30))) as Arc<dyn QueryHandler>)
    });

    let ctx = QueryContext::new();
    let child = ctx.child();
    ctx.cancel();

    let err = services
        .handle_request(&child, &DataSource::new("Slow", "slow"), &query(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Handler(QueryError::Cancelled)));
}
