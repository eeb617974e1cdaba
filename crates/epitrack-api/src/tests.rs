use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  http::{HeaderMap, Request, StatusCode, header},
};
use epitrack_core::{
  FetchError,
  pipeline::Pipeline,
  raw::RawTable,
  source::RawSource,
};
use epitrack_fetch::{TableCache, TableProvider};
use serde_json::Value;
use tower::ServiceExt;

use super::api_router;

const CSV: &str = "\
iso_code,continent,location,date,new_cases,new_deaths,total_cases,total_deaths,population
FRA,Europe,France,2021-01-01,10,1,100,5,1000000
FRA,Europe,France,2021-01-02,20,1,120,6,1000000
DEU,Europe,Germany,2021-01-01,30,2,200,10,2000000
";

struct Fixed(RawTable);

impl RawSource for Fixed {
  async fn fetch_raw(&self) -> Result<RawTable, FetchError> { Ok(self.0.clone()) }
}

struct Down;

impl RawSource for Down {
  async fn fetch_raw(&self) -> Result<RawTable, FetchError> {
    Err(FetchError::NoLocations)
  }
}

fn router<S: RawSource + 'static>(source: S) -> Router {
  let cache = Arc::new(TableCache::new(Duration::from_secs(60)));
  let provider = TableProvider::new(source, Pipeline::default(), cache);
  api_router(Arc::new(provider))
}

fn app() -> Router {
  router(Fixed(epitrack_csv::decode(CSV.as_bytes()).unwrap()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
  let resp = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
  };
  (status, headers, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
  let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
  let (status, _, json) = send(app, req).await;
  (status, json)
}

// ─── Countries ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn countries_are_sorted() {
  let (status, json) = get(app(), "/countries").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json, serde_json::json!(["France", "Germany"]));
}

#[tokio::test]
async fn series_is_windowed_and_empty_for_unknown() {
  let (status, json) = get(app(), "/countries/France/series?start=2021-01-02").await;
  assert_eq!(status, StatusCode::OK);
  let records = json.as_array().unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0]["date"], "2021-01-02");

  let (status, json) = get(app(), "/countries/Atlantis/series").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn latest_returns_newest_record_with_cfr() {
  let (status, json) = get(app(), "/countries/France/latest").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["date"], "2021-01-02");
  assert_eq!(json["cumulative_cases"], 120.0);
  assert_eq!(json["cfr"], 5.0);
}

#[tokio::test]
async fn latest_for_unknown_country_is_404() {
  let (status, json) = get(app(), "/countries/Atlantis/latest").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(json["error"].as_str().unwrap().contains("Atlantis"));
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn range_is_inclusive() {
  let (status, json) = get(app(), "/range?start=2021-01-01&end=2021-01-01").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn inverted_range_is_empty() {
  let (status, json) = get(app(), "/range?start=2021-01-02&end=2021-01-01").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn malformed_range_is_400() {
  let (status, _) = get(app(), "/range?start=yesterday&end=2021-01-01").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn snapshot_without_fallback_can_be_empty() {
  let (status, json) = get(app(), "/snapshot/2021-01-05").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["fallback_used"], false);
  assert_eq!(json["records"], serde_json::json!([]));
}

#[tokio::test]
async fn snapshot_falls_back_to_latest_per_country() {
  let (status, json) = get(app(), "/snapshot/2021-01-05?fallback=latest").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["fallback_used"], true);
  let records = json["records"].as_array().unwrap();
  assert_eq!(records.len(), 2);
  assert_eq!(records[0]["country"], "France");
  assert_eq!(records[0]["date"], "2021-01-02");
  assert_eq!(records[1]["country"], "Germany");
  assert_eq!(records[1]["date"], "2021-01-01");
}

#[tokio::test]
async fn snapshot_with_matches_ignores_fallback() {
  let (_, json) = get(app(), "/snapshot/2021-01-01?fallback=latest").await;
  assert_eq!(json["fallback_used"], false);
  assert_eq!(json["records"].as_array().unwrap().len(), 2);
}

// ─── Compare ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn compare_normalises_per_100k() {
  let (status, json) = get(
    app(),
    "/compare?countries=France,Atlantis&metric=cumulative_cases&per_100k=true",
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    json,
    serde_json::json!([
      {
        "country": "France",
        "points": [
          { "date": "2021-01-01", "value": 10.0 },
          { "date": "2021-01-02", "value": 12.0 },
        ],
      },
      { "country": "Atlantis", "points": [] },
    ])
  );
}

#[tokio::test]
async fn latest_values_keep_request_order() {
  let (status, json) = get(app(), "/latest?countries=Germany,Atlantis,France&metric=cfr").await;
  assert_eq!(status, StatusCode::OK);
  let values = json.as_array().unwrap();
  assert_eq!(values.len(), 2);
  assert_eq!(values[0]["country"], "Germany");
  assert_eq!(values[0]["value"], 5.0);
  assert_eq!(values[1]["country"], "France");
}

#[tokio::test]
async fn metric_defaults_to_daily_cases() {
  let (_, json) = get(app(), "/latest?countries=Germany").await;
  assert_eq!(json[0]["value"], 30.0);
}

#[tokio::test]
async fn blank_country_list_is_400() {
  let (status, json) = get(app(), "/compare?countries=,,").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(json["error"].as_str().unwrap().contains("no countries"));
}

#[tokio::test]
async fn unknown_metric_is_400() {
  let (status, _) = get(app(), "/latest?countries=France&metric=recoveries").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_reports_bounds_and_latest_totals() {
  let (status, json) = get(app(), "/summary").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["rows"], 3);
  assert_eq!(json["countries"], 2);
  assert_eq!(json["first_date"], "2021-01-01");
  assert_eq!(json["last_date"], "2021-01-02");
  assert_eq!(json["global"]["locations"], 1);
  assert_eq!(json["global"]["cumulative_cases"], 120.0);
  assert_eq!(
    json["revision"].as_str().unwrap(),
    epitrack_csv::revision(CSV.as_bytes())
  );
}

#[tokio::test]
async fn refresh_returns_clean_report() {
  let req = Request::builder()
    .method("POST")
    .uri("/refresh")
    .body(Body::empty())
    .unwrap();
  let (status, _, json) = send(app(), req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["rows"], 3);
  assert_eq!(json["report"]["input_rows"], 3);
  assert_eq!(json["report"]["kept_rows"], 3);
}

#[tokio::test]
async fn unavailable_source_is_503() {
  let (status, json) = get(router(Down), "/countries").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(json["error"].as_str().unwrap().starts_with("data unavailable"));

  let req = Request::builder()
    .method("POST")
    .uri("/refresh")
    .body(Body::empty())
    .unwrap();
  let (status, _, _) = send(router(Down), req).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ─── ETag ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn etag_carries_revision_and_honours_if_none_match() {
  let app = app();
  let expected = format!("\"{}\"", epitrack_csv::revision(CSV.as_bytes()));

  let req = Request::builder().uri("/countries").body(Body::empty()).unwrap();
  let (status, headers, _) = send(app.clone(), req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(headers[header::ETAG], expected.as_str());

  let req = Request::builder()
    .uri("/countries")
    .header(header::IF_NONE_MATCH, &expected)
    .body(Body::empty())
    .unwrap();
  let (status, headers, json) = send(app, req).await;
  assert_eq!(status, StatusCode::NOT_MODIFIED);
  assert_eq!(headers[header::ETAG], expected.as_str());
  assert_eq!(json, Value::Null);
}

#[tokio::test]
async fn if_none_match_accepts_lists_weak_tags_and_wildcard() {
  let app = app();
  let etag = format!("\"{}\"", epitrack_csv::revision(CSV.as_bytes()));

  for value in [
    format!("\"other\", {etag}"),
    format!("W/{etag}"),
    "*".to_string(),
  ] {
    let req = Request::builder()
      .uri("/summary")
      .header(header::IF_NONE_MATCH, &value)
      .body(Body::empty())
      .unwrap();
    let (status, _, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::NOT_MODIFIED, "{value}");
  }

  let req = Request::builder()
    .uri("/summary")
    .header(header::IF_NONE_MATCH, "\"other\", W/\"stale\"")
    .body(Body::empty())
    .unwrap();
  let (status, _, _) = send(app, req).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_revision_sends_no_etag() {
  let mut raw = epitrack_csv::decode(CSV.as_bytes()).unwrap();
  raw.revision = String::new();
  let app = router(Fixed(raw));
  let req = Request::builder().uri("/countries").body(Body::empty()).unwrap();
  let (status, headers, _) = send(app, req).await;
  assert_eq!(status, StatusCode::OK);
  assert!(headers.get(header::ETAG).is_none());
}
