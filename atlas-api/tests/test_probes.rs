//! Integration tests for probe listings.
//!
//! Covers id batching, cursor pagination for country and geo searches,
//! filter passthrough, laziness, and how failures end a stream.

mod common;

use atlas_api::ProbeFilters;
use atlas_core::AtlasError;
use futures::{StreamExt, TryStreamExt};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, echo_id_in, probe_page, query_value, received};

const PROBES: &str = "/api/v2/probes/";

// ---- probes_by_id ----

#[tokio::test]
async fn probes_by_id_fetches_in_batches_of_forty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(echo_id_in(None))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids: Vec<u64> = (1000..1085).collect();
    let probes: Vec<_> = client.probes_by_id(&ids).try_collect().await.unwrap();

    let yielded: Vec<u64> = probes.iter().map(|p| p.id).collect();
    assert_eq!(yielded, ids, "records should be the concatenation of each batch");

    let requests = received(&server).await;
    assert_eq!(requests.len(), 3, "85 ids need ceil(85/40) requests");

    let batch_sizes: Vec<usize> = requests
        .iter()
        .map(|r| query_value(r, "id__in").unwrap().split(',').count())
        .collect();
    assert_eq!(batch_sizes, vec![40, 40, 5]);

    for req in &requests {
        assert_eq!(query_value(req, "page_size").as_deref(), Some("40"));
        assert_eq!(query_value(req, "sort").as_deref(), Some("id"));
        assert!(query_value(req, "id__gt").is_none());
    }
}

#[tokio::test]
async fn probes_by_id_leaves_input_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(echo_id_in(None))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids: Vec<u64> = (1..=45).collect();
    let first: Vec<_> = client.probes_by_id(&ids).try_collect().await.unwrap();
    let second: Vec<_> = client.probes_by_id(&ids).try_collect().await.unwrap();

    assert_eq!(ids.len(), 45);
    assert_eq!(first, second, "each call yields a fresh, independent sequence");
}

#[tokio::test]
async fn probes_by_id_empty_input_makes_no_requests() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let probes: Vec<_> = client.probes_by_id(&[]).try_collect().await.unwrap();

    assert!(probes.is_empty());
    assert!(received(&server).await.is_empty());
}

#[tokio::test]
async fn probes_by_id_ignores_next_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(echo_id_in(Some("https://atlas.example/api/v2/probes/?page=2")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids: Vec<u64> = (1..=10).collect();
    let probes: Vec<_> = client.probes_by_id(&ids).try_collect().await.unwrap();

    assert_eq!(probes.len(), 10);
    assert_eq!(received(&server).await.len(), 1);
}

// ---- cursor pagination ----

#[tokio::test]
async fn country_search_follows_id_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .and(query_param("id__gt", "-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(probe_page(1..=40, Some("https://atlas.example/next"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .and(query_param("id__gt", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(probe_page(41..=45, None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let probes: Vec<_> = client
        .probes_by_country("NL", &ProbeFilters::new())
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<u64> = probes.iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=45).collect::<Vec<u64>>());
    assert!(ids.windows(2).all(|w| w[0] <= w[1]), "ids should be non-decreasing");

    let requests = received(&server).await;
    assert_eq!(requests.len(), 2, "iteration stops once next is null");
    for req in &requests {
        assert_eq!(query_value(req, "country_code").as_deref(), Some("NL"));
        assert_eq!(query_value(req, "page_size").as_deref(), Some("40"));
        assert_eq!(query_value(req, "sort").as_deref(), Some("id"));
    }
}

#[tokio::test]
async fn geo_search_sends_radius_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .and(query_param("radius", "52.1,4.3:25"))
        .and(query_param("asn_v4", "3333"))
        .and(query_param("is_anchor", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(probe_page([6001, 6002], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filters = ProbeFilters::new().asn_v4(3333).is_anchor(true);
    let probes: Vec<_> = client
        .probes_by_geo(52.1, 4.3, 25.0, &filters)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(probes.len(), 2);
    assert_eq!(probes[0].status_name(), Some("Connected"));
}

#[tokio::test]
async fn streams_are_lazy() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let stream = client.probes_by_country("DE", &ProbeFilters::new());
    drop(stream);

    assert!(received(&server).await.is_empty());
}

#[tokio::test]
async fn empty_page_with_next_link_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(probe_page([], Some("https://atlas.example/next"))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .probes_by_country("BE", &ProbeFilters::new())
        .try_collect::<Vec<_>>()
        .await
        .unwrap_err();

    assert!(matches!(err, AtlasError::Pagination(_)), "got {err:?}");
    assert_eq!(received(&server).await.len(), 1);
}

#[tokio::test]
async fn empty_last_page_ends_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(ResponseTemplate::new(200).set_body_json(probe_page([], None)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let probes: Vec<_> = client
        .probes_by_country("AQ", &ProbeFilters::new())
        .try_collect()
        .await
        .unwrap();
    assert!(probes.is_empty());
}

// ---- failures ----

#[tokio::test]
async fn not_found_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Not found."}"#))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut stream = client.probes_by_country("NL", &ProbeFilters::new());

    let first = stream.next().await.expect("stream should yield the error");
    match first {
        Err(AtlasError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, r#"{"detail":"Not found."}"#);
        }
        other => panic!("expected http error, got {other:?}"),
    }
    assert!(stream.next().await.is_none(), "no records after a failed fetch");
}

#[tokio::test]
async fn failure_mid_stream_keeps_earlier_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .and(query_param("id__gt", "-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(probe_page(1..=40, Some("https://atlas.example/next"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .and(query_param("id__gt", "40"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items: Vec<_> = client
        .probes_by_geo(50.0, 5.0, 100.0, &ProbeFilters::new())
        .collect()
        .await;

    assert_eq!(items.len(), 41);
    assert!(items[..40].iter().all(|r| r.is_ok()));
    assert_eq!(items[40].as_ref().unwrap_err().status(), Some(502));
    assert_eq!(received(&server).await.len(), 2, "no retries");
}

#[tokio::test]
async fn batch_failure_stops_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids: Vec<u64> = (1..=100).collect();
    let items: Vec<_> = client.probes_by_id(&ids).collect().await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap_err().status(), Some(500));
    assert_eq!(received(&server).await.len(), 1);
}

#[tokio::test]
async fn page_without_results_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROBES))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "detail": "throttled"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let by_country: Vec<_> = client
        .probes_by_country("NL", &ProbeFilters::default())
        .collect()
        .await;
    assert_eq!(by_country.len(), 1);
    assert!(matches!(by_country[0], Err(AtlasError::Serialization(_))));

    let by_id: Vec<_> = client.probes_by_id(&[1, 2, 3]).collect().await;
    assert_eq!(by_id.len(), 1);
    assert!(matches!(by_id[0], Err(AtlasError::Serialization(_))));
}
