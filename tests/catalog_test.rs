//! Catalog service tests against a mock catalog API.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flixdeck::catalog::{Catalog, MediaType, Row};
use flixdeck::{CatalogClient, Config};

fn catalog_for(server: &MockServer) -> Catalog {
    let mut config = Config::default();
    config.catalog.base_url = format!("{}/3", server.uri());
    config.catalog.image_base_url = "https://image.tmdb.org/t/p".into();
    config.catalog.api_key = Some("test-key".into());
    config.fetch.rate_limit_per_second = None;
    let client = CatalogClient::new(&config).unwrap();
    Catalog::new(client, &config.catalog)
}

fn listing(titles: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "page": 1,
        "results": titles,
        "total_pages": 1,
        "total_results": 1
    }))
}

#[tokio::test]
async fn row_fetches_localized_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .and(query_param("language", "en-US"))
        .and(query_param("api_key", "test-key"))
        .respond_with(listing(json!([{"id": 238, "title": "The Godfather"}])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let titles = catalog.row(Row::TopRated).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].display_title(), "The Godfather");
}

#[tokio::test]
async fn genre_row_keeps_its_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .and(query_param("with_genres", "28"))
        .and(query_param("language", "en-US"))
        .respond_with(listing(json!([{"id": 1, "title": "Heat"}])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let titles = catalog.row(Row::Action).await.unwrap();
    assert_eq!(titles[0].id, 1);
}

#[tokio::test]
async fn failed_row_comes_back_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .respond_with(listing(json!([{"id": 238, "title": "The Godfather"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/discover/movie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let rows = catalog.rows(&[Row::TopRated, Row::Comedy]).await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, Row::TopRated);
    assert_eq!(rows[0].1.len(), 1);
    assert_eq!(rows[1].0, Row::Comedy);
    assert!(rows[1].1.is_empty());
}

#[tokio::test]
async fn repeated_rows_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/trending/all/week"))
        .respond_with(
            listing(json!([{"id": 5, "name": "Dark", "media_type": "tv"}]))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let rows = catalog.rows(&[Row::Trending, Row::Trending]).await;
    assert_eq!(rows[0].1.len(), 1);
    assert_eq!(rows[1].1.len(), 1);
}

#[tokio::test]
async fn trailer_for_show() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/tv/42"))
        .and(query_param("append_to_response", "videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "Some Show",
            "videos": {"results": [
                {"key": "clip", "type": "Clip", "site": "YouTube"},
                {"key": "abc123", "type": "Trailer", "site": "YouTube", "name": "Official Trailer"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let trailer = catalog.trailer(MediaType::Tv, 42).await.unwrap().unwrap();
    assert_eq!(trailer.key, "abc123");
    assert_eq!(trailer.name.as_deref(), Some("Official Trailer"));

    // A second detail view for the same title reuses the cached response.
    let again = catalog.trailer(MediaType::Tv, 42).await.unwrap().unwrap();
    assert_eq!(again.key, "abc123");
}

#[tokio::test]
async fn details_include_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/550"))
        .and(query_param("append_to_response", "videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 550,
            "title": "Fight Club",
            "genres": [{"id": 18, "name": "Drama"}, {"id": 53, "name": "Thriller"}],
            "videos": {"results": [{"key": "SUXWAEX2jlg", "type": "Trailer", "site": "YouTube"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let details = catalog.details(MediaType::Movie, 550).await.unwrap();
    let names: Vec<_> = details.genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Drama", "Thriller"]);
    assert_eq!(details.genre_names(), "Drama, Thriller");

    // The trailer lookup reads the same cached detail body.
    let trailer = catalog.trailer(MediaType::Movie, 550).await.unwrap().unwrap();
    assert_eq!(trailer.key, "SUXWAEX2jlg");
}

#[tokio::test]
async fn movie_without_trailer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Quiet Film",
            "videos": {"results": [{"key": "t", "type": "Teaser", "site": "YouTube"}]}
        })))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    assert!(catalog.trailer(MediaType::Movie, 7).await.unwrap().is_none());
}

#[tokio::test]
async fn search_normalizes_media_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/multi"))
        .and(query_param("query", "dark"))
        .and(query_param("language", "en-US"))
        .respond_with(listing(json!([
            {"id": 1, "name": "Dark", "first_air_date": "2017-12-01"},
            {"id": 2, "title": "The Dark Knight"},
            {"id": 3, "name": "Someone", "media_type": "person"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let results = catalog.search("  dark ").await.unwrap();

    let types: Vec<_> = results.iter().map(|t| t.media_type).collect();
    assert_eq!(
        types,
        vec![
            Some(MediaType::Tv),
            Some(MediaType::Movie),
            Some(MediaType::Person)
        ]
    );
}

#[tokio::test]
async fn empty_search_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    assert!(catalog.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn image_urls() {
    let server = MockServer::start().await;
    let catalog = catalog_for(&server);
    assert_eq!(
        catalog.image_url("w500", "/poster.jpg"),
        "https://image.tmdb.org/t/p/w500/poster.jpg"
    );
    assert_eq!(
        catalog.image_url("original", "backdrop.jpg"),
        "https://image.tmdb.org/t/p/original/backdrop.jpg"
    );
}
