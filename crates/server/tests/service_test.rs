//! End-to-end test: corpus file on disk -> service -> JSON responses.

use data_loader::Corpus;
use server::{MovieService, DEFAULT_RECOMMENDATIONS};
use std::io::Write;
use std::sync::Arc;

const CORPUS: &str = r#"[
  {"id": 1, "title": "A", "overview": "space battle",
   "genres": [{"id": 28, "name": "Action"}], "vote_average": 7.1, "release_date": "2001-01-01"},
  {"id": 2, "title": "B", "overview": "space war fleet",
   "genres": [{"id": 28, "name": "Action"}], "vote_average": 6.4, "release_date": "2003-07-11"},
  {"id": 3, "title": "C", "overview": "family reunion",
   "genres": [{"id": 18, "name": "Drama"}], "vote_average": 8.0, "release_date": ""},
  {"id": 4, "title": "Untitled Project", "overview": null, "genres": []}
]"#;

fn load_service() -> MovieService {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CORPUS.as_bytes()).unwrap();

    let corpus = Corpus::load_from_file(file.path()).unwrap();
    MovieService::new(Arc::new(corpus)).unwrap()
}

#[test]
fn test_recommendation_response_json() {
    let service = load_service();
    let response = service.recommend("A", 2).unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["movie"], "A");
    let recs = json["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["title"], "B");
    assert_eq!(recs[0]["year"], "2003");
    assert_eq!(recs[0]["genres"][0], "Action");
    assert!(recs[0]["similarity"].as_f64().unwrap() > recs[1]["similarity"].as_f64().unwrap());
}

#[test]
fn test_default_limit_caps_at_corpus() {
    let service = load_service();
    let response = service.recommend("C", DEFAULT_RECOMMENDATIONS).unwrap();
    assert_eq!(response.recommendations.len(), 3);
}

#[test]
fn test_movie_without_content_is_served() {
    let service = load_service();
    let response = service.recommend("Untitled Project", 3).unwrap();
    assert!(response.recommendations.iter().all(|r| r.similarity == 0.0));
    assert!(response.recommendations.iter().all(|r| r.shared_terms.is_empty()));

    let detail = service.movie(4).unwrap();
    assert_eq!(detail.overview, "");
    assert_eq!(detail.year, "");
}

#[test]
fn test_catalog_over_loaded_file() {
    let service = load_service();
    assert_eq!(service.genres(), &["Action", "Drama"]);
    assert_eq!(service.trending(1)[0].title, "C");
    assert_eq!(service.by_genre("Action", 20).len(), 2);
    assert_eq!(service.search("untitled", 10)[0].id, 4);
}
