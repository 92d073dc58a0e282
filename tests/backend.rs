//! Client and store tests against an in-process HTTP backend

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use travel_tracker::api::{ApiClient, TravelApi};
use travel_tracker::models::{CountryId, LocationId, LocationInput, TripInput, UserId};
use travel_tracker::store::TravelStore;
use travel_tracker::Error;

#[derive(Default)]
struct Backend {
    locations: Vec<Value>,
    trips: Vec<Value>,
    next_id: i64,
    paths: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

#[derive(Deserialize)]
struct UserQuery {
    user_id: Option<i64>,
    country_id: Option<i64>,
}

fn record(state: &Shared, uri: &Uri) {
    state.lock().unwrap().paths.push(uri.path().to_string());
}

async fn countries(State(state): State<Shared>, uri: Uri) -> Json<Value> {
    record(&state, &uri);
    Json(json!([
        { "country_id": 33, "country": "France", "code": "FRA" },
        { "id": 39, "name": "Italy" },
        { "id": 49, "name": "Germany" }
    ]))
}

async fn list_locations(
    State(state): State<Shared>,
    Query(query): Query<UserQuery>,
    uri: Uri,
) -> Json<Value> {
    record(&state, &uri);
    let backend = state.lock().unwrap();
    let rows: Vec<Value> = backend
        .locations
        .iter()
        .filter(|l| query.user_id.is_none() || l["user_id"] == json!(query.user_id))
        .filter(|l| query.country_id.is_none() || l["country_id"] == json!(query.country_id))
        .cloned()
        .collect();
    Json(Value::Array(rows))
}

async fn create_location(
    State(state): State<Shared>,
    uri: Uri,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    record(&state, &uri);
    if body["name"].as_str().unwrap_or_default().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Name is required" })));
    }
    let mut backend = state.lock().unwrap();
    backend.next_id += 1;
    // Returned under the alternate key, with coordinates as strings
    body["location_id"] = json!(backend.next_id);
    if let Some(lat) = body["latitude"].as_f64() {
        body["latitude"] = json!(lat.to_string());
    }
    backend.locations.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update_location(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> impl IntoResponse {
    let mut backend = state.lock().unwrap();
    match backend.locations.iter_mut().find(|l| l["location_id"] == json!(id)) {
        Some(row) => {
            body["location_id"] = json!(id);
            body["description"] = json!("edited on server");
            *row = body.clone();
            (StatusCode::OK, Json(body))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Location not found" }))),
    }
}

async fn delete_location(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut backend = state.lock().unwrap();
    let before = backend.locations.len();
    backend.locations.retain(|l| l["location_id"] != json!(id));
    if backend.locations.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_trips(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().trips.clone()))
}

async fn create_trip(State(state): State<Shared>, Json(mut body): Json<Value>) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    backend.next_id += 1;
    body["id"] = json!(backend.next_id);
    // Dates come back in RFC 1123 form
    if body["start_date"].is_string() {
        body["start_date"] = json!("Mon, 01 Jul 2024 00:00:00 GMT");
    }
    backend.trips.push(body.clone());
    Json(body)
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn empty_list() -> Json<Value> {
    Json(json!([]))
}

async fn get_user(Path(id): Path<i64>) -> impl IntoResponse {
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" })));
    }
    (StatusCode::OK, Json(json!({ "user_id": 1, "username": "ada", "email": "" })))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/users", get(empty_list))
        .route("/users/:id", get(get_user))
        .route("/countries", get(countries))
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/", get(list_locations).post(create_location))
        .route("/locations/:id", put(update_location).delete(delete_location))
        .route("/trips", get(list_trips).post(create_trip))
        .route("/user-countries", get(broken))
        .with_state(state)
}

async fn spawn_backend() -> (String, Shared) {
    let state = Shared::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn eiffel() -> LocationInput {
    LocationInput {
        name: "Eiffel Tower".to_string(),
        country_id: Some(CountryId(33)),
        city: Some("Paris".to_string()),
        latitude: Some(48.8584),
        longitude: Some(2.2945),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_countries_normalized() {
    let (url, _) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let countries = client.list_countries().await.unwrap();
    assert_eq!(countries.len(), 3);
    assert_eq!(countries[0].id, CountryId(33));
    assert_eq!(countries[0].name, "France");
    assert_eq!(countries[0].iso_code.as_deref(), Some("FRA"));
    assert_eq!(countries[1].name, "Italy");
}

#[tokio::test]
async fn test_create_returns_server_object() {
    let (url, state) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let created = client.create_location(UserId(1), &eiffel()).await.unwrap();
    assert_eq!(created.id, LocationId(1));
    assert_eq!(created.user_id, Some(UserId(1)));
    approx::assert_relative_eq!(created.latitude.unwrap(), 48.8584);

    let mine = client.list_locations(UserId(1)).await.unwrap();
    assert_eq!(mine.len(), 1);
    let theirs = client.list_locations(UserId(2)).await.unwrap();
    assert!(theirs.is_empty());

    assert_eq!(state.lock().unwrap().paths[0], "/locations");
}

#[tokio::test]
async fn test_locations_by_country() {
    let (url, _) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    client.create_location(UserId(1), &eiffel()).await.unwrap();
    let colosseum = LocationInput::new("Colosseum", Some(CountryId(39)));
    client.create_location(UserId(1), &colosseum).await.unwrap();

    let french = client
        .list_locations_by_country(UserId(1), CountryId(33))
        .await
        .unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(french[0].name, "Eiffel Tower");

    let err = client
        .list_locations_by_country(UserId(1), CountryId(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingId("country")));
}

#[tokio::test]
async fn test_get_user() {
    let (url, _) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let user = client.get_user(UserId(1)).await.unwrap();
    assert_eq!(user.id, UserId(1));
    assert_eq!(user.name, "ada");
    assert!(user.email.is_none());

    let err = client.get_user(UserId(2)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(client.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_body_message() {
    let (url, _) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let err = client
        .create_location(UserId(1), &LocationInput::default())
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Name is required");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = client
        .update_location(UserId(1), LocationId(999), &eiffel())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "API error (404): Location not found");
}

#[tokio::test]
async fn test_error_without_body() {
    let (url, _) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let err = client.list_user_countries(UserId(1)).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("HTTP error! status: 500"));

    let err = client.delete_location(LocationId(42)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_missing_id_skips_network() {
    let (url, state) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap();

    let err = client.delete_location(LocationId(0)).await.unwrap_err();
    assert!(matches!(err, Error::MissingId("location")));
    assert!(state.lock().unwrap().paths.is_empty());
}

#[tokio::test]
async fn test_trailing_slash_collections() {
    let (url, state) = spawn_backend().await;
    let client = ApiClient::new(&url).unwrap().with_trailing_slash(true);

    client.create_location(UserId(1), &eiffel()).await.unwrap();
    client.list_locations(UserId(1)).await.unwrap();

    let paths = state.lock().unwrap().paths.clone();
    assert_eq!(paths, vec!["/locations/", "/locations/"]);
}

#[tokio::test]
async fn test_store_round_trip() {
    let (url, state) = spawn_backend().await;
    let store = TravelStore::new(ApiClient::new(&url).unwrap(), UserId(1));
    store.load().await;

    assert_eq!(store.countries().await.len(), 3);
    // user-countries fails, the rest still load
    assert!(store.error().await.is_some());

    let added = store.add_location(eiffel()).await.unwrap();
    let updated = store
        .update_location(added.id, LocationInput { name: "Tour Eiffel".to_string(), ..eiffel() })
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("edited on server"));

    let locations = store.locations().await;
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "Tour Eiffel");
    assert_eq!(locations[0].description.as_deref(), Some("edited on server"));
    assert_eq!(store.summary(195).await.to_string(), "1/195");

    store.remove_location(added.id).await.unwrap();
    assert!(store.locations().await.is_empty());
    assert!(state.lock().unwrap().locations.is_empty());
    assert_eq!(store.summary(195).await.to_string(), "0/195");
}

#[tokio::test]
async fn test_store_trip_dates() {
    let (url, _) = spawn_backend().await;
    let store = TravelStore::new(ApiClient::new(&url).unwrap(), UserId(1));
    store.load().await;

    let mut input = TripInput::new("Summer in Italy", Some(CountryId(39)));
    input.start_date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1);
    let trip = store.add_trip(input).await.unwrap();

    assert_eq!(trip.start_date, chrono::NaiveDate::from_ymd_opt(2024, 7, 1));
    assert_eq!(store.trips().await.len(), 1);
}

#[tokio::test]
async fn test_store_failed_remove_keeps_item() {
    let (url, _) = spawn_backend().await;
    let store = TravelStore::new(ApiClient::new(&url).unwrap(), UserId(1));
    store.load().await;
    let added = store.add_location(eiffel()).await.unwrap();

    let err = store.remove_location(LocationId(added.id.0 + 100)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(store.locations().await.len(), 1);
}

#[derive(Default)]
struct GeoCalls {
    maptiler: usize,
    nominatim: usize,
}

async fn spawn_geocoders(maptiler_ok: bool) -> (String, Arc<Mutex<GeoCalls>>) {
    let calls = Arc::new(Mutex::new(GeoCalls::default()));

    let maptiler_calls = calls.clone();
    let nominatim_calls = calls.clone();
    let app = Router::new()
        .route(
            "/geocoding/:query",
            get(move || {
                let calls = maptiler_calls.clone();
                async move {
                    calls.lock().unwrap().maptiler += 1;
                    if !maptiler_ok {
                        return (StatusCode::FORBIDDEN, Json(json!({ "message": "Invalid key" })));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "features": [{
                                "id": "poi.1",
                                "text": "Eiffel Tower",
                                "place_type": ["poi"],
                                "context": [
                                    { "id": "municipality.1", "text": "Paris" },
                                    { "id": "region.1", "text": "Ile-de-France" },
                                    { "id": "country.1", "text": "France", "country_code": "fr" }
                                ]
                            }]
                        })),
                    )
                }
            }),
        )
        .route(
            "/reverse",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let calls = nominatim_calls.clone();
                async move {
                    calls.lock().unwrap().nominatim += 1;
                    assert_eq!(params.get("format").map(String::as_str), Some("json"));
                    Json(json!({
                        "name": "Tour Eiffel",
                        "address": {
                            "city": "Paris",
                            "state": "Ile-de-France",
                            "country": "France",
                            "country_code": "fr"
                        }
                    }))
                }
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), calls)
}

mod geocoding {
    use super::*;
    use travel_tracker::geo::maptiler::MapTilerGeocoder;
    use travel_tracker::geo::nominatim::NominatimGeocoder;
    use travel_tracker::geo::GeocodingResolver;
    use travel_tracker::Coordinates;

    fn resolver(url: &str) -> GeocodingResolver<MapTilerGeocoder, NominatimGeocoder> {
        GeocodingResolver::new(
            Some(MapTilerGeocoder::new(url, "test-key", "en").unwrap()),
            NominatimGeocoder::new(url, "travel-tracker-tests", 10, "en").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_primary_answers() {
        let (url, calls) = spawn_geocoders(true).await;
        let result = resolver(&url).resolve(Coordinates::new(48.8584, 2.2945)).await;

        assert_eq!(result.name, "Eiffel Tower");
        assert_eq!(result.country_name, "France");
        assert_eq!(result.country_code.as_deref(), Some("FR"));
        assert_eq!(result.city.as_deref(), Some("Paris"));
        assert_eq!(calls.lock().unwrap().nominatim, 0);
    }

    #[tokio::test]
    async fn test_fallback_after_primary_error() {
        let (url, calls) = spawn_geocoders(false).await;
        let result = resolver(&url).resolve(Coordinates::new(48.8584, 2.2945)).await;

        assert_eq!(result.country_name, "France");
        assert_eq!(result.name, "Tour Eiffel");
        let calls = calls.lock().unwrap();
        assert_eq!(calls.maptiler, 1);
        assert_eq!(calls.nominatim, 1);
    }

    #[tokio::test]
    async fn test_unreachable_providers_give_empty_result() {
        let url = "http://127.0.0.1:9";
        let result = resolver(url).resolve(Coordinates::new(10.0, 20.0)).await;

        assert!(!result.is_resolved());
        assert_eq!(result.country_name, "");
        approx::assert_relative_eq!(result.coords.lat, 10.0);
    }
}
