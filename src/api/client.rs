//! HTTP client for the travel backend
//!
//! One method per (resource, verb). Non-2xx answers become [`Error::Api`]
//! carrying the status and the server's `message`/`error` field; transport
//! failures surface as [`Error::Http`]. Nothing is retried.

use crate::api::TravelApi;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{
    Country, CountryId, Location, LocationId, LocationInput, Trip, TripId, TripInput, User,
    UserCountry, UserCountryId, UserCountryInput, UserId,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

const USERS: &str = "users";
const COUNTRIES: &str = "countries";
const LOCATIONS: &str = "locations";
const TRIPS: &str = "trips";
const USER_COUNTRIES: &str = "user-countries";

/// REST client for users, countries, locations, trips and user-countries
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    trailing_slash: bool,
}

/// Request body with the owning user attached
#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    user_id: UserId,
    #[serde(flatten)]
    data: &'a T,
}

/// Error payload, either `{"message": ..}` or `{"error": ..}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Reject ids that were never assigned by the backend
fn require_id(id: i64, what: &'static str) -> Result<i64> {
    if id <= 0 {
        return Err(Error::MissingId(what));
    }
    Ok(id)
}

impl ApiClient {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            trailing_slash: false,
        })
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            trailing_slash: config.trailing_slash,
        })
    }

    /// Whether collection endpoints are addressed as `/locations/`
    pub fn with_trailing_slash(mut self, trailing_slash: bool) -> Self {
        self.trailing_slash = trailing_slash;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        if self.trailing_slash {
            format!("{}/{}/", self.base_url, collection)
        } else {
            format!("{}/{}", self.base_url, collection)
        }
    }

    fn item_url(&self, collection: &str, id: impl Display) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Turn a non-2xx response into an [`Error::Api`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        warn!("API request failed ({}): {}", status.as_u16(), message);

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Send and discard whatever body comes back
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn list<T: DeserializeOwned>(&self, collection: &str, user: Option<UserId>) -> Result<Vec<T>> {
        let mut request = self.request(Method::GET, self.collection_url(collection));
        if let Some(user) = user {
            request = request.query(&[("user_id", user.0)]);
        }
        self.send(request).await
    }

    async fn get<T: DeserializeOwned>(&self, collection: &str, id: i64, what: &'static str) -> Result<T> {
        let id = require_id(id, what)?;
        self.send(self.request(Method::GET, self.item_url(collection, id)))
            .await
    }

    async fn create<T, B>(&self, collection: &str, user: UserId, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let body = Owned { user_id: user, data: body };
        self.send(
            self.request(Method::POST, self.collection_url(collection))
                .json(&body),
        )
        .await
    }

    async fn update<T, B>(&self, collection: &str, user: UserId, id: i64, what: &'static str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let id = require_id(id, what)?;
        let body = Owned { user_id: user, data: body };
        self.send(self.request(Method::PUT, self.item_url(collection, id)).json(&body))
            .await
    }

    async fn delete(&self, collection: &str, id: i64, what: &'static str) -> Result<()> {
        let id = require_id(id, what)?;
        self.send_empty(self.request(Method::DELETE, self.item_url(collection, id)))
            .await
    }

    // Lookups outside the store's needs

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        self.get(USERS, id.0, "user").await
    }

    pub async fn get_country(&self, id: CountryId) -> Result<Country> {
        self.get(COUNTRIES, id.0, "country").await
    }

    pub async fn get_location(&self, id: LocationId) -> Result<Location> {
        self.get(LOCATIONS, id.0, "location").await
    }

    pub async fn get_trip(&self, id: TripId) -> Result<Trip> {
        self.get(TRIPS, id.0, "trip").await
    }

    /// Locations of a user within one country
    pub async fn list_locations_by_country(&self, user: UserId, country: CountryId) -> Result<Vec<Location>> {
        let id = require_id(country.0, "country")?;
        let request = self
            .request(Method::GET, self.collection_url(LOCATIONS))
            .query(&[("user_id", user.0), ("country_id", id)]);
        self.send(request).await
    }
}

impl TravelApi for ApiClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.list(USERS, None).await
    }

    async fn list_countries(&self) -> Result<Vec<Country>> {
        self.list(COUNTRIES, None).await
    }

    async fn list_locations(&self, user: UserId) -> Result<Vec<Location>> {
        self.list(LOCATIONS, Some(user)).await
    }

    async fn create_location(&self, user: UserId, input: &LocationInput) -> Result<Location> {
        self.create(LOCATIONS, user, input).await
    }

    async fn update_location(&self, user: UserId, id: LocationId, input: &LocationInput) -> Result<Location> {
        self.update(LOCATIONS, user, id.0, "location", input).await
    }

    async fn delete_location(&self, id: LocationId) -> Result<()> {
        self.delete(LOCATIONS, id.0, "location").await
    }

    async fn list_trips(&self, user: UserId) -> Result<Vec<Trip>> {
        self.list(TRIPS, Some(user)).await
    }

    async fn create_trip(&self, user: UserId, input: &TripInput) -> Result<Trip> {
        self.create(TRIPS, user, input).await
    }

    async fn update_trip(&self, user: UserId, id: TripId, input: &TripInput) -> Result<Trip> {
        self.update(TRIPS, user, id.0, "trip", input).await
    }

    async fn delete_trip(&self, id: TripId) -> Result<()> {
        self.delete(TRIPS, id.0, "trip").await
    }

    async fn list_user_countries(&self, user: UserId) -> Result<Vec<UserCountry>> {
        self.list(USER_COUNTRIES, Some(user)).await
    }

    async fn create_user_country(&self, user: UserId, input: &UserCountryInput) -> Result<UserCountry> {
        self.create(USER_COUNTRIES, user, input).await
    }

    async fn update_user_country(
        &self,
        user: UserId,
        id: UserCountryId,
        input: &UserCountryInput,
    ) -> Result<UserCountry> {
        self.update(USER_COUNTRIES, user, id.0, "user country", input)
            .await
    }

    async fn delete_user_country(&self, id: UserCountryId) -> Result<()> {
        self.delete(USER_COUNTRIES, id.0, "user country").await
    }
}
