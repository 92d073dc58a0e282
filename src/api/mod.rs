//! Backend resource access
//!
//! [`TravelApi`] is the seam between the store and the network: the store only
//! ever talks to this trait, [`ApiClient`] implements it over HTTP, and tests
//! substitute in-memory stubs. The active user is passed per call rather than
//! held as client state, so one client can serve any number of sessions.

pub mod client;

pub use client::ApiClient;

use crate::error::Result;
use crate::models::{
    Country, Location, LocationId, LocationInput, Trip, TripId, TripInput, User, UserCountry,
    UserCountryId, UserCountryInput, UserId,
};
use std::future::Future;

/// Operations the travel store needs from the backend
///
/// Every method resolves to the decoded backend object on 2xx and to an
/// error otherwise. Nothing is retried.
pub trait TravelApi: Send + Sync {
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn list_countries(&self) -> impl Future<Output = Result<Vec<Country>>> + Send;

    fn list_locations(&self, user: UserId) -> impl Future<Output = Result<Vec<Location>>> + Send;

    fn create_location(
        &self,
        user: UserId,
        input: &LocationInput,
    ) -> impl Future<Output = Result<Location>> + Send;

    fn update_location(
        &self,
        user: UserId,
        id: LocationId,
        input: &LocationInput,
    ) -> impl Future<Output = Result<Location>> + Send;

    fn delete_location(&self, id: LocationId) -> impl Future<Output = Result<()>> + Send;

    fn list_trips(&self, user: UserId) -> impl Future<Output = Result<Vec<Trip>>> + Send;

    fn create_trip(
        &self,
        user: UserId,
        input: &TripInput,
    ) -> impl Future<Output = Result<Trip>> + Send;

    fn update_trip(
        &self,
        user: UserId,
        id: TripId,
        input: &TripInput,
    ) -> impl Future<Output = Result<Trip>> + Send;

    fn delete_trip(&self, id: TripId) -> impl Future<Output = Result<()>> + Send;

    fn list_user_countries(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<UserCountry>>> + Send;

    fn create_user_country(
        &self,
        user: UserId,
        input: &UserCountryInput,
    ) -> impl Future<Output = Result<UserCountry>> + Send;

    fn update_user_country(
        &self,
        user: UserId,
        id: UserCountryId,
        input: &UserCountryInput,
    ) -> impl Future<Output = Result<UserCountry>> + Send;

    fn delete_user_country(&self, id: UserCountryId) -> impl Future<Output = Result<()>> + Send;
}
