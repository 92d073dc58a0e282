//! Client-side travel data store
//!
//! Mirrors the backend's users, countries, locations, trips and user-countries
//! for one active user. Every write goes to the backend first; the cache only
//! changes once the backend has answered, and then it takes exactly the object
//! the backend returned (deletes remove by id).
//!
//! Responses are applied only if they are still relevant:
//! - each collection fetch carries a token; only the latest token may land,
//! - each mutation carries the session epoch, bumped on user change,
//! - update/remove carry a per-entity token; the latest-issued one wins.

use crate::api::TravelApi;
use crate::error::Result;
use crate::models::{
    Country, CountryId, Location, LocationId, LocationInput, TravelStats, Trip, TripId,
    TripInput, User, UserCountry, UserCountryId, UserCountryInput, UserId, VisitedSummary,
};
use crate::visited;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Store-level message recorded when any collection fails to load
pub const LOAD_ERROR: &str = "Failed to load travel data.";

/// Cached backend collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Countries,
    Locations,
    Trips,
    UserCountries,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Countries,
        Collection::Locations,
        Collection::Trips,
        Collection::UserCountries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Countries => "countries",
            Self::Locations => "locations",
            Self::Trips => "trips",
            Self::UserCountries => "user_countries",
        }
    }

    /// Collections that belong to the active user
    fn user_scoped(&self) -> bool {
        matches!(self, Self::Locations | Self::Trips | Self::UserCountries)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Mutations with their own pending flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddLocation,
    UpdateLocation,
    RemoveLocation,
    AddTrip,
    UpdateTrip,
    RemoveTrip,
    AddUserCountry,
    UpdateUserCountry,
    RemoveUserCountry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EntityKey {
    Location(LocationId),
    Trip(TripId),
    UserCountry(UserCountryId),
}

/// A backend-confirmed write, kept so it can be replayed over an older list
#[derive(Debug)]
enum Confirmed {
    Location(Location),
    LocationRemoved(LocationId),
    Trip(Trip),
    TripRemoved(TripId),
    UserCountry(UserCountry),
    UserCountryRemoved(UserCountryId),
}

impl Confirmed {
    fn collection(&self) -> Collection {
        match self {
            Self::Location(_) | Self::LocationRemoved(_) => Collection::Locations,
            Self::Trip(_) | Self::TripRemoved(_) => Collection::Trips,
            Self::UserCountry(_) | Self::UserCountryRemoved(_) => Collection::UserCountries,
        }
    }

    /// Idempotent: replaying onto a list that already holds the write is a no-op
    fn apply(&self, data: &mut TravelData) {
        match self {
            Self::Location(l) => upsert(&mut data.locations, l, |x| x.id == l.id),
            Self::LocationRemoved(id) => data.locations.retain(|l| l.id != *id),
            Self::Trip(t) => upsert(&mut data.trips, t, |x| x.id == t.id),
            Self::TripRemoved(id) => data.trips.retain(|t| t.id != *id),
            Self::UserCountry(u) => upsert(&mut data.user_countries, u, |x| x.id == u.id),
            Self::UserCountryRemoved(id) => data.user_countries.retain(|u| u.id != *id),
        }
    }
}

/// Replace the matching item in place, or append
fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|x| same(x)) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

/// Snapshot of the cached collections
#[derive(Debug, Clone, Default, Serialize)]
pub struct TravelData {
    pub users: Vec<User>,
    pub countries: Vec<Country>,
    pub locations: Vec<Location>,
    pub trips: Vec<Trip>,
    pub user_countries: Vec<UserCountry>,
}

impl TravelData {
    fn clear(&mut self, collection: Collection) {
        match collection {
            Collection::Users => self.users.clear(),
            Collection::Countries => self.countries.clear(),
            Collection::Locations => self.locations.clear(),
            Collection::Trips => self.trips.clear(),
            Collection::UserCountries => self.user_countries.clear(),
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Users => self.users.len(),
            Collection::Countries => self.countries.len(),
            Collection::Locations => self.locations.len(),
            Collection::Trips => self.trips.len(),
            Collection::UserCountries => self.user_countries.len(),
        }
    }
}

#[derive(Debug)]
struct StoreState {
    user: UserId,
    epoch: u64,
    data: TravelData,
    next_token: u64,
    /// Latest fetch token issued per collection
    generations: HashMap<Collection, u64>,
    loading: HashSet<Collection>,
    errors: HashMap<Collection, String>,
    error: Option<String>,
    pending: HashMap<Operation, usize>,
    /// Issue token of the newest mutation applied per entity
    applied: HashMap<EntityKey, u64>,
    /// Writes confirmed while a fetch of their collection was in flight
    journal: Vec<(u64, Confirmed)>,
}

/// Handle for one in-flight mutation
#[derive(Debug, Clone, Copy)]
struct Ticket {
    op: Operation,
    user: UserId,
    epoch: u64,
    entity: Option<(EntityKey, u64)>,
}

impl StoreState {
    fn new(user: UserId) -> Self {
        Self {
            user,
            epoch: 0,
            data: TravelData::default(),
            next_token: 0,
            generations: HashMap::new(),
            loading: HashSet::new(),
            errors: HashMap::new(),
            error: None,
            pending: HashMap::new(),
            applied: HashMap::new(),
            journal: Vec::new(),
        }
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn begin_fetch(&mut self, collection: Collection) -> u64 {
        let token = self.token();
        self.generations.insert(collection, token);
        self.loading.insert(collection);
        token
    }

    fn is_current_fetch(&self, collection: Collection, token: u64) -> bool {
        self.generations.get(&collection) == Some(&token)
    }

    fn begin_op(&mut self, op: Operation, entity: Option<EntityKey>) -> Ticket {
        *self.pending.entry(op).or_insert(0) += 1;
        let entity = entity.map(|key| (key, self.token()));
        Ticket {
            op,
            user: self.user,
            epoch: self.epoch,
            entity,
        }
    }

    fn end_op(&mut self, ticket: &Ticket) {
        if let Some(count) = self.pending.get_mut(&ticket.op) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.pending.remove(&ticket.op);
            }
        }
    }

    /// Whether a successful response may touch the cache
    ///
    /// Failures never get here, so a failed later call cannot hide an earlier
    /// success. A success is dropped only when a later-issued mutation of the
    /// same entity has already been applied.
    fn accepts(&mut self, ticket: &Ticket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        if let Some((key, token)) = ticket.entity {
            if self.applied.get(&key).is_some_and(|&newest| newest > token) {
                return false;
            }
            self.applied.insert(key, token);
        }
        true
    }

    /// Apply a confirmed write, journaling it if a list of its collection is in flight
    fn confirm(&mut self, change: Confirmed) {
        change.apply(&mut self.data);
        if self.loading.contains(&change.collection()) {
            let token = self.token();
            self.journal.push((token, change));
        }
    }

    /// Re-apply writes confirmed after the fetch `token` was issued, then forget them
    fn replay(&mut self, collection: Collection, token: u64) {
        for (confirmed_at, change) in &self.journal {
            if change.collection() == collection && *confirmed_at > token {
                change.apply(&mut self.data);
            }
        }
        self.journal.retain(|(_, change)| change.collection() != collection);
    }
}

/// Single source of truth for one session's travel data
#[derive(Debug)]
pub struct TravelStore<A> {
    api: A,
    state: RwLock<StoreState>,
}

impl<A: TravelApi> TravelStore<A> {
    /// Create an empty store for `user`; call [`load`](Self::load) to fill it
    pub fn new(api: A, user: UserId) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState::new(user)),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Active user
    pub async fn user(&self) -> UserId {
        self.state.read().await.user
    }

    /// Fetch every collection concurrently
    ///
    /// Each collection's loading flag clears as soon as its own request
    /// settles. A failed collection keeps its last-known-good contents and
    /// records an error; the others are unaffected.
    pub async fn load(&self) {
        let (user, tokens) = {
            let mut state = self.state.write().await;
            state.error = None;
            let tokens = Collection::ALL.map(|c| state.begin_fetch(c));
            (state.user, tokens)
        };
        debug!("Loading travel data for user {}", user);

        let [users, countries, locations, trips, user_countries] = tokens;
        tokio::join!(
            self.fetch(Collection::Users, users, self.api.list_users(), |d, v| d.users = v),
            self.fetch(Collection::Countries, countries, self.api.list_countries(), |d, v| {
                d.countries = v
            }),
            self.fetch(Collection::Locations, locations, self.api.list_locations(user), |d, v| {
                d.locations = v
            }),
            self.fetch(Collection::Trips, trips, self.api.list_trips(user), |d, v| d.trips = v),
            self.fetch(
                Collection::UserCountries,
                user_countries,
                self.api.list_user_countries(user),
                |d, v| d.user_countries = v
            ),
        );
    }

    async fn fetch<T, F, Apply>(&self, collection: Collection, token: u64, request: F, apply: Apply)
    where
        F: Future<Output = Result<Vec<T>>>,
        Apply: FnOnce(&mut TravelData, Vec<T>),
    {
        let result = request.await;

        let mut state = self.state.write().await;
        if !state.is_current_fetch(collection, token) {
            debug!("Dropping superseded {} response", collection);
            return;
        }
        state.loading.remove(&collection);

        match result {
            Ok(items) => {
                debug!("Loaded {} {}", items.len(), collection);
                apply(&mut state.data, items);
                state.replay(collection, token);
                state.errors.remove(&collection);
            }
            Err(e) => {
                warn!("Failed to load {}: {}", collection, e);
                state.journal.retain(|(_, change)| change.collection() != collection);
                state.errors.insert(collection, e.to_string());
                state.error = Some(LOAD_ERROR.to_string());
            }
        }
    }

    /// Switch the active user and reload
    ///
    /// User-scoped collections are cleared immediately; responses to requests
    /// issued for the previous user are discarded when they arrive.
    pub async fn set_user(&self, user: UserId) {
        {
            let mut state = self.state.write().await;
            if state.user == user {
                return;
            }
            state.user = user;
            state.epoch += 1;
            state.applied.clear();
            state.journal.clear();
            for collection in Collection::ALL.into_iter().filter(Collection::user_scoped) {
                state.data.clear(collection);
                state.errors.remove(&collection);
                state.generations.remove(&collection);
                state.loading.remove(&collection);
            }
        }
        self.load().await;
    }

    async fn begin(&self, op: Operation, entity: Option<EntityKey>) -> Ticket {
        self.state.write().await.begin_op(op, entity)
    }

    /// Settle a mutation: clear its flag, apply on success if still relevant
    async fn settle<T, Change>(&self, ticket: Ticket, result: Result<T>, change: Change) -> Result<T>
    where
        Change: FnOnce(&T) -> Confirmed,
    {
        let mut state = self.state.write().await;
        state.end_op(&ticket);

        let value = result.inspect_err(|e| warn!("{:?} failed: {}", ticket.op, e))?;
        if state.accepts(&ticket) {
            state.confirm(change(&value));
        } else {
            debug!("{:?} response superseded; cache left unchanged", ticket.op);
        }
        Ok(value)
    }

    // Locations

    /// Create a location and append the backend's copy
    pub async fn add_location(&self, input: LocationInput) -> Result<Location> {
        input.validate()?;
        let ticket = self.begin(Operation::AddLocation, None).await;
        let result = self.api.create_location(ticket.user, &input).await;
        self.settle(ticket, result, |location| Confirmed::Location(location.clone()))
            .await
    }

    /// Replace every editable field of a location
    pub async fn update_location(&self, id: LocationId, input: LocationInput) -> Result<Location> {
        input.validate()?;
        let ticket = self
            .begin(Operation::UpdateLocation, Some(EntityKey::Location(id)))
            .await;
        let result = self.api.update_location(ticket.user, id, &input).await;
        self.settle(ticket, result, |location| Confirmed::Location(location.clone()))
            .await
    }

    /// Delete a location; the caller has already confirmed
    pub async fn remove_location(&self, id: LocationId) -> Result<()> {
        let ticket = self
            .begin(Operation::RemoveLocation, Some(EntityKey::Location(id)))
            .await;
        let result = self.api.delete_location(id).await;
        self.settle(ticket, result, |_| Confirmed::LocationRemoved(id))
            .await
    }

    // Trips

    pub async fn add_trip(&self, input: TripInput) -> Result<Trip> {
        input.validate()?;
        let ticket = self.begin(Operation::AddTrip, None).await;
        let result = self.api.create_trip(ticket.user, &input).await;
        self.settle(ticket, result, |trip| Confirmed::Trip(trip.clone()))
            .await
    }

    pub async fn update_trip(&self, id: TripId, input: TripInput) -> Result<Trip> {
        input.validate()?;
        let ticket = self
            .begin(Operation::UpdateTrip, Some(EntityKey::Trip(id)))
            .await;
        let result = self.api.update_trip(ticket.user, id, &input).await;
        self.settle(ticket, result, |trip| Confirmed::Trip(trip.clone()))
            .await
    }

    pub async fn remove_trip(&self, id: TripId) -> Result<()> {
        let ticket = self
            .begin(Operation::RemoveTrip, Some(EntityKey::Trip(id)))
            .await;
        let result = self.api.delete_trip(id).await;
        self.settle(ticket, result, |_| Confirmed::TripRemoved(id))
            .await
    }

    // User countries

    pub async fn add_user_country(&self, input: UserCountryInput) -> Result<UserCountry> {
        let ticket = self.begin(Operation::AddUserCountry, None).await;
        let result = self.api.create_user_country(ticket.user, &input).await;
        self.settle(ticket, result, |uc| Confirmed::UserCountry(uc.clone()))
            .await
    }

    pub async fn update_user_country(
        &self,
        id: UserCountryId,
        input: UserCountryInput,
    ) -> Result<UserCountry> {
        let ticket = self
            .begin(Operation::UpdateUserCountry, Some(EntityKey::UserCountry(id)))
            .await;
        let result = self.api.update_user_country(ticket.user, id, &input).await;
        self.settle(ticket, result, |uc| Confirmed::UserCountry(uc.clone()))
            .await
    }

    pub async fn remove_user_country(&self, id: UserCountryId) -> Result<()> {
        let ticket = self
            .begin(Operation::RemoveUserCountry, Some(EntityKey::UserCountry(id)))
            .await;
        let result = self.api.delete_user_country(id).await;
        self.settle(ticket, result, |_| Confirmed::UserCountryRemoved(id))
            .await
    }

    // Reads

    /// Copy of every cached collection
    pub async fn snapshot(&self) -> TravelData {
        self.state.read().await.data.clone()
    }

    pub async fn locations(&self) -> Vec<Location> {
        self.state.read().await.data.locations.clone()
    }

    pub async fn trips(&self) -> Vec<Trip> {
        self.state.read().await.data.trips.clone()
    }

    pub async fn countries(&self) -> Vec<Country> {
        self.state.read().await.data.countries.clone()
    }

    pub async fn is_loading(&self, collection: Collection) -> bool {
        self.state.read().await.loading.contains(&collection)
    }

    /// True while any collection fetch is outstanding
    pub async fn any_loading(&self) -> bool {
        !self.state.read().await.loading.is_empty()
    }

    pub async fn is_pending(&self, op: Operation) -> bool {
        self.state.read().await.pending.contains_key(&op)
    }

    /// Last load error of a collection
    pub async fn collection_error(&self, collection: Collection) -> Option<String> {
        self.state.read().await.errors.get(&collection).cloned()
    }

    /// Store-level load error
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Canonical ids of every country with at least one location
    ///
    /// Only ids present in the cached country list count, so the set is
    /// empty while the countries collection has never loaded.
    pub async fn visited(&self) -> BTreeSet<CountryId> {
        let state = self.state.read().await;
        visited::project(&state.data.locations, &state.data.countries)
    }

    /// Visited counter against `total` countries
    pub async fn summary(&self, total: usize) -> VisitedSummary {
        visited::summarize(&self.visited().await, total)
    }

    /// Collection counts; `countries` follows [`visited`](Self::visited)
    pub async fn stats(&self) -> TravelStats {
        let state = self.state.read().await;
        TravelStats {
            countries: visited::project(&state.data.locations, &state.data.countries).len(),
            trips: state.data.trips.len(),
            locations: state.data.locations.len(),
        }
    }
}
