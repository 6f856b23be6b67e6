//! Lookup dispatcher: turns user actions into provider calls and state
//! transitions.
//!
//! Every lookup takes a ticket from a monotonic counter. Results are applied
//! through the reducer, which drops anything that does not carry the current
//! ticket, so a slow response can never overwrite a newer lookup.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    Config,
    action::Action,
    geolocation::Geolocator,
    model::{Coordinates, Query, WeatherSnapshot},
    provider::{WeatherProvider, provider_from_config},
    reducer::reducer,
    state::{AppState, ErrorReason, LookupError, LookupOrigin, LookupState},
};

const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

pub type LookupResult = Result<Arc<WeatherSnapshot>, LookupError>;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<AppState>,
    last_ticket: AtomicU64,
    provider: Arc<dyn WeatherProvider>,
    geolocator: Option<Arc<dyn Geolocator>>,
    reveal_delay: Duration,
    geolocation_timeout: Duration,
}

#[derive(Debug)]
pub struct DispatcherBuilder {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Option<Arc<dyn Geolocator>>,
    reveal_delay: Duration,
    geolocation_timeout: Duration,
}

impl DispatcherBuilder {
    /// `None` models a host without any location capability.
    pub fn geolocator(mut self, geolocator: Option<Arc<dyn Geolocator>>) -> Self {
        self.geolocator = geolocator;
        self
    }

    /// Minimum time a successful lookup stays in `Loading`.
    pub fn reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    pub fn geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    pub fn build(self) -> Dispatcher {
        let (state, _) = watch::channel(AppState::default());
        Dispatcher {
            inner: Arc::new(Inner {
                state,
                last_ticket: AtomicU64::new(0),
                provider: self.provider,
                geolocator: self.geolocator,
                reveal_delay: self.reveal_delay,
                geolocation_timeout: self.geolocation_timeout,
            }),
        }
    }
}

impl Dispatcher {
    pub fn builder(provider: Arc<dyn WeatherProvider>) -> DispatcherBuilder {
        DispatcherBuilder {
            provider,
            geolocator: None,
            reveal_delay: Duration::ZERO,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);

        Ok(Self::builder(provider)
            .geolocator(config.geolocator()?)
            .reveal_delay(config.reveal_delay())
            .geolocation_timeout(config.geolocation_timeout())
            .build())
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> LookupState {
        self.inner.state.borrow().lookup.clone()
    }

    pub fn city(&self) -> String {
        self.inner.state.borrow().city.clone()
    }

    pub fn update_city(&self, text: impl Into<String>) {
        self.dispatch(Action::CityChange(text.into()));
    }

    /// Look up the city currently held in the input.
    pub async fn submit_city(&self) -> LookupResult {
        let city = self.city();
        self.lookup_by_city(&city).await
    }

    pub async fn lookup_by_city(&self, name: &str) -> LookupResult {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring lookup for empty city");
            return Err(LookupError::EmptyInput);
        }

        let (ticket, started) = self.begin();
        let result = self
            .inner
            .provider
            .current(&Query::City(name.to_string()))
            .await;

        self.finish(ticket, started, LookupOrigin::City, result).await
    }

    /// Resolve the current position, then look up its weather.
    pub async fn lookup_by_location(&self) -> LookupResult {
        let Some(geolocator) = self.inner.geolocator.clone() else {
            let ticket = self.next_ticket();
            let reason = ErrorReason::GeolocationUnsupported;
            self.dispatch(Action::LookupReject {
                ticket,
                reason: reason.clone(),
            });
            return Err(reason.into());
        };

        let (ticket, started) = self.begin();
        let located = tokio::time::timeout(self.inner.geolocation_timeout, geolocator.locate()).await;

        let coords = match located {
            Ok(Ok(coords)) => coords,
            Ok(Err(err)) => {
                warn!(ticket, error = %format!("{err:#}"), "geolocation failed");
                return self.fail(ticket, ErrorReason::GeolocationDenied);
            }
            Err(_) => {
                warn!(ticket, timeout = ?self.inner.geolocation_timeout, "geolocation timed out");
                return self.fail(ticket, ErrorReason::GeolocationDenied);
            }
        };

        if !self.is_current(ticket) {
            debug!(ticket, "location resolved after a newer lookup started");
            return Err(LookupError::Superseded);
        }

        self.fetch_coordinates(ticket, started, coords).await
    }

    pub async fn lookup_by_coordinates(&self, coords: Coordinates) -> LookupResult {
        let (ticket, started) = self.begin();
        self.fetch_coordinates(ticket, started, coords).await
    }

    async fn fetch_coordinates(
        &self,
        ticket: u64,
        started: Instant,
        coords: Coordinates,
    ) -> LookupResult {
        let result = self
            .inner
            .provider
            .current(&Query::Coordinates(coords))
            .await;

        self.finish(ticket, started, LookupOrigin::Location, result)
            .await
    }

    fn next_ticket(&self) -> u64 {
        self.inner.last_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn begin(&self) -> (u64, Instant) {
        let ticket = self.next_ticket();
        self.dispatch(Action::LookupStart { ticket });
        (ticket, Instant::now())
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.state.borrow().ticket == ticket
    }

    async fn finish(
        &self,
        ticket: u64,
        started: Instant,
        origin: LookupOrigin,
        result: anyhow::Result<WeatherSnapshot>,
    ) -> LookupResult {
        match result {
            Ok(snapshot) => {
                if !self.inner.reveal_delay.is_zero() {
                    tokio::time::sleep_until(started + self.inner.reveal_delay).await;
                }

                let snapshot = Arc::new(snapshot);
                let applied = self.dispatch(Action::LookupDidLoad {
                    ticket,
                    snapshot: Arc::clone(&snapshot),
                });

                if applied {
                    info!(ticket, location = %snapshot.location_label(), "weather loaded");
                    Ok(snapshot)
                } else {
                    debug!(ticket, "dropping stale weather result");
                    Err(LookupError::Superseded)
                }
            }
            Err(err) => {
                warn!(ticket, ?origin, error = %format!("{err:#}"), "weather lookup failed");
                self.fail(ticket, ErrorReason::ProviderLookupFailed { origin })
            }
        }
    }

    fn fail(&self, ticket: u64, reason: ErrorReason) -> LookupResult {
        let applied = self.dispatch(Action::LookupDidError {
            ticket,
            reason: reason.clone(),
        });

        if applied {
            Err(reason.into())
        } else {
            debug!(ticket, "dropping stale failure");
            Err(LookupError::Superseded)
        }
    }

    fn dispatch(&self, action: Action) -> bool {
        let name = action.name();
        let ticket = action.ticket();
        let changed = self
            .inner
            .state
            .send_if_modified(|state| reducer(state, action));

        debug!(action = name, ?ticket, changed, "dispatched");
        changed
    }
}
