//! Core library for the `forecast` app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather provider and geolocation abstractions
//! - The lookup pipeline: actions, reducer and a single-flight dispatcher
//! - Condition keyword to background/icon tables
//!
//! It is used by `forecast-cli`, but any presentation layer can drive a
//! [`Dispatcher`] and render the [`LookupState`] it publishes.

pub mod action;
pub mod assets;
pub mod config;
pub mod dispatcher;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod reducer;
pub mod state;

pub use assets::{Background, Icon, resolve_background, resolve_icon};
pub use config::{Config, GeolocationSource};
pub use dispatcher::{Dispatcher, DispatcherBuilder, LookupResult};
pub use geolocation::{FixedLocation, Geolocator, IpGeolocator};
pub use model::{Coordinates, Query, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use state::{AppState, ErrorReason, LookupError, LookupOrigin, LookupState};
