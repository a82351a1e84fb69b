pub mod location_backend;
pub mod location_store;
pub mod repository;

pub use location_backend::{
    LocationsCallback, SavedLocationBackend, SavedWeatherLocation, StoreError, StoreResult,
    Subscription,
};
pub use location_store::SqliteLocationStore;
pub use repository::{location_id, RepositoryError, WeatherRepository};
