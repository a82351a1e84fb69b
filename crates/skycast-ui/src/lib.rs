pub mod app_services;
pub mod models;
pub mod services;

pub use app_services::{AppServices, ServicesError};
pub use models::weather_detail_model::WeatherDetailModel;
pub use services::WeatherServiceMessage;
