pub mod contact_service;
pub mod weather_service;

pub use contact_service::ContactService;
pub use weather_service::{WeatherClient, WeatherProvider};
