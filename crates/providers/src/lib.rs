//! External collaborator implementations for SkyWatch.
//!
//! - [`OpenMeteoClient`] implements `skywatch_core::ForecastSource`
//! - [`DirectGeocoder`] implements `skywatch_core::Geocoder`
//! - [`OpenAiCompatProvider`] implements `skywatch_core::Provider`
//!
//! Every client is built from explicit configuration; none of them reads the
//! process environment.

mod http;

pub mod geocoding;
pub mod open_meteo;
pub mod openai_compat;

pub use geocoding::DirectGeocoder;
pub use open_meteo::OpenMeteoClient;
pub use openai_compat::OpenAiCompatProvider;
