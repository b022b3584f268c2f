pub mod client;
pub mod model;

pub use client::NasaClient;
pub use model::ApodRecord;
