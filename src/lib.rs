pub mod geo;
pub mod profile;
pub mod spectrum;
pub mod azimuth;
pub mod io;
pub mod terrain;
pub mod physics;
pub mod coverage;
pub mod geojson;
pub mod config;
pub mod cache;

#[cfg(test)]
mod tests;
