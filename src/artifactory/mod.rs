mod client;
mod listing;

pub use client::ArtifactoryClient;
