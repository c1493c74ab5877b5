mod client;

pub use client::GenerateClient;
