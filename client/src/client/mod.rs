mod client;
mod replication;
mod sync;

pub use client::Client;
