pub mod health;
pub mod metrics;
pub mod monitor;
pub mod wallets;
pub mod ws;
