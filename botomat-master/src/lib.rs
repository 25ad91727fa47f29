pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod master;
pub mod reporter;
pub mod shutdown;
pub mod status_server;
