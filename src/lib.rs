pub mod assets;
pub mod bar;
pub mod config;
pub mod dataset;
pub mod export;
pub mod http_client;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod scale;
pub mod scatter;
pub mod scene;
pub mod state;
pub mod tooltip;
pub mod ui;
pub mod view_state;
