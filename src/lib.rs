// Library surface for the binary and for headless/integration tests.
pub mod app_dirs;
pub mod challenge;
pub mod compare;
pub mod config;
pub mod prompt;
pub mod runtime;
pub mod session;
pub mod stimulus;
pub mod store;
pub mod ui;
pub mod util;
pub mod vocabulary;
