//! lessonforge-providers — text API integrations.
//!
//! Implements [`lessonforge_core::traits::TextProvider`] for the Gemini
//! REST API, plus a mock provider for tests and the config file that wires
//! a provider up.

pub mod config;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, load_config_from, ToolkitConfig};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
