pub mod types;
pub mod config;
pub mod store;
pub mod llm_adapter;
pub mod generator;
pub mod content_store;
pub mod campaign;
pub mod contacts;
pub mod delivery;
pub mod performance;
pub mod display;
pub mod utils;

pub use types::*;
pub use config::{AppConfig, ConfigNeeds, DataPaths, GenerationConfig};
pub use store::{JsonLog, LogBatch};
pub use llm_adapter::{MockLlmAdapter, OpenAiAdapter};
pub use generator::ContentGenerator;
pub use content_store::ContentStore;
pub use campaign::{Campaign, CampaignLoader, CampaignOverview, PersonaNewsletter, PersonaNewsletterMap};
pub use contacts::{load_contacts, sample_contacts};
pub use delivery::{delivery_log, BulkReport, DeliveryOrchestrator, SkippedContact};
pub use performance::{PerformanceAggregator, PerformanceReport, PerformanceSnapshot, PersonaStats};
