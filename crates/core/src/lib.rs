//! # gamewise core
//!
//! Domain types, traits, and error definitions for the gamewise agent.
//! This crate has no framework dependencies: it defines the domain model
//! that the provider, retrieval, tool and agent crates implement against.
//!
//! Every external collaborator is a trait here (`Provider` for the text
//! model, `Retriever` for the game catalog, `Tool` for agent capabilities),
//! so the agent loop can be driven by test doubles.

pub mod catalog;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use catalog::{GameDocument, Retriever};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolArgument, ToolRegistry, ToolResult};
