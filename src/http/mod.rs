pub mod agent;
pub mod body;
pub mod origin;

pub use agent::{Agent, AgentConfig};
