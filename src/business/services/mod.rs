//! Services wiring business systems into the agent runtime.

mod agent;
mod dispatch;

pub use agent::{
    AGENT_NAME, BusinessAgentError, BusinessAgentOptions, BusinessAgentResult,
    BusinessIntelligenceAgent, InitializationReport,
};
pub use dispatch::ConnectorToolDispatcher;
