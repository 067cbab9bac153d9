// Application Layer - Pipeline, stages and handlers

pub mod cache;
pub mod connection;
pub mod constants;
pub mod handlers;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod transaction;
pub mod users;

// Re-exports
pub use cache::{CacheStage, QueryCache};
pub use connection::ConnectionStage;
pub use handlers::{ExecuteStatement, FixedStatement, SelectRows, StatementKind};
pub use logging::LoggingStage;
pub use pipeline::{CallContext, Handler, Pipeline, PipelineBuilder, Stage};
pub use retry::{RetryDecision, RetryPolicy, RetryStage};
pub use transaction::TransactionStage;
pub use users::UserQueries;
