pub mod chat_loop;
pub mod dispatcher;
pub mod ingest;
pub mod rate_limiter;
