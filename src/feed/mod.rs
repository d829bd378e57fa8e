pub mod provider;
pub mod schedule;

#[cfg(feature = "tokio-runtime")]
pub mod http;
#[cfg(feature = "tokio-runtime")]
pub mod worker;
