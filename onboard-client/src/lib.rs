pub mod api;
pub mod connectivity;
pub mod http;
pub mod poller;
pub mod protocol;

pub use api::{FormOutcome, SetupApi, DEFAULT_UPDATE_SITE, TRANSLATION_BUNDLE};
pub use connectivity::Decision;
pub use http::{ClientError, HttpClient};
pub use poller::POLL_INTERVAL;
