pub mod client;
pub mod envelope;
pub mod error;
pub mod gateway;

pub use client::{HttpClient, RequestOptions};
pub use envelope::Envelope;
pub use error::{ApiError, RequestError};
pub use gateway::{ApiGateway, Gateway};
