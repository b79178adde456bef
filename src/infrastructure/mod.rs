pub mod price_client;

pub use price_client::{ClientError, ClientResult, PriceClient};
