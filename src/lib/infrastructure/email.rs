//! Delivery provider clients

mod sparkpost;

pub use sparkpost::{SparkPostClient, SparkPostConfig};
