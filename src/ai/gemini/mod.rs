pub mod client;
pub mod generate;
pub mod types;

pub use generate::GeminiTextClient;
