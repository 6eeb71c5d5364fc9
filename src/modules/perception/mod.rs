pub mod window;
pub mod retry;
pub mod fetcher;

pub use window::QueryWindow;
pub use fetcher::NvdFetcher;
