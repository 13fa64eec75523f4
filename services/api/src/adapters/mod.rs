pub mod db;
pub mod google;
pub mod memory;
pub mod summarizer;

pub use db::DbAdapter;
pub use google::GoogleTokenInfoAdapter;
pub use memory::MemoryDatabase;
pub use summarizer::HttpSummarizerAdapter;
