pub mod completion;
pub mod db;

pub use completion::HttpCompletionAdapter;
pub use db::DbAdapter;
