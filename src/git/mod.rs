pub mod history;
pub mod repository;

pub use history::ViewedFold;
pub use repository::GitRepository;
