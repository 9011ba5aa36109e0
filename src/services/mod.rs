pub mod categories;

pub use categories::CategoryService;
