pub mod category;

pub use category::{
    CategoryKey, CategoryKind, NewCategory, Subcategory, UsageStats, UserCategory,
};
