mod category;

pub use category::{
    Category, CategoryBcRow, CategoryNode, CategoryRecord, CategoryTranslationRecord,
    CategoryWithCount,
};
