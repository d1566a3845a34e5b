mod post;

pub use post::{
    Post, PostDetail, PostFilter, PostFlag, PostImage, PostRecord, PostTranslationRecord,
};
