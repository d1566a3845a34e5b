/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// BLOG CONSTANTS
// =============================================================================

/// Module name written to the history log
pub const MODULE_NAME: &str = "Blog";

/// Format of the human publish date accepted by post forms (e.g. "07/21/2024")
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Web page registry labels and route references for the two content kinds
pub const CATEGORY_PAGE_LABEL: &str = "Blog (Categories)";
pub const CATEGORY_PAGE_ROUTE: &str = "Blog:Category@indexAction";
pub const POST_PAGE_LABEL: &str = "Blog (Posts)";
pub const POST_PAGE_ROUTE: &str = "Blog:Post@indexAction";

/// Image store namespaces
pub const CATEGORY_IMAGE_NAMESPACE: &str = "categories";
pub const POST_IMAGE_NAMESPACE: &str = "posts";

/// Prefix applied to each nesting level in dropdown labels
pub const TREE_INDENT: &str = "— ";

/// Image types accepted for covers
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
