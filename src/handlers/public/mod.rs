// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Rate limiting still applies to the /api/* routes in this tier.
pub mod ai;
pub mod categories;
pub mod system;

pub use ai::ai_ask;
pub use categories::categories_list;
pub use system::{health, root, route_not_found};
