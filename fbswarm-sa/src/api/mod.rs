//! HTTP API handlers for fbswarm-sa

pub mod analyze;
pub mod buildinfo;
pub mod feedback;
pub mod health;
pub mod params;
pub mod priorities;
pub mod scores;

pub use analyze::analyze_routes;
pub use buildinfo::get_build_info;
pub use feedback::feedback_routes;
pub use health::health_routes;
pub use priorities::priority_routes;
pub use scores::score_routes;
