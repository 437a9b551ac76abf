mod planner;
mod schema;

pub use planner::{prune_map, PlannerStore, PLANNER_KEY, RETENTION_DAYS};
