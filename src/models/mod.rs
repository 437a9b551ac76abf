mod category;
mod digest;
mod item;
mod planner;

pub use category::Category;
pub use digest::{Digest, PlanDay, SectionItem, TimelineDay, TimelineItem, WeeklyPlan};
pub use item::{DateKind, ExtractedDate, NormalizedItem, RawFeedItem, SubItem};
pub use planner::{PlannerEntry, PlannerMap, PlannerRecord};
