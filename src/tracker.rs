mod centroid_tracker;
mod identity;
mod matching;
mod rect;

pub use centroid_tracker::{CentroidTracker, TrackerConfig};
pub use identity::{HISTORY_LEN, Identity, IdentityId};
pub use matching::{
    AssignmentResult, AssociationKind, Associator, GreedyAssociator, MinCostAssociator,
    centroid_distance,
};
pub use rect::{Centroid, Rect};
