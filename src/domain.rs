//! Domain module - records and page vocabulary
//!
//! Every type here is a transient value object: built per call, never shared
//! or mutated across calls.

pub mod page;
pub mod records;

pub use page::{PageFailure, PageKind};
pub use records::{
    FriendEntry, GenericResult, LikeItems, LikesInventory, LinkedName, MutualFriendEntry,
    PostRecord, PresenceMap, ProfileRecord, ProfileValue, ReactionResult, TimelineResult,
};
