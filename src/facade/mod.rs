mod locks;
mod store;

pub use locks::{TalkGuard, TalkLocks};
pub use store::TalkStore;
