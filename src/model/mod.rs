mod link;
pub(crate) mod parse;
mod speaker;
mod talk;
mod track;

pub use link::{LinkType, TalkLink};
pub use speaker::SpeakerAssociation;
pub use talk::{NewTalk, Talk};
pub use track::TrackAssociation;
