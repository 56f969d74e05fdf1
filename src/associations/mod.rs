//! Track associations and media links of a talk

mod links;
mod tracks;

pub use links::{add_link, link_types, list_links, remove_link, update_link};
pub use tracks::{link_track, list_tracks, unlink_track};
