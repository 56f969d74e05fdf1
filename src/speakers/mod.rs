//! Speaker associations: set reconciliation and user claims

mod claims;
mod reconciler;

pub use claims::{attach_user, claim_speaker, list_speakers, unassign_speaker};
pub use reconciler::{ReconcileReport, SpeakerReconciler, target_names};
