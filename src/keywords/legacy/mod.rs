//! Keyword variants that only exist in drafts 3 and 4.
pub(crate) mod disallow;
pub(crate) mod extends;
pub(crate) mod maximum_draft_4;
pub(crate) mod minimum_draft_4;
pub(crate) mod properties_draft_3;
pub(crate) mod type_draft_3;
pub(crate) mod type_draft_4;
