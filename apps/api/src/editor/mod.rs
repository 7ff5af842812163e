// Editor surface: field edits on the open resume, copy-on-write mutation,
// AI rewrite and tracking of in-flight requests.

pub mod edits;
pub mod handlers;
pub mod mutation;
pub mod prompts;
pub mod requests;
pub mod rewrite;
