mod csrf;
mod github;

pub(crate) use csrf::{clear_state_cookie, issue_state, state_cookie_from, verify_state};
pub use github::{GithubClient, select_primary_verified_email};
