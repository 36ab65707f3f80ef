//! CLI command implementations.
//!
//! | Module | Commands handled                          |
//! |--------|-------------------------------------------|
//! | `git`  | `git` (reserved, not implemented)         |
//! | `repo` | `repo` — sync a topic into the workspace  |

pub mod git;
pub mod repo;

pub use git::cmd_git;
pub use repo::cmd_repo;
