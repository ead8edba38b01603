//! The two interactive window types

pub mod action;
pub mod paging;

use serde::{Deserialize, Serialize};

pub use action::{ActionTiming, ActionWindowController};
pub use paging::PagingController;

/// Window types the navigation stack can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Action,
    Paging,
}
