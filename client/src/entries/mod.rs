//! Mood entry flows: live list, creation and editing.

mod creator;
mod editor;
mod list;
mod row;

pub use self::{
    creator::Creator,
    editor::Editor,
    list::{Confirmation, List, State},
    row::{Emoji, Row},
};
