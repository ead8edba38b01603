mod buttons;
pub mod console;
mod recognizer;

pub use buttons::*;
pub use recognizer::{ClickRecognizer, RawInput};
