//! Front end framing with cliclack (Charm-style inline prompts)
//!
//! Only compiled with the `tui` feature; the core pipeline prints plain styled lines.

mod prompts;

pub use prompts::{run, CreateArgs};
