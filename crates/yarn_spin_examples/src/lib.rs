#![forbid(unsafe_code)]

mod export;
mod rendering;

pub use export::{load_record, write_obj, write_record};
pub use rendering::{init_tracing, render_yarn_to_png, RenderConfig, View};
