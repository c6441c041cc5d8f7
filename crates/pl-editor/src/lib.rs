pub mod editor;
pub mod history;
pub mod projects;
pub mod shortcuts;

pub use editor::{Editor, ImageTicket, ObjectProps};
pub use history::History;
pub use projects::{ProjectRecord, ProjectStore, StoreError};
pub use shortcuts::{ShortcutAction, ShortcutMap};
