pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{empty, error, header, muted, status, success, timing};
pub use table::result_table;
pub use theme::{theme, Theme};
