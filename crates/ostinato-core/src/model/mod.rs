pub mod item;
pub mod period;
pub mod request;

pub use item::{ChartItem, ItemKind};
pub use period::Period;
pub use request::{ChartRequest, GridSize, GridSizeError, MAX_GRID_EDGE};
