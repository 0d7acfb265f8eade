pub mod chart;
pub mod layout;
pub mod lines;
pub mod sidebar;
pub mod statusbar;

pub use chart::CandleChart;
pub use layout::LayoutManager;
pub use lines::LineChartView;
pub use sidebar::{KeyOutcome, Sidebar};
pub use statusbar::{Status, StatusBar};
