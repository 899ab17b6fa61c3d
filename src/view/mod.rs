pub mod controller;
pub mod state;

pub use controller::{Transition, ViewController};
pub use state::{PieShare, TableRow, ViewContent, ViewPlan, ViewSelection, ViewState, pie_shares};
