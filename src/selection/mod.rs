pub mod constraints;
pub mod selector;

pub use constraints::{ContentConstraints, ExposureCap, SelectionConstraints};
pub use selector::ItemSelector;
