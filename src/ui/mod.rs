/// UI layer: controls panel, top bar, and the data/summary tables.

pub mod panels;
pub mod table;
