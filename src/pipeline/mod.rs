//! Document reconstruction: blank filtering, page analysis, segmentation,
//! date resolution, naming and persistence.

mod analysis;
mod blank;
mod dates;
mod duplex;
mod indicator;
mod output;
mod plan;
mod segment;
mod taxonomy;

pub use duplex::duplex_order;
pub use output::{OutputOrganizer, PageStore};
pub use plan::Pipeline;

#[cfg(test)]
pub(crate) use blank::is_blank;
#[cfg(test)]
pub(crate) use indicator::IndicatorParser;
