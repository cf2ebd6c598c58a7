mod process;
mod run;
#[cfg(test)]
mod tests;

pub use process::{ProcessingContext, process_documents};
pub use run::run;
