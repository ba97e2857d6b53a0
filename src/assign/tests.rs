mod priority;
pub(crate) mod utils;
