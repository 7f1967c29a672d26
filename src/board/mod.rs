pub(crate) mod hierarchy;
pub(crate) mod model;
pub(crate) mod store;
