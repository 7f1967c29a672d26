pub(crate) mod cache;
pub(crate) mod composite;
pub(crate) mod encode;
pub(crate) mod engine;
pub(crate) mod geometry;
pub(crate) mod jitter;
pub(crate) mod layers;
pub(crate) mod rng;
pub(crate) mod source;
