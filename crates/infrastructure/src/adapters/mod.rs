//! Adapters implementing application ports

mod metar_adapter;

pub use metar_adapter::MetarAdapter;
