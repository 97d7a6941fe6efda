mod elements;
mod ephemeris;
mod error;
mod events;
mod observer;
mod passes;
mod propagation;
mod sampler;
mod types;

pub use elements::{parse_all, Satellite};
pub use ephemeris::{Ephemeris, LowPrecisionEphemeris};
pub use error::PredictError;
pub use events::find_events;
pub use observer::ObserverLocation;
pub use passes::extract_passes;
pub use propagation::OrbitSource;
pub use sampler::sample_pass;
pub use types::{Pass, TimeRange};

#[cfg(test)]
pub(crate) mod fixtures {
    pub use super::elements::tests::ISS;
    pub use super::events::tests::{zero_observer, SyntheticPasses};
    pub use super::propagation::OrbitState;
}
