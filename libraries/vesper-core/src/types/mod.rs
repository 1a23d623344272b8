mod track;

pub use track::{MediaType, PitchAlgorithm, Track, TrackMetadata, TrackSource};
