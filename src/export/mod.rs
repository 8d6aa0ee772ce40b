//! Export functionality
//!
//! Writes a (possibly transformed) sound back to disk:
//! - WAV re-export of the current samples and sample rate
//! - CSV dump of the derived volume arrays for plotting

pub mod envelope_csv;
pub mod wav;

pub use envelope_csv::write_envelope_csv;
pub use wav::export_to_wav;
