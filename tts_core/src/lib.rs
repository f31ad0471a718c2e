//! Audio container handling for generated speech.
//!
//! Everything here is pure: no I/O, no shared state.

mod container;
mod wav;

pub use container::{extension_for_mime, prepare_audio, PreparedAudio, WAV_EXTENSION};
pub use wav::{
    convert_to_wav, parse_audio_mime_type, wav_header, MimeAudioParameters, WavError,
    WAV_HEADER_LEN,
};
