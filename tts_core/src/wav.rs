//! Raw linear-PCM to RIFF/WAVE wrapping.
//!
//! The upstream API hands back bare PCM samples and describes them only
//! through MIME parameters such as `audio/L16;rate=24000`. Players need a
//! self-describing container, so we parse those parameters and prepend the
//! canonical 44-byte WAV header. Output is always mono.

use thiserror::Error;

/// Size of the canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const DEFAULT_SAMPLE_RATE: u32 = 24_000;
const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
const NUM_CHANNELS: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;
const PCM_FORMAT_TAG: u16 = 1;
// "WAVE" tag + fmt chunk (8 + 16) + data chunk header (8)
const RIFF_OVERHEAD: u32 = 36;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("PCM payload of {0} bytes does not fit in a WAV container")]
    PayloadTooLarge(usize),

    #[error("byte rate overflows for {sample_rate_hz} Hz at {bits_per_sample} bits per sample")]
    ByteRateOverflow {
        sample_rate_hz: u32,
        bits_per_sample: u16,
    },
}

/// Sample format hints carried by an audio MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeAudioParameters {
    pub sample_rate_hz: u32,
    pub bits_per_sample: u16,
}

impl Default for MimeAudioParameters {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }
}

/// Extract sample rate and bit depth from a MIME type like `audio/L16;rate=24000`.
///
/// Never fails. Segments that cannot be parsed leave the current value in
/// place, and when a key appears more than once the last good value wins.
pub fn parse_audio_mime_type(mime_type: &str) -> MimeAudioParameters {
    let mut params = MimeAudioParameters::default();

    for segment in mime_type.split(';').map(str::trim) {
        let is_rate = segment
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rate="));

        if is_rate {
            if let Some(rate) = segment
                .split_once('=')
                .and_then(|(_, value)| parse_integer(value))
                .and_then(|v| u32::try_from(v).ok())
            {
                params.sample_rate_hz = rate;
            }
        } else if let Some(bits) = segment.strip_prefix("audio/L") {
            if let Some(bits) = parse_integer(bits).and_then(|v| u16::try_from(v).ok()) {
                params.bits_per_sample = bits;
            }
        }
    }

    params
}

/// Lenient unsigned integer parsing: surrounding whitespace, a leading `+`
/// and single underscores between digits are accepted.
fn parse_integer(raw: &str) -> Option<u64> {
    let s = raw.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return None;
    }
    if !s.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }

    s.chars().filter(|&c| c != '_').collect::<String>().parse().ok()
}

/// Build the 44-byte header for `data_size` bytes of mono PCM.
pub fn wav_header(
    params: MimeAudioParameters,
    data_size: usize,
) -> Result<[u8; WAV_HEADER_LEN], WavError> {
    let data_size_u32 =
        u32::try_from(data_size).map_err(|_| WavError::PayloadTooLarge(data_size))?;
    let chunk_size = RIFF_OVERHEAD
        .checked_add(data_size_u32)
        .ok_or(WavError::PayloadTooLarge(data_size))?;

    let bytes_per_sample = params.bits_per_sample / 8;
    let block_align = NUM_CHANNELS * bytes_per_sample;
    let byte_rate = params
        .sample_rate_hz
        .checked_mul(u32::from(block_align))
        .ok_or(WavError::ByteRateOverflow {
            sample_rate_hz: params.sample_rate_hz,
            bits_per_sample: params.bits_per_sample,
        })?;

    let mut header = [0u8; WAV_HEADER_LEN];

    // RIFF header
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    header[22..24].copy_from_slice(&NUM_CHANNELS.to_le_bytes());
    header[24..28].copy_from_slice(&params.sample_rate_hz.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&params.bits_per_sample.to_le_bytes());

    // data chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size_u32.to_le_bytes());

    Ok(header)
}

/// Wrap raw PCM described by `mime_type` into a complete WAV file.
pub fn convert_to_wav(audio_data: &[u8], mime_type: &str) -> Result<Vec<u8>, WavError> {
    let params = parse_audio_mime_type(mime_type);
    let header = wav_header(params, audio_data.len())?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + audio_data.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(audio_data);
    Ok(out)
}
