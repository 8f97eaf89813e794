//! Pure PCM-to-WAV container transform.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// WAV container parameters. Defaults match the speech model's output:
/// mono, 24 kHz, 16-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bytes_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 24_000,
            bytes_per_sample: 2,
        }
    }
}

/// Wrap raw PCM samples in a RIFF/WAVE container.
pub fn pcm_to_wav(pcm: &[u8], spec: WavSpec) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(44 + pcm.len());
    write_wav(&mut out, pcm, spec)?;
    Ok(out)
}

/// Write a complete WAV file to `writer`.
pub fn write_wav<W: Write>(writer: &mut W, pcm: &[u8], spec: WavSpec) -> std::io::Result<()> {
    let block_align = spec.channels * spec.bytes_per_sample;
    let byte_rate = spec.sample_rate * u32::from(block_align);
    let data_len = pcm.len() as u32;

    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(36 + data_len)?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(1)?; // PCM format tag
    writer.write_u16::<LittleEndian>(spec.channels)?;
    writer.write_u32::<LittleEndian>(spec.sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(spec.bytes_per_sample * 8)?;

    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_len)?;
    writer.write_all(pcm)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{WavSpec, pcm_to_wav};
    use byteorder::{ByteOrder, LittleEndian};
    use pretty_assertions::assert_eq;

    #[test]
    fn header_matches_default_spec() {
        let pcm = vec![0u8; 480];
        let wav = pcm_to_wav(&pcm, WavSpec::default()).unwrap();

        assert_eq!(wav.len(), 44 + 480);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(LittleEndian::read_u32(&wav[4..8]), 36 + 480);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(LittleEndian::read_u32(&wav[16..20]), 16);
        assert_eq!(LittleEndian::read_u16(&wav[20..22]), 1);
        assert_eq!(LittleEndian::read_u16(&wav[22..24]), 1); // channels
        assert_eq!(LittleEndian::read_u32(&wav[24..28]), 24_000);
        assert_eq!(LittleEndian::read_u32(&wav[28..32]), 48_000); // byte rate
        assert_eq!(LittleEndian::read_u16(&wav[32..34]), 2); // block align
        assert_eq!(LittleEndian::read_u16(&wav[34..36]), 16); // bits per sample
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(LittleEndian::read_u32(&wav[40..44]), 480);
        assert_eq!(&wav[44..], pcm.as_slice());
    }

    #[test]
    fn stereo_spec_changes_derived_fields() {
        let wav = pcm_to_wav(
            &[0u8; 8],
            WavSpec {
                channels: 2,
                sample_rate: 44_100,
                bytes_per_sample: 2,
            },
        )
        .unwrap();
        assert_eq!(LittleEndian::read_u16(&wav[22..24]), 2);
        assert_eq!(LittleEndian::read_u32(&wav[28..32]), 176_400);
        assert_eq!(LittleEndian::read_u16(&wav[32..34]), 4);
    }

    #[test]
    fn empty_pcm_is_a_valid_header_only_file() {
        let wav = pcm_to_wav(&[], WavSpec::default()).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(LittleEndian::read_u32(&wav[40..44]), 0);
    }
}
