//! WAV 容器编解码
//!
//! 编码输出标准 44 字节 RIFF/WAVE 头，后接原样 PCM 数据：
//!
//! ```text
//! offset  size  field
//! 0       4     "RIFF"
//! 4       4     36 + data_len
//! 8       4     "WAVE"
//! 12      4     "fmt "
//! 16      4     16
//! 20      2     1 (PCM)
//! 22      2     channels
//! 24      4     sample_rate
//! 28      4     byte_rate
//! 32      2     block_align
//! 34      2     bits_per_sample
//! 36      4     "data"
//! 40      4     data_len
//! 44      ...   PCM
//! ```

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioError, PcmFormat};

/// WAV 头长度（字节）
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_TAG_PCM: u16 = 1;

/// RIFF 大小字段为 u32，且包含 36 字节的头部余量
const MAX_DATA_LEN: usize = (u32::MAX - 36) as usize;

/// 解码后的 PCM 数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPcm {
    pub format: PcmFormat,
    pub pcm: Vec<u8>,
}

/// 音频信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInfo {
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u16,
    /// 位深度
    pub bits_per_sample: u16,
    /// 数据大小（字节）
    pub data_size: usize,
}

/// 将原始 PCM 封装为 WAV 容器
///
/// PCM 长度必须是 `channels * sample_width_bytes` 的整数倍，否则返回
/// `MalformedAudioData`，不会截断或补齐。
pub fn encode(pcm: &[u8], format: PcmFormat) -> Result<Vec<u8>, AudioError> {
    format.validate()?;

    let block_align = format.block_align() as usize;
    if pcm.len() % block_align != 0 {
        return Err(AudioError::malformed(format!(
            "PCM length {} is not a multiple of the {}-byte frame size",
            pcm.len(),
            block_align
        )));
    }
    if pcm.len() > MAX_DATA_LEN {
        return Err(AudioError::malformed(format!(
            "PCM length {} exceeds the WAV size limit",
            pcm.len()
        )));
    }

    let data_len = pcm.len() as u32;
    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    wav.extend_from_slice(&FORMAT_TAG_PCM.to_le_bytes());
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate_hz.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample().to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    Ok(wav)
}

/// 以语音合成固定格式（单声道 / 16 位 / 24000 Hz）封装 PCM
pub fn encode_speech(pcm: &[u8]) -> Result<Vec<u8>, AudioError> {
    encode(pcm, PcmFormat::SPEECH)
}

/// 解析 WAV 容器，取回格式参数与原始 PCM
///
/// 只接受未压缩 PCM（format tag 1），跳过未知 chunk。
pub fn decode(wav: &[u8]) -> Result<DecodedPcm, AudioError> {
    if wav.len() < 12 {
        return Err(AudioError::invalid_container("data too short"));
    }
    if &wav[0..4] != b"RIFF" {
        return Err(AudioError::invalid_container("missing RIFF header"));
    }
    if &wav[8..12] != b"WAVE" {
        return Err(AudioError::invalid_container("missing WAVE identifier"));
    }

    let mut pos = 12;
    let mut format: Option<PcmFormat> = None;

    while pos + 8 <= wav.len() {
        let chunk_id = &wav[pos..pos + 4];
        let chunk_len = read_u32(wav, pos + 4) as usize;
        let body_start = pos + 8;
        let body_end = body_start
            .checked_add(chunk_len)
            .filter(|end| *end <= wav.len())
            .ok_or_else(|| {
                AudioError::invalid_container(format!(
                    "chunk {:?} overruns the buffer",
                    String::from_utf8_lossy(chunk_id)
                ))
            })?;

        match chunk_id {
            b"fmt " => {
                if chunk_len < FMT_CHUNK_LEN as usize {
                    return Err(AudioError::invalid_container("fmt chunk too short"));
                }
                let tag = read_u16(wav, body_start);
                if tag != FORMAT_TAG_PCM {
                    return Err(AudioError::invalid_container(format!(
                        "unsupported format tag {}",
                        tag
                    )));
                }
                let bits_per_sample = read_u16(wav, body_start + 14);
                if bits_per_sample % 8 != 0 {
                    return Err(AudioError::invalid_container(format!(
                        "unsupported bits per sample {}",
                        bits_per_sample
                    )));
                }
                let parsed = PcmFormat {
                    channels: read_u16(wav, body_start + 2),
                    sample_width_bytes: bits_per_sample / 8,
                    sample_rate_hz: read_u32(wav, body_start + 4),
                };
                parsed
                    .validate()
                    .map_err(|e| AudioError::invalid_container(e.to_string()))?;
                format = Some(parsed);
            }
            b"data" => {
                let format = format
                    .ok_or_else(|| AudioError::invalid_container("data chunk before fmt chunk"))?;
                let pcm = &wav[body_start..body_end];
                if pcm.len() % format.block_align() as usize != 0 {
                    return Err(AudioError::malformed(format!(
                        "data chunk length {} is not frame aligned",
                        pcm.len()
                    )));
                }
                return Ok(DecodedPcm {
                    format,
                    pcm: pcm.to_vec(),
                });
            }
            _ => {}
        }

        pos = body_end;
        // 对齐到偶数字节
        if chunk_len % 2 != 0 {
            pos += 1;
        }
    }

    Err(AudioError::invalid_container(if format.is_some() {
        "missing data chunk"
    } else {
        "missing fmt chunk"
    }))
}

/// 使用 symphonia 探测容器，确认标准解码器可以识别并返回音频信息
pub fn probe_info(wav: &[u8]) -> Result<AudioInfo, AudioError> {
    let cursor = Cursor::new(wav.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::invalid_container(format!("probe failed: {}", e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| AudioError::invalid_container("no audio track found"))?;
    let params = &track.codec_params;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioError::invalid_container("unknown sample rate"))?;
    let channels = params
        .channels
        .map(|c| c.count() as u16)
        .ok_or_else(|| AudioError::invalid_container("unknown channel count"))?;
    let bits_per_sample = params.bits_per_sample.unwrap_or(16) as u16;
    let frames = params.n_frames.unwrap_or(0);

    let duration_ms = if sample_rate > 0 {
        frames * 1000 / sample_rate as u64
    } else {
        0
    };

    Ok(AudioInfo {
        duration_ms,
        sample_rate,
        channels,
        bits_per_sample,
        data_size: (frames * channels as u64 * (bits_per_sample / 8) as u64) as usize,
    })
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;

    /// 生成一段 16 位正弦波 PCM（小端）
    fn sine_pcm(frames: usize) -> Vec<u8> {
        (0..frames)
            .map(|i| ((i as f32 * 0.05).sin() * 12_000.0) as i16)
            .flat_map(|s| s.to_le_bytes())
            .collect()
    }

    /// 用 symphonia 完整解码为 i16 采样，独立于本模块的 decode
    fn symphonia_samples(wav: &[u8]) -> Vec<i16> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(wav.to_vec())), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .unwrap();
        let mut format = probed.format;
        let track = format.default_track().unwrap();
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .unwrap();

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => panic!("packet read failed: {}", e),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = decoder.decode(&packet).unwrap();
            let spec = *decoded.spec();
            let frames = decoded.frames();
            let mut buf = SampleBuffer::<i16>::new(frames as u64, spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(&buf.samples()[..frames * spec.channels.count()]);
        }
        samples
    }

    #[test]
    fn test_round_trip_preserves_pcm_and_format() {
        let pcm = sine_pcm(2_400);
        let wav = encode_speech(&pcm).unwrap();
        let decoded = decode(&wav).unwrap();

        assert_eq!(decoded.pcm, pcm);
        assert_eq!(decoded.format, PcmFormat::SPEECH);
        assert_eq!(decoded.format.channels, 1);
        assert_eq!(decoded.format.bits_per_sample(), 16);
        assert_eq!(decoded.format.sample_rate_hz, 24_000);
    }

    #[test]
    fn test_header_declares_payload_length() {
        for len in [0usize, 2, 4_800, 10_002] {
            let pcm = vec![0x7fu8; len];
            let wav = encode_speech(&pcm).unwrap();
            assert_eq!(read_u32(&wav, 40) as usize, len);
            assert_eq!(read_u32(&wav, 4) as usize, 36 + len);
            assert_eq!(wav.len(), WAV_HEADER_LEN + len);
        }
    }

    #[test]
    fn test_empty_pcm_round_trips() {
        let wav = encode_speech(&[]).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        let decoded = decode(&wav).unwrap();
        assert!(decoded.pcm.is_empty());
    }

    #[test]
    fn test_odd_length_is_rejected() {
        let err = encode_speech(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, AudioError::MalformedAudioData(_)));
    }

    #[test]
    fn test_oversized_frame_is_rejected_before_writing() {
        let format = PcmFormat {
            channels: 20_000,
            sample_width_bytes: 4,
            sample_rate_hz: 8,
        };
        assert!(matches!(
            encode(&vec![0u8; 65_535], format),
            Err(AudioError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_stereo_frame_alignment() {
        let stereo = PcmFormat::new(2, 2, 44_100).unwrap();
        assert!(encode(&[0u8; 8], stereo).is_ok());
        assert!(matches!(
            encode(&[0u8; 6], stereo),
            Err(AudioError::MalformedAudioData(_))
        ));
    }

    #[test]
    fn test_one_second_of_silence() {
        let pcm = vec![0u8; 48_000];
        let wav = encode_speech(&pcm).unwrap();

        assert_eq!(wav.len(), WAV_HEADER_LEN + 48_000);
        assert_eq!(read_u32(&wav, 40), 48_000);
        assert_eq!(decode(&wav).unwrap().pcm.len(), 48_000);
    }

    #[test]
    fn test_header_fields() {
        let wav = encode_speech(&[0u8; 4]).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u16(&wav, 20), 1);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(read_u32(&wav, 24), 24_000);
        assert_eq!(read_u32(&wav, 28), 48_000);
        assert_eq!(read_u16(&wav, 32), 2);
        assert_eq!(read_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
    }

    #[test]
    fn test_standard_decoder_reads_samples() {
        let pcm = sine_pcm(4_800);
        let wav = encode_speech(&pcm).unwrap();

        let expected: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(symphonia_samples(&wav), expected);
    }

    #[test]
    fn test_probe_info() {
        let wav = encode_speech(&vec![0u8; 48_000]).unwrap();
        let info = probe_info(&wav).unwrap();

        assert_eq!(info.sample_rate, 24_000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.duration_ms, 1000);
        assert_eq!(info.data_size, 48_000);
    }

    #[test]
    fn test_decode_skips_unknown_chunks() {
        let pcm = sine_pcm(16);
        let wav = encode_speech(&pcm).unwrap();

        // 在 fmt 与 data 之间插入一个奇数长度的 LIST chunk
        let mut patched = wav[..36].to_vec();
        patched.extend_from_slice(b"LIST");
        patched.extend_from_slice(&3u32.to_le_bytes());
        patched.extend_from_slice(&[1, 2, 3, 0]);
        patched.extend_from_slice(&wav[36..]);

        assert_eq!(decode(&patched).unwrap().pcm, pcm);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not a wav"),
            Err(AudioError::InvalidContainer(_))
        ));
        assert!(matches!(
            decode(b"RIFF\0\0\0\0WAVEdata\xff\xff\xff\xff"),
            Err(AudioError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let wav = encode_speech(&[0u8; 100]).unwrap();
        assert!(decode(&wav[..wav.len() - 10]).is_err());
    }
}
