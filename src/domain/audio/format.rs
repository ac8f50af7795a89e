//! Audio Context - Value Objects

use super::AudioError;

/// 线性 PCM 格式
///
/// 不变量:
/// - channels >= 1
/// - sample_width_bytes 在 1..=4 之间
/// - channels * sample_width_bytes 可用 u16 表示（WAV block_align 字段）
/// - sample_rate_hz >= 1，且 byte_rate 可用 u32 表示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// 声道数
    pub channels: u16,
    /// 每个采样的字节数
    pub sample_width_bytes: u16,
    /// 采样率
    pub sample_rate_hz: u32,
}

impl PcmFormat {
    /// 语音合成服务的固定输出格式：单声道 / 16 位 / 24000 Hz
    pub const SPEECH: PcmFormat = PcmFormat {
        channels: 1,
        sample_width_bytes: 2,
        sample_rate_hz: 24_000,
    };

    pub fn new(
        channels: u16,
        sample_width_bytes: u16,
        sample_rate_hz: u32,
    ) -> Result<Self, AudioError> {
        let format = Self {
            channels,
            sample_width_bytes,
            sample_rate_hz,
        };
        format.validate()?;
        Ok(format)
    }

    pub fn validate(&self) -> Result<(), AudioError> {
        if self.channels == 0 {
            return Err(AudioError::InvalidFormat(
                "channel count must be at least 1".to_string(),
            ));
        }
        if !(1..=4).contains(&self.sample_width_bytes) {
            return Err(AudioError::InvalidFormat(format!(
                "sample width must be 1-4 bytes, got {}",
                self.sample_width_bytes
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(AudioError::InvalidFormat(
                "sample rate must be positive".to_string(),
            ));
        }
        let block_align = self
            .channels
            .checked_mul(self.sample_width_bytes)
            .ok_or_else(|| {
                AudioError::InvalidFormat(format!(
                    "frame size of {} channels x {} bytes overflows u16",
                    self.channels, self.sample_width_bytes
                ))
            })?;
        self.sample_rate_hz
            .checked_mul(block_align as u32)
            .ok_or_else(|| AudioError::InvalidFormat("byte rate overflows u32".to_string()))?;
        Ok(())
    }

    /// 每帧字节数（所有声道的一个采样）
    ///
    /// 仅对通过 `validate()` 的格式有意义
    pub fn block_align(&self) -> u16 {
        self.channels * self.sample_width_bytes
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width_bytes * 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate_hz * self.block_align() as u32
    }

    /// 给定 PCM 字节数对应的时长（毫秒）
    pub fn duration_ms(&self, data_len: usize) -> u64 {
        let byte_rate = self.byte_rate() as u64;
        if byte_rate == 0 {
            return 0;
        }
        data_len as u64 * 1000 / byte_rate
    }

    /// 给定时长所需的 PCM 字节数（按整帧取整）
    pub fn bytes_for_duration_ms(&self, duration_ms: u64) -> usize {
        let frames = self.sample_rate_hz as u64 * duration_ms / 1000;
        (frames * self.block_align() as u64) as usize
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_format_constants() {
        let format = PcmFormat::SPEECH;
        assert_eq!(format.block_align(), 2);
        assert_eq!(format.bits_per_sample(), 16);
        assert_eq!(format.byte_rate(), 48_000);
        assert!(format.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_channels() {
        assert!(matches!(
            PcmFormat::new(0, 2, 24_000),
            Err(AudioError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_frame_size_overflow() {
        let format = PcmFormat {
            channels: 20_000,
            sample_width_bytes: 4,
            sample_rate_hz: 8,
        };
        assert!(matches!(
            format.validate(),
            Err(AudioError::InvalidFormat(_))
        ));
        assert!(PcmFormat::new(16_384, 4, 1).is_err());
        assert!(PcmFormat::new(16_383, 4, 1).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_sample_width() {
        assert!(PcmFormat::new(1, 0, 24_000).is_err());
        assert!(PcmFormat::new(1, 5, 24_000).is_err());
    }

    #[test]
    fn test_duration_math() {
        let format = PcmFormat::SPEECH;
        assert_eq!(format.duration_ms(48_000), 1000);
        assert_eq!(format.bytes_for_duration_ms(500), 24_000);
    }
}
