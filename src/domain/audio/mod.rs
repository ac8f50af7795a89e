//! Audio Context - 音频容器上下文
//!
//! 职责:
//! - 描述线性 PCM 格式参数
//! - 将原始 PCM 封装为 WAV 容器（及其逆过程）
//! - 使用标准解码器探测容器信息

mod errors;
mod format;
mod wav;

pub use errors::AudioError;
pub use format::PcmFormat;
pub use wav::{decode, encode, encode_speech, probe_info, AudioInfo, DecodedPcm, WAV_HEADER_LEN};
