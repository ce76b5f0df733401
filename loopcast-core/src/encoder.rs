// ============================================================================
// loopcast-core/src/encoder.rs
// ============================================================================
//
// ENCODER SELECTION: Video Encoder Families
//
// Maps the user's encoder choice (or a detected capability token such as
// "h264_nvenc") onto a closed set of encoder families. Each family owns the
// video codec flags it contributes to an ffmpeg command.
//
// KEY COMPONENTS:
// - EncoderFamily: Nvenc / Amf / Software
// - from_token / FromStr: classification of an opaque token
// - video_args: per-family video codec argument vector

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Codec used whenever no hardware family matches the requested token.
pub const SOFTWARE_CODEC: &str = "libx264";

/// A family of video encoders sharing one argument strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderFamily {
    /// NVIDIA NVENC; `codec` is the token passed to `-c:v` verbatim.
    Nvenc { codec: String },
    /// AMD AMF; `codec` is the token passed to `-c:v` verbatim.
    Amf { codec: String },
    /// libx264. Also used for tokens without a dedicated strategy
    /// (qsv, videotoolbox, unknown or empty).
    Software,
}

impl Default for EncoderFamily {
    fn default() -> Self {
        Self::Software
    }
}

impl EncoderFamily {
    /// Classifies an encoder token by substring: "nvenc" selects NVENC, "amf"
    /// selects AMF, and everything else falls back to software.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.contains("nvenc") {
            Self::Nvenc {
                codec: token.to_string(),
            }
        } else if token.contains("amf") {
            Self::Amf {
                codec: token.to_string(),
            }
        } else {
            Self::Software
        }
    }

    /// The value passed to `-c:v`.
    #[must_use]
    pub fn codec(&self) -> &str {
        match self {
            Self::Nvenc { codec } | Self::Amf { codec } => codec,
            Self::Software => SOFTWARE_CODEC,
        }
    }

    /// Video codec arguments for this family.
    #[must_use]
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.codec().to_string()];
        let tuning: &[&str] = match self {
            Self::Nvenc { .. } => &["-preset", "p4", "-tune", "hq"],
            Self::Amf { .. } => &["-quality", "balanced"],
            Self::Software => &["-preset", "medium"],
        };
        args.extend(tuning.iter().map(|s| (*s).to_string()));
        args
    }
}

impl FromStr for EncoderFamily {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

impl fmt::Display for EncoderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec())
    }
}
