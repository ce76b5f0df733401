//! FFmpeg argument construction for render encodes.
//!
//! Arguments are `OsString`s so input and output paths reach ffmpeg
//! byte-for-byte, whatever their encoding. Layout: `-y`, the looped video
//! input (if any), the audio inputs, the audio mapping, the encoder flags, the
//! fixed AAC settings, `-shortest`, and the output path last.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::encoder::EncoderFamily;

/// Fixed audio codec for every render.
pub const AUDIO_CODEC: &str = "aac";

/// Fixed audio bitrate for every render.
pub const AUDIO_BITRATE: &str = "192k";

/// Label of the concatenated audio stream in the filter graph.
const CONCAT_LABEL: &str = "[outa]";

/// How the audio inputs reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMapping {
    /// All audio inputs are joined by a `concat` filter.
    Concat,
    /// The first audio input is mapped directly, without a filter graph.
    Direct,
}

/// Everything needed to build one encode.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub video: Option<&'a Path>,
    /// Audio inputs in playback order, repeats already expanded.
    pub audio: &'a [&'a Path],
    pub mapping: AudioMapping,
    pub encoder: &'a EncoderFamily,
    pub output: &'a Path,
}

/// Builds the ffmpeg argument list for one encode.
#[must_use]
pub fn build_render_args(params: &RenderParams<'_>) -> Vec<OsString> {
    let mut args = vec![OsString::from("-y")];

    if let Some(video) = params.video {
        push_all(&mut args, ["-stream_loop", "-1"]);
        push_input(&mut args, video);
    }

    let audio: &[&Path] = match params.mapping {
        AudioMapping::Concat => params.audio,
        AudioMapping::Direct => &params.audio[..params.audio.len().min(1)],
    };
    for path in audio {
        push_input(&mut args, path);
    }

    let first_audio_index = usize::from(params.video.is_some());

    match params.mapping {
        AudioMapping::Concat => {
            args.push("-filter_complex".into());
            args.push(concat_filter(first_audio_index, audio.len()).into());
            if params.video.is_some() {
                push_all(&mut args, ["-map", "0:v"]);
            }
            push_all(&mut args, ["-map", CONCAT_LABEL]);
        }
        AudioMapping::Direct => {
            if params.video.is_some() {
                push_all(&mut args, ["-map", "0:v"]);
            }
            args.push("-map".into());
            args.push(format!("{first_audio_index}:a").into());
        }
    }

    if params.video.is_some() {
        args.extend(params.encoder.video_args().into_iter().map(OsString::from));
    }

    push_all(
        &mut args,
        ["-c:a", AUDIO_CODEC, "-b:a", AUDIO_BITRATE, "-shortest"],
    );
    args.push(params.output.as_os_str().to_owned());
    args
}

/// `[k:a][k+1:a]...concat=n=N:v=0:a=1[outa]` over `count` inputs starting at `first_index`.
#[must_use]
pub fn concat_filter(first_index: usize, count: usize) -> String {
    let mut filter: String = (first_index..first_index + count)
        .map(|index| format!("[{index}:a]"))
        .collect();
    filter.push_str(&format!("concat=n={count}:v=0:a=1{CONCAT_LABEL}"));
    filter
}

/// Renders an argument list as a shell-like command line for logs.
///
/// Non-UTF-8 bytes are shown lossily; the arguments themselves are untouched.
#[must_use]
pub fn format_command_line(program: &Path, args: &[OsString]) -> String {
    let mut line = quote_arg(program.as_os_str());
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

fn quote_arg(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.into_owned()
    }
}

fn push_all<const N: usize>(args: &mut Vec<OsString>, values: [&str; N]) {
    args.extend(values.into_iter().map(OsString::from));
}

fn push_input(args: &mut Vec<OsString>, path: &Path) {
    args.push("-i".into());
    args.push(path.as_os_str().to_owned());
}
