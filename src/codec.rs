//! External encoder codec table (§6.1): pure data describing which codec
//! an external encoder should use for a given output extension. This
//! crate never shells out to an encoder itself; a collaborator consumes
//! this table to drive one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSpec {
    pub codec_name: &'static str,
    /// If true, the encoder should inherit the input file's bitrate
    /// rather than a codec declaring its own.
    pub inherits_input_bitrate: bool,
}

/// Looks up the codec an external encoder should use for `extension`
/// (case-insensitive, leading dot optional). Returns `None` for unknown
/// extensions.
pub fn codec_spec_for(extension: &str) -> Option<CodecSpec> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some(CodecSpec {
            codec_name: "pcm_s16le",
            inherits_input_bitrate: false,
        }),
        "flac" => Some(CodecSpec {
            codec_name: "flac",
            inherits_input_bitrate: false,
        }),
        "opus" => Some(CodecSpec {
            codec_name: "libopus",
            inherits_input_bitrate: false,
        }),
        "ogg" => Some(CodecSpec {
            codec_name: "libvorbis",
            inherits_input_bitrate: false,
        }),
        "m4a" | "aac" => Some(CodecSpec {
            codec_name: "aac",
            inherits_input_bitrate: false,
        }),
        "mp3" => Some(CodecSpec {
            codec_name: "libmp3lame",
            inherits_input_bitrate: true,
        }),
        _ => None,
    }
}
