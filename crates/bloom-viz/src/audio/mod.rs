mod decode;
mod playback;

pub use decode::decode_file;
pub use playback::Playback;
