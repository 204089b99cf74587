use application::command::media::AudioDurationReader;
use application::error::AppError;
use async_trait::async_trait;
use std::fs::File;
use std::path::PathBuf;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Duration probe backed by symphonia's container parsers. Only the
/// format headers are read, nothing is decoded.
#[derive(Debug, Default, Clone)]
pub struct SymphoniaDurationReader;

impl SymphoniaDurationReader {
    pub fn new() -> Self {
        Self
    }

    fn probe(path: &PathBuf) -> Result<f64, AppError> {
        let file = File::open(path)?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AppError::ParseAudioMetadata(e.to_string()))?;

        let track = probed
            .format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AppError::ParseAudioMetadata("no audio track found".to_string()))?;

        match (track.codec_params.time_base, track.codec_params.n_frames) {
            (Some(time_base), Some(frames)) => {
                let time = time_base.calc_time(frames);
                Ok(time.seconds as f64 + time.frac)
            }
            // headers without a frame count (e.g. raw CBR streams)
            _ => Ok(0.0),
        }
    }
}

#[async_trait]
impl AudioDurationReader for SymphoniaDurationReader {
    async fn duration_secs(&self, path: PathBuf) -> Result<f64, AppError> {
        tokio::task::spawn_blocking(move || Self::probe(&path))
            .await
            .map_err(|e| AppError::ParseAudioMetadata(e.to_string()))?
    }
}
