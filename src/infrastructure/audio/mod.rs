//! WAV chunk concatenation.

use crate::domain::audiobook::model::ChunkDescriptor;
use crate::infrastructure::repositories::RepositoryError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Outcome of a merge: which chunk indices made it into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub merged: Vec<usize>,
    pub skipped: Vec<usize>,
    /// Samples per channel written
    pub frames: u64,
    pub sample_rate: u32,
}

impl MergeSummary {
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Concatenate chunk WAV files, in chunk index order, into `output`.
///
/// Failed chunks and chunks whose file is missing or unreadable are skipped,
/// leaving a gap in the narration. The first readable chunk fixes the WAV
/// format and every merged chunk must share it. Fails when nothing is left
/// to merge.
pub fn merge_wav_chunks(
    chunks: &[ChunkDescriptor],
    output: &Path,
) -> Result<MergeSummary, RepositoryError> {
    let mut ordered: Vec<&ChunkDescriptor> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.index);

    let mut skipped = Vec::new();
    let mut merged = Vec::new();
    let mut frames: u64 = 0;
    let mut target: Option<(WavWriter<BufWriter<File>>, WavSpec)> = None;

    for chunk in ordered {
        if !chunk.is_synthesized() || !chunk.path.is_file() {
            tracing::warn!(
                chunk_index = chunk.index,
                status = ?chunk.status,
                "Skipping chunk missing from merge"
            );
            skipped.push(chunk.index);
            continue;
        }

        // Decode the whole chunk before writing so a truncated file leaves
        // no partial audio behind.
        let (chunk_spec, samples) = match read_chunk(&chunk.path) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(
                    chunk_index = chunk.index,
                    error = %e,
                    "Skipping unreadable chunk"
                );
                skipped.push(chunk.index);
                continue;
            }
        };

        let (writer, spec) = match &mut target {
            Some(target) => target,
            None => target.insert((WavWriter::create(output, chunk_spec)?, chunk_spec)),
        };
        if !same_format(spec, &chunk_spec) {
            return Err(RepositoryError::Audio(format!(
                "chunk {} format {:?} differs from {:?}",
                chunk.index, chunk_spec, spec
            )));
        }

        frames += samples.write_to(writer)? / u64::from(spec.channels);
        merged.push(chunk.index);
        tracing::debug!(chunk_index = chunk.index, frames, "Chunk appended");
    }

    let Some((writer, spec)) = target else {
        return Err(RepositoryError::Audio(
            "no synthesized chunks to merge".to_string(),
        ));
    };
    writer.finalize()?;

    let summary = MergeSummary {
        merged,
        skipped,
        frames,
        sample_rate: spec.sample_rate,
    };
    tracing::info!(
        merged = summary.merged.len(),
        skipped = summary.skipped.len(),
        duration_secs = summary.duration_secs(),
        output = %output.display(),
        "Chunks merged"
    );

    Ok(summary)
}

enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    /// Returns the number of samples written.
    fn write_to(&self, writer: &mut WavWriter<BufWriter<File>>) -> Result<u64, hound::Error> {
        match self {
            Self::Int(samples) => samples.iter().try_for_each(|s| writer.write_sample(*s))?,
            Self::Float(samples) => samples.iter().try_for_each(|s| writer.write_sample(*s))?,
        }
        Ok(self.len() as u64)
    }

    fn len(&self) -> usize {
        match self {
            Self::Int(samples) => samples.len(),
            Self::Float(samples) => samples.len(),
        }
    }
}

fn read_chunk(path: &Path) -> Result<(WavSpec, Samples), hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => Samples::Float(reader.samples::<f32>().collect::<Result<_, _>>()?),
        SampleFormat::Int => Samples::Int(reader.samples::<i32>().collect::<Result<_, _>>()?),
    };
    Ok((spec, samples))
}

fn same_format(a: &WavSpec, b: &WavSpec) -> bool {
    a.channels == b.channels
        && a.sample_rate == b.sample_rate
        && a.bits_per_sample == b.bits_per_sample
        && a.sample_format == b.sample_format
}
