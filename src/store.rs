// src/store.rs
use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, Int32Array, StringArray, UInt32Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, instrument};

use crate::corpus::{ReleaseYear, SongRecord};

const BATCH_ROWS: usize = 8192;

/// One column per [`SongRecord`] field. Unknown years and missing track
/// numbers are nulls.
pub fn record_schema() -> Schema {
    Schema::new(vec![
        Field::new("artist", DataType::Utf8, false),
        Field::new("album", DataType::Utf8, false),
        Field::new("song", DataType::Utf8, false),
        Field::new("track_number", DataType::UInt32, true),
        Field::new("release_year", DataType::Int32, true),
        Field::new("album_type", DataType::Utf8, false),
        Field::new("lyrics", DataType::Utf8, false),
        Field::new("has_lyrics", DataType::Boolean, false),
        Field::new("language", DataType::Utf8, false),
        Field::new("swear_ratio", DataType::Float64, false),
        Field::new("readability_grade", DataType::UInt32, false),
    ])
}

fn string_column(records: &[SongRecord], field: fn(&SongRecord) -> &str) -> ArrayRef {
    Arc::new(StringArray::from(records.iter().map(field).collect::<Vec<_>>()))
}

fn to_batch(schema: &Arc<Schema>, records: &[SongRecord]) -> Result<RecordBatch> {
    let strings = |field: fn(&SongRecord) -> &str| string_column(records, field);
    let columns: Vec<ArrayRef> = vec![
        strings(|r| r.artist.as_str()),
        strings(|r| r.album.as_str()),
        strings(|r| r.song.as_str()),
        Arc::new(UInt32Array::from(
            records.iter().map(|r| r.track_number).collect::<Vec<_>>(),
        )),
        Arc::new(Int32Array::from(
            records.iter().map(|r| r.release_year.year()).collect::<Vec<_>>(),
        )),
        strings(|r| r.album_type.as_str()),
        strings(|r| r.lyrics.as_str()),
        Arc::new(BooleanArray::from(
            records.iter().map(|r| r.has_lyrics).collect::<Vec<_>>(),
        )),
        strings(|r| r.language.as_str()),
        Arc::new(Float64Array::from(
            records.iter().map(|r| r.swear_ratio).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            records.iter().map(|r| r.readability_grade).collect::<Vec<_>>(),
        )),
    ];
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

/// Write records to a single Parquet file. The data goes to `<path>.tmp`
/// first and is renamed into place once the writer is closed.
#[instrument(level = "info", skip(path, records), fields(path = %path.as_ref().display(), records = records.len()))]
pub fn write_records<P: AsRef<Path>>(path: P, records: &[SongRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create `{}`", parent.display()))?;
    }

    let schema = Arc::new(record_schema());
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = File::create(&tmp).with_context(|| format!("creating `{}`", tmp.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema.clone(), Some(props))?;
    for chunk in records.chunks(BATCH_ROWS) {
        writer.write(&to_batch(&schema, chunk)?)?;
    }
    writer.close()?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming `{}` to `{}`", tmp.display(), path.display()))?;

    info!("wrote {} records", records.len());
    Ok(())
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column `{}` missing", name))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("column `{}` has an unexpected type", name))
}

fn from_batch(batch: &RecordBatch, out: &mut Vec<SongRecord>) -> Result<()> {
    let artist = column::<StringArray>(batch, "artist")?;
    let album = column::<StringArray>(batch, "album")?;
    let song = column::<StringArray>(batch, "song")?;
    let track_number = column::<UInt32Array>(batch, "track_number")?;
    let release_year = column::<Int32Array>(batch, "release_year")?;
    let album_type = column::<StringArray>(batch, "album_type")?;
    let lyrics = column::<StringArray>(batch, "lyrics")?;
    let has_lyrics = column::<BooleanArray>(batch, "has_lyrics")?;
    let language = column::<StringArray>(batch, "language")?;
    let swear_ratio = column::<Float64Array>(batch, "swear_ratio")?;
    let readability_grade = column::<UInt32Array>(batch, "readability_grade")?;

    for i in 0..batch.num_rows() {
        out.push(SongRecord {
            artist: artist.value(i).to_string(),
            album: album.value(i).to_string(),
            song: song.value(i).to_string(),
            track_number: (!track_number.is_null(i)).then(|| track_number.value(i)),
            release_year: if release_year.is_null(i) {
                ReleaseYear::Unknown
            } else {
                ReleaseYear::Known(release_year.value(i))
            },
            album_type: album_type.value(i).to_string(),
            lyrics: lyrics.value(i).to_string(),
            has_lyrics: has_lyrics.value(i),
            language: language.value(i).to_string(),
            swear_ratio: swear_ratio.value(i),
            readability_grade: readability_grade.value(i),
        });
    }
    Ok(())
}

/// Read records written by [`write_records`], in file order.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<SongRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(BATCH_ROWS)
        .build()?;

    let mut records = Vec::new();
    while let Some(batch) = reader.next().transpose()? {
        debug!(rows = batch.num_rows(), "read batch");
        from_batch(&batch, &mut records)?;
    }
    info!("read {} records", records.len());
    Ok(records)
}
