use std::io::Read;
use std::str::FromStr;

use super::dates::parse_date;
use super::models::{TrackArtistRecord, TrackArtistRow, WeeklyChartEntry, WeeklyRow};
use super::{DataError, Result};

/// Rows kept from the weekly table, plus how many were dropped.
pub struct WeeklyLoad {
    pub entries: Vec<WeeklyChartEntry>,
    pub dropped: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Read the weekly chart table.
///
/// Rows whose `chart_week` doesn't parse are treated as missing and dropped.
/// Every other field is strict.
pub fn read_weekly<R: Read>(input: R) -> Result<WeeklyLoad> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();

    let mut entries = Vec::new();
    let mut dropped = 0;

    for record in rdr.records() {
        let record = record?;
        let line = record_line(&record);
        let row: WeeklyRow = record.deserialize(Some(&headers))?;

        let Some(chart_week) = parse_date(&row.chart_week) else {
            log::debug!(
                "Dropping weekly row at line {}: unparseable chart_week {:?}",
                line,
                row.chart_week
            );
            dropped += 1;
            continue;
        };

        let list_position = parse_position(line, "list_position", &row.list_position)?;
        entries.push(WeeklyChartEntry {
            track_name: row.track_name,
            chart_week,
            list_position,
        });
    }

    if dropped > 0 {
        log::warn!("Dropped {} weekly chart rows with unparseable chart_week", dropped);
    }

    Ok(WeeklyLoad { entries, dropped })
}

/// Read the joined track/artist table. Any unparseable field fails the load.
pub fn read_track_artists<R: Read>(input: R) -> Result<Vec<TrackArtistRecord>> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record_line(&record);
        let row: TrackArtistRow = record.deserialize(Some(&headers))?;
        records.push(track_artist_record(line, row)?);
    }
    Ok(records)
}

fn track_artist_record(line: u64, row: TrackArtistRow) -> Result<TrackArtistRecord> {
    let chart_week = parse_date(&row.chart_week)
        .ok_or_else(|| parse_error(line, "chart_week", &row.chart_week, "not a date"))?;

    Ok(TrackArtistRecord {
        list_position: parse_position(line, "list_position", &row.list_position)?,
        duration_ms: parse_int(line, "duration_ms", &row.duration_ms)?,
        explicit: parse_bool(line, "explicit", &row.explicit)?,
        danceability: parse_number(line, "danceability", &row.danceability)?,
        energy: parse_number(line, "energy", &row.energy)?,
        tempo: parse_number(line, "tempo", &row.tempo)?,
        valence: parse_number(line, "valence", &row.valence)?,
        popularity: parse_optional_number(line, "popularity", row.popularity.as_deref())?,
        followers: parse_optional_number(line, "followers", row.followers.as_deref())?,
        track_id: row.track_id,
        track_name: row.track_name,
        artist_name: row.artist_name,
        chart_week,
        release_date: row.release_date,
    })
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_error(line: u64, column: &'static str, value: &str, message: impl ToString) -> DataError {
    DataError::Parse {
        line,
        column,
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_number<T: FromStr>(line: u64, column: &'static str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| parse_error(line, column, raw, e))
}

fn parse_optional_number(line: u64, column: &'static str, raw: Option<&str>) -> Result<Option<f64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("nan") => Ok(None),
        Some(s) => parse_number(line, column, s).map(Some),
    }
}

/// Integers written by dataframe exports may carry a `.0` suffix.
fn parse_int(line: u64, column: &'static str, raw: &str) -> Result<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        Ok(_) => Err(parse_error(line, column, raw, "not an integer")),
        Err(e) => Err(parse_error(line, column, raw, e)),
    }
}

fn parse_position(line: u64, column: &'static str, raw: &str) -> Result<u32> {
    let v = parse_int(line, column, raw)?;
    if v < 1 {
        return Err(parse_error(line, column, raw, "position must be at least 1"));
    }
    u32::try_from(v).map_err(|e| parse_error(line, column, raw, e))
}

fn parse_bool(line: u64, column: &'static str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(parse_error(line, column, raw, "not a boolean")),
    }
}
