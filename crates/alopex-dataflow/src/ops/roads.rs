use chrono::{NaiveDateTime, Timelike};

use crate::operator::Mapper;
use crate::{DataflowError, Result, Row, Value};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Accepted timestamp layouts, tried in order. `%.f` also matches no fraction.
const TIME_FORMATS: [&str; 2] = ["%Y%m%dT%H%M%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Great-circle length in kilometres between two `[lon, lat]` columns.
#[derive(Debug, Clone)]
pub struct EdgeLength {
    start_column: String,
    end_column: String,
    length_column: String,
}

impl EdgeLength {
    pub fn new(
        start_column: impl Into<String>,
        end_column: impl Into<String>,
        length_column: impl Into<String>,
    ) -> Self {
        Self {
            start_column: start_column.into(),
            end_column: end_column.into(),
            length_column: length_column.into(),
        }
    }
}

impl Mapper for EdgeLength {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let (lon1, lat1) = coordinates(&row, &self.start_column)?;
        let (lon2, lat2) = coordinates(&row, &self.end_column)?;
        let half_dlat = (lat2 - lat1) / 2.0;
        let half_dlon = (lon2 - lon1) / 2.0;
        let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
        row.insert(
            self.length_column.clone(),
            2.0 * EARTH_RADIUS_KM * h.sqrt().asin(),
        );
        Ok(vec![row])
    }
}

/// `[lon, lat]` in radians.
fn coordinates(row: &Row, column: &str) -> Result<(f64, f64)> {
    let value = row.get(column)?;
    let mismatch =
        || DataflowError::type_mismatch(column.to_string(), "[lon, lat]", value.type_name());
    match value.as_list() {
        Some([lon, lat]) => {
            let lon = lon.as_f64().ok_or_else(mismatch)?;
            let lat = lat.as_f64().ok_or_else(mismatch)?;
            Ok((lon.to_radians(), lat.to_radians()))
        }
        _ => Err(mismatch()),
    }
}

/// Derive travel duration (seconds), weekday (`Mon`..`Sun`) and hour of day
/// from an enter and a leave timestamp. Weekday and hour come from the enter time.
#[derive(Debug, Clone)]
pub struct TravelTime {
    enter_column: String,
    leave_column: String,
    duration_column: String,
    weekday_column: String,
    hour_column: String,
}

impl TravelTime {
    pub fn new(
        enter_column: impl Into<String>,
        leave_column: impl Into<String>,
        duration_column: impl Into<String>,
        weekday_column: impl Into<String>,
        hour_column: impl Into<String>,
    ) -> Self {
        Self {
            enter_column: enter_column.into(),
            leave_column: leave_column.into(),
            duration_column: duration_column.into(),
            weekday_column: weekday_column.into(),
            hour_column: hour_column.into(),
        }
    }
}

impl Mapper for TravelTime {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let enter = timestamp(&row, &self.enter_column)?;
        let leave = timestamp(&row, &self.leave_column)?;
        let micros = leave
            .signed_duration_since(enter)
            .num_microseconds()
            .ok_or_else(|| DataflowError::operator("TravelTime", "duration out of range"))?;

        row.insert(self.weekday_column.clone(), enter.format("%a").to_string());
        row.insert(self.hour_column.clone(), i64::from(enter.hour()));
        row.insert(self.duration_column.clone(), micros as f64 / 1e6);
        Ok(vec![row])
    }
}

fn timestamp(row: &Row, column: &str) -> Result<NaiveDateTime> {
    let text = row.get_str(column)?;
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| {
            DataflowError::operator(
                "TravelTime",
                format!("cannot parse '{text}' in column '{column}' as a timestamp"),
            )
        })
}

/// Speed in km/h from a length (km) and a duration (seconds).
#[derive(Debug, Clone)]
pub struct Speed {
    length_column: String,
    duration_column: String,
    speed_column: String,
}

impl Speed {
    pub fn new(
        length_column: impl Into<String>,
        duration_column: impl Into<String>,
        speed_column: impl Into<String>,
    ) -> Self {
        Self {
            length_column: length_column.into(),
            duration_column: duration_column.into(),
            speed_column: speed_column.into(),
        }
    }
}

impl Mapper for Speed {
    fn map(&self, mut row: Row) -> Result<Vec<Row>> {
        let length = row.get_f64(&self.length_column)?;
        let seconds = row.get_f64(&self.duration_column)?;
        if seconds == 0.0 {
            return Err(DataflowError::operator(
                "Speed",
                format!("'{}' is zero", self.duration_column),
            ));
        }
        row.insert(
            self.speed_column.clone(),
            Value::Float(length / seconds * 3600.0),
        );
        Ok(vec![row])
    }
}
