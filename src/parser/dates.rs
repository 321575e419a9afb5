use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::record::RawTable;
use crate::error::{Result, SetupError};
use crate::schema::{OutOfRange, TableSchema};

/// First date representable as a nanosecond timestamp
pub fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1677, 9, 22).unwrap_or(NaiveDate::MIN)
}

/// Last date representable as a nanosecond timestamp
pub fn latest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2262, 4, 11).unwrap_or(NaiveDate::MAX)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateProblem {
    /// Not a date in any accepted spelling
    Malformed,
    /// A real date, but outside the representable window
    OutOfRange(NaiveDate),
}

impl std::fmt::Display for DateProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateProblem::Malformed => write!(f, "not a recognised date"),
            DateProblem::OutOfRange(d) => write!(
                f,
                "{} is outside {} .. {}",
                d,
                earliest_date(),
                latest_date()
            ),
        }
    }
}

/// Parse a date or datetime string, dropping any time part
pub fn parse_date(value: &str) -> std::result::Result<NaiveDate, DateProblem> {
    let value = value.trim();

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or(DateProblem::Malformed)?;

    if parsed < earliest_date() || parsed > latest_date() {
        return Err(DateProblem::OutOfRange(parsed));
    }

    Ok(parsed)
}

/// A date that was loaded as NULL, kept for manual inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedDate {
    pub table: &'static str,
    pub column: &'static str,
    pub row_id: String,
    pub value: String,
}

/// Rewrite every date column of `raw` to ISO `YYYY-MM-DD`.
///
/// Out-of-range values in lenient columns become NULL and are returned;
/// anything else that fails to parse is an error.
pub fn normalize_dates(schema: &TableSchema, raw: &mut RawTable) -> Result<Vec<UnparsedDate>> {
    let id_index = schema
        .primary_key
        .first()
        .and_then(|pk| raw.column_index(pk));
    let mut unparsed = Vec::new();

    for column in schema.date_columns() {
        let Some(index) = raw.column_index(column.name) else {
            // Missing columns are reported by the loader with file context
            continue;
        };

        for (row_number, row) in raw.rows.iter_mut().enumerate() {
            let Some(value) = row[index].take() else {
                continue;
            };

            let problem = match parse_date(&value) {
                Ok(date) => {
                    row[index] = Some(date.format("%Y-%m-%d").to_string());
                    continue;
                }
                Err(problem) => problem,
            };

            // Header is line 1
            let row_id = id_index
                .and_then(|i| row[i].clone())
                .unwrap_or_else(|| format!("line {}", row_number + 2));

            match (problem, column.out_of_range) {
                (DateProblem::OutOfRange(_), OutOfRange::Null) => {
                    unparsed.push(UnparsedDate {
                        table: schema.name,
                        column: column.name,
                        row_id,
                        value,
                    });
                }
                (problem, _) => {
                    return Err(SetupError::Date {
                        table: schema.name,
                        column: column.name,
                        row_id,
                        value,
                        reason: problem.to_string(),
                    });
                }
            }
        }
    }

    Ok(unparsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_records;
    use crate::schema::{NaPolicy, MOVIE, PERSON};

    fn person_table(rows: &[(&str, &str, &str)]) -> RawTable {
        let mut text = String::from("id,name,birthday,deathday\n");
        for (id, birthday, deathday) in rows {
            text.push_str(&format!("{},Someone,{},{}\n", id, birthday, deathday));
        }
        read_records(text.as_bytes(), NaPolicy::Default, "people.csv").unwrap()
    }

    #[test]
    fn test_parse_accepted_spellings() {
        let expected = NaiveDate::from_ymd_opt(1937, 3, 17).unwrap();
        assert_eq!(parse_date("1937-03-17"), Ok(expected));
        assert_eq!(parse_date("1937/03/17"), Ok(expected));
        assert_eq!(parse_date("1937-03-17 00:00:00"), Ok(expected));
        assert_eq!(parse_date("1937-03-17T12:30:00.5"), Ok(expected));
        assert_eq!(parse_date(" 1937-03-17 "), Ok(expected));
    }

    #[test]
    fn test_parse_window_edges() {
        assert_eq!(parse_date("1677-09-22"), Ok(earliest_date()));
        assert_eq!(parse_date("2262-04-11"), Ok(latest_date()));
        assert!(matches!(parse_date("1677-09-21"), Err(DateProblem::OutOfRange(_))));
        assert!(matches!(parse_date("2262-04-12"), Err(DateProblem::OutOfRange(_))));
        assert!(matches!(parse_date("1628-01-12"), Err(DateProblem::OutOfRange(_))));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_date("1995-02-30"), Err(DateProblem::Malformed));
        assert_eq!(parse_date("yesterday"), Err(DateProblem::Malformed));
        assert_eq!(parse_date(""), Err(DateProblem::Malformed));
    }

    #[test]
    fn test_person_out_of_range_becomes_null() {
        let mut raw = person_table(&[
            ("44217", "1628-01-12", ""),
            ("6210", "1564-04-23", "1616-04-23"),
            ("31", "1956-07-09 00:00:00", ""),
        ]);

        let unparsed = normalize_dates(&PERSON, &mut raw).unwrap();

        assert_eq!(raw.rows[0][2], None);
        assert_eq!(raw.rows[1][2], None);
        assert_eq!(raw.rows[1][3], None);
        assert_eq!(raw.rows[2][2].as_deref(), Some("1956-07-09"));
        assert_eq!(raw.rows[2][3], None);

        assert_eq!(unparsed.len(), 3);
        assert_eq!(
            unparsed[0],
            UnparsedDate {
                table: "person",
                column: "birthday",
                row_id: "44217".to_string(),
                value: "1628-01-12".to_string(),
            }
        );
        assert_eq!(unparsed[2].column, "deathday");
        assert_eq!(unparsed[2].row_id, "6210");
    }

    #[test]
    fn test_person_malformed_still_fails() {
        let mut raw = person_table(&[("7", "1970-13-01", "")]);
        let err = normalize_dates(&PERSON, &mut raw).unwrap_err();
        assert!(matches!(err, SetupError::Date { column: "birthday", .. }));
    }

    #[test]
    fn test_movie_release_date_out_of_range_fails() {
        let text = "id,title,release_date\n862,Toy Story,1995-10-30\n5,Old,1600-01-01\n";
        let mut raw = read_records(text.as_bytes(), NaPolicy::Default, "movies.csv").unwrap();

        let err = normalize_dates(&MOVIE, &mut raw).unwrap_err();
        match err {
            SetupError::Date { table, row_id, value, .. } => {
                assert_eq!(table, "movie");
                assert_eq!(row_id, "5");
                assert_eq!(value, "1600-01-01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_movie_missing_release_date_is_null() {
        let text = "id,title,release_date\n862,Toy Story,\n";
        let mut raw = read_records(text.as_bytes(), NaPolicy::Default, "movies.csv").unwrap();
        assert!(normalize_dates(&MOVIE, &mut raw).unwrap().is_empty());
        assert_eq!(raw.rows[0][2], None);
    }
}
