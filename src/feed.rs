//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module loads tabular limit order flow in the LOBSTER sample format and
// turns it into typed events the replay binary can drive into a book. It is a
// collaborator of the matching core, not part of it: its only contact with the
// engine is producing submissions and cancellations.
//
// Row format: `Time,Type,OrderID,Size,Price,Direction` where Type is
//   1 submission, 2 partial cancellation, 3 full deletion,
//   4 visible execution, 5 hidden execution, 7 trading halt
// and Direction is +1 for buys, -1 for sells. Prices are integer ticks
// (dollar price times 10000 in the sample data).
//--------------------------------------------------------------------------------------------------

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::types::{Price, Quantity, Side};

/// Errors produced while loading a feed file.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A row could not be parsed.
    #[error("malformed feed row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// The feed file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One event of order flow.
///
/// Both cancellation types map to a full cancel: the core accepts only full
/// cancels, so a partial deletion is replayed as removal of the whole order.
/// Execution echoes and halts are surfaced so the caller can decide what to
/// do with them; the replay skips both, since the engine derives its own
/// executions from crossing.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Submission of a new limit order (Type 1).
    Submit {
        time: f64,
        order_ref: u64,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    /// Cancellation, partial (Type 2) or full (Type 3).
    Cancel { time: f64, order_ref: u64 },
    /// Execution echo of a visible (Type 4) or hidden (Type 5) order.
    Execution {
        time: f64,
        order_ref: u64,
        quantity: Quantity,
        hidden: bool,
    },
    /// Trading halt indicator (Type 7).
    Halt { time: f64 },
}

/// Derives the deterministic order id for a raw feed order reference, so a
/// later cancel row resolves to the same id as the submission that created
/// the order.
#[inline]
pub fn order_uuid(order_ref: u64) -> Uuid {
    Uuid::from_u128(order_ref as u128)
}

/// Parses a single feed row. `line` is used only for error reporting.
pub fn parse_row(line: usize, row: &str) -> Result<FeedEvent, FeedError> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(FeedError::Malformed {
            line,
            reason: format!("expected 6 fields, found {}", fields.len()),
        });
    }

    let time: f64 = parse_field(line, fields[0], "Time")?;
    let event_type: u32 = parse_field(line, fields[1], "Type")?;
    let order_ref: u64 = parse_field(line, fields[2], "OrderID")?;
    let quantity: Quantity = parse_field(line, fields[3], "Size")?;
    let price: Price = parse_field(line, fields[4], "Price")?;
    let direction: i32 = parse_field(line, fields[5], "Direction")?;

    match event_type {
        1 => {
            let side = match direction {
                1 => Side::Buy,
                -1 => Side::Sell,
                other => {
                    return Err(FeedError::Malformed {
                        line,
                        reason: format!("unknown direction {other}"),
                    });
                }
            };
            Ok(FeedEvent::Submit {
                time,
                order_ref,
                side,
                price,
                quantity,
            })
        }
        2 | 3 => Ok(FeedEvent::Cancel { time, order_ref }),
        4 | 5 => Ok(FeedEvent::Execution {
            time,
            order_ref,
            quantity,
            hidden: event_type == 5,
        }),
        7 => Ok(FeedEvent::Halt { time }),
        other => Err(FeedError::Malformed {
            line,
            reason: format!("unknown event type {other}"),
        }),
    }
}

/// Loads every event from a feed file, in file order. Blank lines and an
/// optional `Time,...` header row are skipped.
pub fn load_events(path: &Path) -> Result<Vec<FeedEvent>, FeedError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let row = line?;
        let row = row.trim();
        if row.is_empty() || (line_no == 1 && row.starts_with("Time")) {
            continue;
        }
        events.push(parse_row(line_no, row)?);
    }
    Ok(events)
}

fn parse_field<T: std::str::FromStr>(
    line: usize,
    raw: &str,
    name: &str,
) -> Result<T, FeedError> {
    raw.parse().map_err(|_| FeedError::Malformed {
        line,
        reason: format!("unparseable {name} field: {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_submission() {
        let event = parse_row(1, "34200.015248,1,16116658,100,310400,-1").unwrap();
        assert_eq!(
            event,
            FeedEvent::Submit {
                time: 34200.015248,
                order_ref: 16116658,
                side: Side::Sell,
                price: 310400,
                quantity: 100,
            }
        );
    }

    #[test]
    fn test_parse_cancellations() {
        let full = parse_row(1, "34200.013994,3,16085616,100,310400,-1").unwrap();
        assert_eq!(
            full,
            FeedEvent::Cancel {
                time: 34200.013994,
                order_ref: 16085616
            }
        );

        // Partial deletions also map to a full cancel.
        let partial = parse_row(2, "34201.5,2,16085617,50,310400,1").unwrap();
        assert!(matches!(partial, FeedEvent::Cancel { order_ref: 16085617, .. }));
    }

    #[test]
    fn test_parse_executions_and_halt() {
        let visible = parse_row(1, "34202.0,4,16085618,100,310400,1").unwrap();
        assert!(matches!(
            visible,
            FeedEvent::Execution { hidden: false, quantity: 100, .. }
        ));

        let hidden = parse_row(2, "34202.1,5,0,100,310400,-1").unwrap();
        assert!(matches!(hidden, FeedEvent::Execution { hidden: true, .. }));

        let halt = parse_row(3, "34203.0,7,0,0,-1,-1").unwrap();
        assert!(matches!(halt, FeedEvent::Halt { .. }));
    }

    #[test]
    fn test_malformed_rows() {
        assert!(matches!(
            parse_row(4, "34200.0,1,1,100,310400"),
            Err(FeedError::Malformed { line: 4, .. })
        ));
        assert!(matches!(
            parse_row(5, "not-a-number,1,1,100,310400,1"),
            Err(FeedError::Malformed { line: 5, .. })
        ));
        assert!(matches!(
            parse_row(6, "34200.0,9,1,100,310400,1"),
            Err(FeedError::Malformed { line: 6, .. })
        ));
        assert!(matches!(
            parse_row(7, "34200.0,1,1,100,310400,0"),
            Err(FeedError::Malformed { line: 7, .. })
        ));
    }

    #[test]
    fn test_order_uuid_is_deterministic() {
        assert_eq!(order_uuid(42), order_uuid(42));
        assert_ne!(order_uuid(42), order_uuid(43));
    }

    #[test]
    fn test_load_events_skips_header_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Time,Type,OrderID,Size,Price,Direction").unwrap();
        writeln!(file, "34200.0,1,100,10,1000,1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "34201.0,3,100,10,1000,1").unwrap();

        let events = load_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], FeedEvent::Submit { order_ref: 100, .. }));
        assert!(matches!(events[1], FeedEvent::Cancel { order_ref: 100, .. }));
    }

    #[test]
    fn test_load_events_reports_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "34200.0,1,100,10,1000,1").unwrap();
        writeln!(file, "garbage").unwrap();

        let err = load_events(file.path()).unwrap_err();
        assert!(matches!(err, FeedError::Malformed { line: 2, .. }));
    }
}
