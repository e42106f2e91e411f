//! Property-based tests for zerolog using proptest

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::VecDeque;
use zerolog::core::record::{self, RecordView};
use zerolog::{LogLevel, Logger, MemorySink};
use zerolog::{MpscRingBuffer, ENTRY_SIZE, PAYLOAD_CAPACITY};

// ============================================================================
// Queue Model Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Enqueue(Vec<u8>),
    Dequeue,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::collection::vec(any::<u8>(), 0..400).prop_map(Op::Enqueue),
        2 => Just(Op::Dequeue),
    ]
}

proptest! {
    /// A single-threaded run behaves like a bounded FIFO of truncated payloads
    #[test]
    fn test_queue_matches_fifo_model(
        capacity_log2 in 0u32..5,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let capacity = 1usize << capacity_log2;
        let (queue, mut consumer) = MpscRingBuffer::bounded(ENTRY_SIZE, capacity).unwrap();
        let mut model: VecDeque<Vec<u8>> = VecDeque::new();
        let mut out = vec![0u8; ENTRY_SIZE];

        for op in ops {
            match op {
                Op::Enqueue(payload) => {
                    let accepted = queue.try_enqueue(&payload);
                    prop_assert_eq!(accepted, model.len() < capacity);
                    if accepted {
                        let kept = payload.len().min(PAYLOAD_CAPACITY);
                        model.push_back(payload[..kept].to_vec());
                    }
                }
                Op::Dequeue => {
                    let got = consumer.try_dequeue(&mut out).map(|len| out[..len].to_vec());
                    prop_assert_eq!(got, model.pop_front());
                }
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert!(queue.len() <= queue.capacity());
        }
    }
}

// ============================================================================
// Record Format Tests
// ============================================================================

proptest! {
    /// Formatting is deterministic and always yields one parseable line
    #[test]
    fn test_format_produces_single_bounded_line(
        message in "[a-zA-Z0-9 =,.:]{0,600}",
        secs in 0i64..4_000_000_000,
        nanos in 0u32..1_000_000_000,
        level_idx in 0usize..6,
    ) {
        let level = LogLevel::ALL[level_idx];
        let now = Utc.timestamp_opt(secs, nanos).unwrap();

        let mut first = Vec::new();
        let mut second = Vec::new();
        let truncated = record::format_into(&mut first, level, format_args!("{}", message), now);
        record::format_into(&mut second, level, format_args!("{}", message), now);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= PAYLOAD_CAPACITY);
        prop_assert_eq!(first.last(), Some(&b'\n'));
        prop_assert_eq!(first.iter().filter(|&&b| b == b'\n').count(), 1);
        let full_len = format!("{}.{:09} {} ", secs, nanos, level.tag() as char).len()
            + message.len()
            + 1;
        prop_assert_eq!(truncated, full_len > PAYLOAD_CAPACITY);

        let view = RecordView::parse(&first).unwrap();
        prop_assert_eq!(view.seconds, secs);
        prop_assert_eq!(view.nanos, nanos);
        prop_assert_eq!(view.level, level);
        let text = view.message_str().unwrap();
        prop_assert!(message.starts_with(text));
        if !truncated {
            prop_assert_eq!(text, message.as_str());
        }
    }

    /// Truncation keeps exactly the first PAYLOAD_CAPACITY - 1 bytes
    #[test]
    fn test_truncate_keeps_prefix(buf in prop::collection::vec(any::<u8>(), 0..1000)) {
        let mut cut = buf.clone();
        let truncated = record::truncate(&mut cut);

        prop_assert_eq!(truncated, buf.len() > PAYLOAD_CAPACITY);
        if truncated {
            prop_assert_eq!(cut.len(), PAYLOAD_CAPACITY);
            prop_assert_eq!(&cut[..PAYLOAD_CAPACITY - 1], &buf[..PAYLOAD_CAPACITY - 1]);
            prop_assert_eq!(cut[PAYLOAD_CAPACITY - 1], b'\n');
        } else {
            prop_assert_eq!(cut, buf);
        }
    }
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// LogLevel string conversions roundtrip in any case
    #[test]
    fn test_log_level_str_roundtrip(level_idx in 0usize..6, use_lower in any::<bool>()) {
        let level = LogLevel::ALL[level_idx];
        let text = if use_lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        prop_assert_eq!(text.parse::<LogLevel>(), Ok(level));
    }

    /// Numeric order, tag order and enum order agree
    #[test]
    fn test_log_level_ordering(a in 0usize..6, b in 0usize..6) {
        let (la, lb) = (LogLevel::ALL[a], LogLevel::ALL[b]);
        prop_assert_eq!(la < lb, a < b);
        prop_assert_eq!((la as u8) < (lb as u8), a < b);
        prop_assert_eq!(LogLevel::from_tag(la.tag()), Some(la));
    }

    /// Sync logging never panics and the dynamic filter is exact
    #[test]
    fn test_sync_logger_filter(min_idx in 0usize..6, level_idx in 0usize..6, message in ".{0,300}") {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .sink(sink.clone())
            .min_level(LogLevel::ALL[min_idx])
            .build()
            .unwrap();

        logger.log(LogLevel::ALL[level_idx], format_args!("{}", message));
        prop_assert_eq!(sink.len(), usize::from(level_idx >= min_idx));
    }
}
