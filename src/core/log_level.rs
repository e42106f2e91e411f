//! Log level definitions and the static level filter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    #[default]
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Critical = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Single-byte tag written into every record
    #[inline]
    pub const fn tag(&self) -> u8 {
        match self {
            LogLevel::Trace => b'T',
            LogLevel::Debug => b'D',
            LogLevel::Info => b'I',
            LogLevel::Warn => b'W',
            LogLevel::Error => b'E',
            LogLevel::Critical => b'C',
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'T' => Some(LogLevel::Trace),
            b'D' => Some(LogLevel::Debug),
            b'I' => Some(LogLevel::Info),
            b'W' => Some(LogLevel::Warn),
            b'E' => Some(LogLevel::Error),
            b'C' => Some(LogLevel::Critical),
            _ => None,
        }
    }

    /// Level for its discriminant (`level as u8`)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Trace),
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warn),
            4 => Some(LogLevel::Error),
            5 => Some(LogLevel::Critical),
            _ => None,
        }
    }

    /// Whether this level passes the compile-time minimum.
    ///
    /// Both sides are constants for a literal level, so calls below
    /// [`STATIC_MIN_LEVEL`] are removed by the optimizer.
    #[inline(always)]
    pub const fn statically_enabled(self) -> bool {
        self as u8 >= STATIC_MIN_LEVEL as u8
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Critical => BrightRed,
        }
    }
}

/// Compile-time minimum level, selected with the `static-min-*` features
pub const STATIC_MIN_LEVEL: LogLevel = if cfg!(feature = "static-min-critical") {
    LogLevel::Critical
} else if cfg!(feature = "static-min-error") {
    LogLevel::Error
} else if cfg!(feature = "static-min-warn") {
    LogLevel::Warn
} else if cfg!(feature = "static-min-info") {
    LogLevel::Info
} else if cfg!(feature = "static-min-debug") {
    LogLevel::Debug
} else {
    LogLevel::Trace
};

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_tags_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_tag(level.tag()), Some(level));
        }
        assert_eq!(LogLevel::from_tag(b'X'), None);
    }

    #[test]
    fn test_from_u8_matches_discriminant() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_u8(6), None);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("fatal".parse::<LogLevel>(), Ok(LogLevel::Critical));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_critical_always_statically_enabled() {
        assert!(LogLevel::Critical.statically_enabled());
    }
}
