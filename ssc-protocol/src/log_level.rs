//! Severity levels carried by device log messages

/// Log severity sent in parameter `a` of an outbound log frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogLevel {
    /// Unrecoverable or unexpected condition
    Error,
    /// Something the host should know about
    Warn,
    /// Informational message
    Info,
}

// Wire format values
const LEVEL_ERROR: u8 = 0x01;
const LEVEL_WARN: u8 = 0x02;
const LEVEL_INFO: u8 = 0x03;

impl LogLevel {
    /// Parse a level from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            LEVEL_ERROR => Some(LogLevel::Error),
            LEVEL_WARN => Some(LogLevel::Warn),
            LEVEL_INFO => Some(LogLevel::Info),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            LogLevel::Error => LEVEL_ERROR,
            LogLevel::Warn => LEVEL_WARN,
            LogLevel::Info => LEVEL_INFO,
        }
    }

    /// Label used by host-side log output
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARNING",
            LogLevel::Info => "INFO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(LogLevel::Error.to_byte(), 0x01);
        assert_eq!(LogLevel::Warn.to_byte(), 0x02);
        assert_eq!(LogLevel::Info.to_byte(), 0x03);
        assert_eq!(LogLevel::from_byte(0x02), Some(LogLevel::Warn));
    }

    #[test]
    fn test_unknown_level() {
        assert!(LogLevel::from_byte(0x00).is_none());
        assert!(LogLevel::from_byte(0x04).is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(LogLevel::Warn.as_str(), "WARNING");
        assert_eq!(LogLevel::Info.as_str(), "INFO");
    }
}
