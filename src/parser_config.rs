//! Parser options for controlling error handling and resource limits.
//!
//! ```
//! use pdftext::parser_config::ParserOptions;
//!
//! // Strict mode - a missing `endobj` is an error
//! let strict = ParserOptions::strict();
//!
//! // Lenient mode (the default) - recoverable defects are logged and skipped
//! let lenient = ParserOptions::lenient();
//!
//! let custom = ParserOptions {
//!     max_recursion_depth: 32,
//!     ..ParserOptions::default()
//! };
//! assert!(!custom.strict);
//! ```

/// Parser and resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParserOptions {
    /// Fail on recoverable defects (true) or log and continue (false).
    ///
    /// Only a missing `endobj` is affected today.
    pub strict: bool,

    /// Maximum array/dictionary nesting depth inside one object.
    pub max_nesting: usize,

    /// Maximum depth of nested indirect-object resolution.
    pub max_recursion_depth: u32,

    /// Maximum decompression ratio (decompressed:compressed).
    ///
    /// Default: 100. Set to 0 to disable the check.
    pub max_decompression_ratio: u32,

    /// Maximum decompressed stream size in bytes.
    ///
    /// Default: 100 MB. Set to 0 to disable the check.
    pub max_decompressed_size: usize,

    /// Maximum PDF file size in bytes.
    ///
    /// Default: 500 MB. Set to 0 to disable the check.
    pub max_file_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ParserOptions {
    /// Strict mode: fail on any structural defect.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::lenient()
        }
    }

    /// Lenient mode: recover from defects where the intent is clear.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            max_nesting: 100,
            max_recursion_depth: 100,
            max_decompression_ratio: 100,
            max_decompressed_size: 100 * 1024 * 1024,
            max_file_size: 500 * 1024 * 1024,
        }
    }

    /// Check a decoded size against the ratio and absolute limits.
    pub(crate) fn check_decompressed(&self, input_len: usize, output_len: usize) -> crate::error::Result<()> {
        if self.max_decompressed_size > 0 && output_len > self.max_decompressed_size {
            return Err(crate::error::Error::Decode(format!(
                "decompressed size {} exceeds limit {}",
                output_len, self.max_decompressed_size
            )));
        }
        if self.max_decompression_ratio > 0 && input_len > 0 {
            let ratio = output_len / input_len;
            // Small inputs legitimately expand a lot
            if output_len > 1024 * 1024 && ratio > self.max_decompression_ratio as usize {
                return Err(crate::error::Error::Decode(format!(
                    "decompression ratio {}:1 exceeds limit {}:1",
                    ratio, self.max_decompression_ratio
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        assert_eq!(ParserOptions::default(), ParserOptions::lenient());
        assert!(!ParserOptions::default().strict);
    }

    #[test]
    fn test_strict_keeps_limits() {
        let strict = ParserOptions::strict();
        assert!(strict.strict);
        assert_eq!(strict.max_nesting, 100);
        assert_eq!(strict.max_recursion_depth, 100);
    }

    #[test]
    fn test_check_decompressed_size_limit() {
        let options = ParserOptions {
            max_decompressed_size: 10,
            ..ParserOptions::default()
        };
        assert!(options.check_decompressed(5, 10).is_ok());
        assert!(options.check_decompressed(5, 11).is_err());
    }

    #[test]
    fn test_check_decompressed_ratio() {
        let options = ParserOptions::default();
        assert!(options.check_decompressed(10, 500).is_ok());
        assert!(options.check_decompressed(100, 2 * 1024 * 1024).is_err());

        let unchecked = ParserOptions {
            max_decompression_ratio: 0,
            ..ParserOptions::default()
        };
        assert!(unchecked.check_decompressed(100, 2 * 1024 * 1024).is_ok());
    }
}
