//! Store configuration.

use delimdb_codec::{LineFormat, DEFAULT_DELIMITER};

use crate::encoding::TextEncoding;

/// Format and persistence options of a [`crate::CsvStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Cell delimiter.
    pub delimiter: char,

    /// Whether files start with a header line.
    pub header: bool,

    /// Whether rows with the wrong cell count are dropped.
    pub strict: bool,

    /// Whether cells are trimmed before conversion.
    pub trim: bool,

    /// Number of leading lines skipped before the header.
    pub line_skip: usize,

    /// Whether child rows carry a trailing timestamp column.
    pub add_timestamp: bool,

    /// Whether child files are read back on load (and rewritten on save).
    pub load_children: bool,

    /// Whether mutations schedule a background save.
    pub auto_save: bool,

    /// Text encoding of main and child files.
    pub encoding: TextEncoding,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            header: true,
            strict: true,
            trim: true,
            line_skip: 0,
            add_timestamp: false,
            load_children: false,
            auto_save: false,
            encoding: TextEncoding::Utf8,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cell delimiter.
    #[must_use]
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether a header line is written and expected.
    #[must_use]
    pub const fn header(mut self, value: bool) -> Self {
        self.header = value;
        self
    }

    /// Sets strict arity checking.
    #[must_use]
    pub const fn strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }

    /// Sets cell trimming.
    #[must_use]
    pub const fn trim(mut self, value: bool) -> Self {
        self.trim = value;
        self
    }

    /// Sets how many leading lines load skips.
    #[must_use]
    pub const fn line_skip(mut self, lines: usize) -> Self {
        self.line_skip = lines;
        self
    }

    /// Sets whether child rows get a timestamp column.
    #[must_use]
    pub const fn add_timestamp(mut self, value: bool) -> Self {
        self.add_timestamp = value;
        self
    }

    /// Sets whether child files are loaded.
    #[must_use]
    pub const fn load_children(mut self, value: bool) -> Self {
        self.load_children = value;
        self
    }

    /// Sets background saving after mutations.
    #[must_use]
    pub const fn auto_save(mut self, value: bool) -> Self {
        self.auto_save = value;
        self
    }

    /// Sets the text encoding.
    #[must_use]
    pub const fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Returns the line-level parse options.
    #[must_use]
    pub const fn line_format(&self) -> LineFormat {
        LineFormat {
            delimiter: self.delimiter,
            strict: self.strict,
            trim: self.trim,
        }
    }
}
