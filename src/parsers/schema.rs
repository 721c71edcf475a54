//! Tokenizer + field-schema tables for columnar command output.
//!
//! Each whitespace-delimited table format gets one declarative
//! [`RowSchema`] naming its columns. Parsers look fields up by name, so
//! supporting a tool that shuffles or extends its columns is a schema
//! change, not a new parser.

/// One named column at a fixed token position.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub index: usize,
}

/// Declarative description of one whitespace-delimited row format.
#[derive(Debug, Clone, Copy)]
pub struct RowSchema {
    /// Format name.
    pub name: &'static str,
    /// Rows with fewer tokens than this are malformed and skipped.
    pub min_fields: usize,
    pub fields: &'static [FieldSpec],
}

impl RowSchema {
    /// Tokenizes one line against this schema. Returns `None` for rows
    /// with too few fields; the caller skips them, matching how the
    /// kernel-table formats intermix valid and irrelevant lines.
    pub fn parse_line<'a>(&'static self, line: &'a str) -> Option<Row<'a>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < self.min_fields {
            return None;
        }
        Some(Row {
            tokens,
            schema: self,
        })
    }
}

/// A tokenized row with schema-driven field access.
#[derive(Debug)]
pub struct Row<'a> {
    tokens: Vec<&'a str>,
    schema: &'static RowSchema,
}

impl<'a> Row<'a> {
    fn position(&self, field: &str) -> Option<usize> {
        self.schema
            .fields
            .iter()
            .find(|column| column.name == field)
            .map(|column| column.index)
    }

    pub fn get(&self, field: &str) -> Option<&'a str> {
        let index = self.position(field)?;
        self.tokens.get(index).copied()
    }

    /// Numeric field access in the kernel-counter style: a malformed or
    /// absent value reads as 0, matching how partial rows are tolerated.
    pub fn u64_field(&self, field: &str) -> u64 {
        self.get(field)
            .and_then(|token| token.parse().ok())
            .unwrap_or(0)
    }

    pub fn f64_field(&self, field: &str) -> f64 {
        self.get(field)
            .and_then(|token| token.parse().ok())
            .unwrap_or(0.0)
    }

    /// Joins every token from `field` onward; the trailing free-text
    /// column of `ps`-style tables.
    pub fn rest_from(&self, field: &str) -> String {
        match self.position(field) {
            Some(index) if index < self.tokens.len() => self.tokens[index..].join(" "),
            _ => String::new(),
        }
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }
}

/// `df -TB1`: Filesystem Type 1B-blocks Used Available Use% Mounted on.
pub static DF_SCHEMA: RowSchema = RowSchema {
    name: "df",
    min_fields: 7,
    fields: &[
        FieldSpec { name: "device", index: 0 },
        FieldSpec { name: "fstype", index: 1 },
        FieldSpec { name: "size", index: 2 },
        FieldSpec { name: "used", index: 3 },
        FieldSpec { name: "free", index: 4 },
        FieldSpec { name: "percent", index: 5 },
        FieldSpec { name: "mountpoint", index: 6 },
    ],
};

/// `/proc/diskstats`: major minor device reads... The sector counters sit
/// at fixed kernel-documented positions.
pub static DISKSTATS_SCHEMA: RowSchema = RowSchema {
    name: "diskstats",
    min_fields: 14,
    fields: &[
        FieldSpec { name: "device", index: 2 },
        FieldSpec { name: "reads_completed", index: 3 },
        FieldSpec { name: "sectors_read", index: 5 },
        FieldSpec { name: "writes_completed", index: 7 },
        FieldSpec { name: "sectors_written", index: 9 },
    ],
};

/// `ps aux`: USER PID %CPU %MEM VSZ RSS TTY STAT START TIME COMMAND.
pub static PS_SCHEMA: RowSchema = RowSchema {
    name: "ps",
    min_fields: 11,
    fields: &[
        FieldSpec { name: "user", index: 0 },
        FieldSpec { name: "pid", index: 1 },
        FieldSpec { name: "cpu", index: 2 },
        FieldSpec { name: "mem", index: 3 },
        FieldSpec { name: "vsz", index: 4 },
        FieldSpec { name: "rss", index: 5 },
        FieldSpec { name: "tty", index: 6 },
        FieldSpec { name: "stat", index: 7 },
        FieldSpec { name: "start", index: 8 },
        FieldSpec { name: "time", index: 9 },
        FieldSpec { name: "command", index: 10 },
    ],
};

/// `ip -o addr`: ifindex name family address/prefix ...
pub static ADDR_SCHEMA: RowSchema = RowSchema {
    name: "ip-addr",
    min_fields: 4,
    fields: &[
        FieldSpec { name: "name", index: 1 },
        FieldSpec { name: "family", index: 2 },
        FieldSpec { name: "address", index: 3 },
    ],
};
