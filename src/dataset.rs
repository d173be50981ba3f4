//! Dataset types for medir.
//!
//! Provides the [`Dataset`] trait and [`DataTable`] implementation for
//! working with Arrow-based tabular data. Rules are evaluated against a
//! [`Dataset`]; missing values are Arrow nulls and propagate through rule
//! expressions as unknown markers.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, RecordBatch},
    compute::concat_batches,
    datatypes::{Field, Schema, SchemaRef},
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};

use crate::error::{Error, Result};

/// Read-only column access over tabular data.
///
/// The evaluator resolves rule identifiers against a `Dataset` before
/// falling back to the rule's captured scope. All implementations must be
/// thread-safe (Send + Sync) so independent rules can be evaluated in
/// parallel.
pub trait Dataset: Send + Sync {
    /// Returns the number of rows shared by every column.
    fn row_count(&self) -> usize;

    /// Returns true if the dataset contains no rows.
    fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns the schema of the dataset.
    fn schema(&self) -> SchemaRef;

    /// Returns the column with the given name as a read-only view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no such column exists.
    fn column(&self, name: &str) -> Result<ArrayRef>;

    /// Returns true if a column with the given name exists.
    fn has_column(&self, name: &str) -> bool;

    /// Returns the column names in declaration order.
    fn column_names(&self) -> Vec<String>;
}

/// An in-memory dataset backed by a single Arrow RecordBatch.
///
/// This is the primary dataset type for medir. Multiple input batches are
/// consolidated at load time so column access is a single contiguous view,
/// which is what rule evaluation wants.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use medir::{DataTable, Dataset};
///
/// let cyl: ArrayRef = Arc::new(Int64Array::from(vec![6, 6, 4]));
/// let table = DataTable::from_columns(vec![("cyl", cyl)]).unwrap();
/// assert_eq!(table.row_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DataTable {
    batch: RecordBatch,
}

impl DataTable {
    /// Creates a DataTable from named columns of equal length.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No columns are supplied
    /// - Column lengths differ ([`Error::InconsistentColumnLength`])
    /// - A column name repeats ([`Error::DuplicateColumn`])
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, ArrayRef)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let columns: Vec<(String, ArrayRef)> = columns
            .into_iter()
            .map(|(name, array)| (name.into(), array))
            .collect();

        let expected = columns[0].1.len();
        for (name, array) in &columns {
            if array.len() != expected {
                return Err(Error::InconsistentColumnLength {
                    column: name.clone(),
                    expected,
                    actual: array.len(),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for (name, _) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateColumn { name: name.clone() });
            }
        }

        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();

        let batch = RecordBatch::try_new(schema, arrays).map_err(Error::Arrow)?;
        Ok(Self { batch })
    }

    /// Creates a DataTable from a single RecordBatch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Creates a DataTable from a vector of RecordBatches.
    ///
    /// The batches are concatenated into one contiguous batch.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batches vector is empty
    /// - The batches have inconsistent schemas
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let schema = batches[0].schema();
        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {} has different schema than batch 0",
                    i
                )));
            }
        }

        let batch = concat_batches(&schema, &batches).map_err(Error::Arrow)?;
        Ok(Self { batch })
    }

    /// Returns the underlying RecordBatch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Loads a dataset from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The file is not valid Parquet
    /// - The file is empty
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(Error::Parquet)?;
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Saves the dataset to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, self.batch.schema(), Some(props))
            .map_err(Error::Parquet)?;

        writer.write(&self.batch).map_err(Error::Parquet)?;
        writer.close().map_err(Error::Parquet)?;
        Ok(())
    }

    /// Loads a dataset from Parquet bytes in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid Parquet.
    pub fn from_parquet_bytes(data: &[u8]) -> Result<Self> {
        use bytes::Bytes;

        let bytes = Bytes::copy_from_slice(data);

        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).map_err(Error::Parquet)?;
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Converts the dataset to Parquet bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_parquet_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let cursor = std::io::Cursor::new(&mut buffer);

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(cursor, self.batch.schema(), Some(props))
            .map_err(Error::Parquet)?;

        writer.write(&self.batch).map_err(Error::Parquet)?;
        writer.close().map_err(Error::Parquet)?;
        Ok(buffer)
    }

    /// Loads a dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The file is not valid CSV
    /// - The file is empty
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a dataset from a CSV file with options.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the file is empty.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        // Get schema (infer or use provided)
        let schema = if let Some(schema) = options.schema {
            Arc::new(schema)
        } else {
            let mut format = Format::default().with_header(options.has_header);
            if let Some(delim) = options.delimiter {
                format = format.with_delimiter(delim);
            }
            let (inferred, _) = format
                .infer_schema(&mut buf_reader, Some(1000))
                .map_err(Error::Arrow)?;

            buf_reader
                .seek(SeekFrom::Start(0))
                .map_err(|e| Error::io(e, path))?;

            Arc::new(inferred)
        };

        let mut builder = ReaderBuilder::new(schema)
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);

        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let reader = builder.build(buf_reader).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Loads a dataset from a CSV string with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let mut cursor_for_infer = Cursor::new(data.as_bytes());
        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(&mut cursor_for_infer, Some(1000))
            .map_err(Error::Arrow)?;

        let schema = Arc::new(inferred);
        let cursor = Cursor::new(data.as_bytes());

        let builder = ReaderBuilder::new(schema)
            .with_batch_size(8192)
            .with_header(true);
        let reader = builder.build(cursor).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }

    /// Loads a dataset from a JSON Lines (JSONL) file.
    ///
    /// Each line in the file should be a valid JSON object representing a
    /// row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_with_options(path, JsonOptions::default())
    }

    /// Loads a dataset from a JSON Lines file with options.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the file is empty.
    pub fn from_json_with_options(path: impl AsRef<Path>, options: JsonOptions) -> Result<Self> {
        use std::io::BufReader;

        use arrow_json::ReaderBuilder;

        let path = path.as_ref();

        // Get schema (infer or use provided)
        let schema = if let Some(schema) = options.schema {
            Arc::new(schema)
        } else {
            let infer_file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
            let infer_reader = BufReader::new(infer_file);
            let (inferred, _) = arrow_json::reader::infer_json_schema(infer_reader, Some(1000))
                .map_err(Error::Arrow)?;
            Arc::new(inferred)
        };

        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let buf_reader = BufReader::new(file);

        let builder = ReaderBuilder::new(schema).with_batch_size(options.batch_size);
        let reader = builder.build(buf_reader).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(batches)
    }
}

impl Dataset for DataTable {
    fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    fn column(&self, name: &str) -> Result<ArrayRef> {
        self.batch
            .column_by_name(name)
            .cloned()
            .ok_or_else(|| Error::column_not_found(name))
    }

    fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Explicit schema; inferred from the file when absent.
    pub schema: Option<Schema>,
    /// Whether the first row is a header (default: true).
    pub has_header: bool,
    /// Field delimiter; comma when absent.
    pub delimiter: Option<u8>,
    /// Rows per batch while reading (default: 8192).
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            schema: None,
            has_header: true,
            delimiter: None,
            batch_size: 8192,
        }
    }
}

/// Options for JSON Lines parsing.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Explicit schema; inferred from the file when absent.
    pub schema: Option<Schema>,
    /// Rows per batch while reading (default: 8192).
    pub batch_size: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            schema: None,
            batch_size: 8192,
        }
    }
}
