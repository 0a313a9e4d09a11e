use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const ID_COL: &str = "id";
pub const DOCUMENT_COL: &str = "document";
pub const SOURCE_COL: &str = "source";
pub const INGESTED_AT_COL: &str = "ingested_at";
pub const VECTOR_COL: &str = "vector";
pub const DISTANCE_COL: &str = "_distance";

pub fn build_collection_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new(ID_COL, DataType::Utf8, false),
		Field::new(DOCUMENT_COL, DataType::Utf8, false),
		Field::new(SOURCE_COL, DataType::Utf8, false),
		Field::new(INGESTED_AT_COL, DataType::Timestamp(TimeUnit::Millisecond, None), false),
		Field::new(VECTOR_COL, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Vector width declared by an existing table schema.
pub fn vector_dim(schema: &Schema) -> Option<i32> {
	match schema.field_with_name(VECTOR_COL).ok()?.data_type() {
		DataType::FixedSizeList(_, n) => Some(*n),
		_ => None,
	}
}
