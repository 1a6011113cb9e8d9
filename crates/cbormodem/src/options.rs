//! Parser configuration.

/// Capacity configuration for the streaming CBOR parser.
///
/// Every buffer the parser owns is sized once at construction and never
/// grows; exceeding any of them during a parse is a hard
/// [`StackOverflow`](crate::ParseError::StackOverflow) error. The defaults
/// are generous for telemetry-sized documents while keeping the whole
/// context around half a kilobyte.
///
/// # Examples
///
/// ```rust
/// use cbormodem::ParserOptions;
///
/// let options = ParserOptions {
///     string_chunk: 64,
///     ..Default::default()
/// };
/// assert_eq!(options.max_depth, 12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Maximum nesting depth of arrays, maps, tags and indefinite strings.
    ///
    /// # Default
    ///
    /// `12`
    pub max_depth: usize,

    /// Capacity of the textual path buffer.
    ///
    /// # Default
    ///
    /// `128`
    pub max_path: usize,

    /// Largest chunk handed to the sink in one `StrChunk`/`BlobChunk`/
    /// `...End` event. Strings longer than this are delivered in several
    /// pieces.
    ///
    /// # Default
    ///
    /// `254`
    pub string_chunk: usize,

    /// Maximum number of simultaneously open arrays (depth of the index
    /// vector).
    ///
    /// # Default
    ///
    /// `8`
    pub max_index_depth: usize,

    /// How many wildcard positions a match records; further `*`s still match
    /// but their offsets are dropped.
    ///
    /// # Default
    ///
    /// `4`
    pub max_wildcards: usize,

    /// Depth of the layer stack used by
    /// [`push_layer`](crate::StreamingParser::push_layer).
    ///
    /// # Default
    ///
    /// `5`
    pub max_layers: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: 12,
            max_path: 128,
            string_chunk: 254,
            max_index_depth: 8,
            max_wildcards: 4,
            max_layers: 5,
        }
    }
}
