pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Neither a live plugin handler nor a registered factory exists.
    #[error("could not find plugin corresponding to data source type: {ds_type:?}")]
    UnknownDataSourceType { ds_type: String },

    #[error("could not instantiate endpoint for data plugin {ds_type:?}: {source}")]
    HandlerInstantiation {
        ds_type: String,
        #[source]
        source: BoxError,
    },

    #[error("query cancelled")]
    Cancelled,

    #[error("query deadline exceeded")]
    DeadlineExceeded,

    /// Failure reported by a handler while executing a query.
    #[error("{message}")]
    Handler {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl QueryError {
    pub fn unknown_type(ds_type: impl Into<String>) -> Self {
        Self::UnknownDataSourceType {
            ds_type: ds_type.into(),
        }
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    pub fn handler_source(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::Handler {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Misconfiguration rather than a failure of the query itself.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownDataSourceType { .. } | Self::HandlerInstantiation { .. }
        )
    }
}
