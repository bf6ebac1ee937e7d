use thiserror::Error;

/// Failures raised inside the handler pipeline.
///
/// Every variant is logged and swallowed before the native listener
/// boundary; nothing here unwinds into the host event loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to load module `{reference}`: {source}")]
    Load {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("module `{module}` has no callable export `{function}`")]
    Resolution { module: String, function: String },

    #[error("handler `{module}${function}` failed: {source}")]
    Invocation {
        module: String,
        function: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("handler expression `{expression}` has no `$` separator")]
    Expression { expression: String },

    #[error("listener bookkeeping desynchronized for event type `{event_type}`")]
    InternalInvariant { event_type: String },
}
